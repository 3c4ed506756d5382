//! Layer descriptors
//!
//! A layer is the canonical, store-held description of one design element.
//! Its live counterpart on the rendering surface is a
//! [`SceneObject`](crate::scene::SceneObject) with the same id.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Stable layer identifier, shared with the scene object it describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for LayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Type tag shared by layers and scene objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Text,
    Image,
    Shape,
}

impl LayerKind {
    /// Prefix used when allocating ids for this kind.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            LayerKind::Text => "text",
            LayerKind::Image => "image",
            LayerKind::Shape => "shape",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id_prefix())
    }
}

/// Drop shadow applied to text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub color: String,
    pub blur: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            color: "rgba(0, 0, 0, 0.5)".to_string(),
            blur: 10.0,
            offset_x: 4.0,
            offset_y: 4.0,
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Typography of a text layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub text: String,
    pub fill: String,
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: u16,
    pub font_style: String,
    pub underline: bool,
    pub text_align: TextAlign,
    pub char_spacing: f64,
    pub line_height: f64,
    #[serde(default)]
    pub shadow: Option<Shadow>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            text: "Double click to edit".to_string(),
            fill: "#111827".to_string(),
            font_family: "Inter".to_string(),
            font_size: 48.0,
            font_weight: 600,
            font_style: "normal".to_string(),
            underline: false,
            text_align: TextAlign::Left,
            char_spacing: 0.0,
            line_height: 1.16,
            shadow: None,
        }
    }
}

/// Image adjustments.
///
/// Only the flips are reconciled onto the live object; the remaining
/// adjustments are kept here for the filter pipeline and are not re-applied
/// by the synchronizer.
///
/// Since adjustments never reach the scene, an adjustment-only edit leaves the
/// scene snapshot unchanged and records no history entry. They survive user
/// edits of the object, but a layer rebuilt from a snapshot with no surviving
/// layer (undoing a delete) comes back with default adjustments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFilters {
    pub flip_x: bool,
    pub flip_y: bool,
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
    pub blur: f64,
    pub grayscale: bool,
}

impl Default for ImageFilters {
    fn default() -> Self {
        Self {
            flip_x: false,
            flip_y: false,
            brightness: 0.0,
            contrast: 0.0,
            saturation: 0.0,
            blur: 0.0,
            grayscale: false,
        }
    }
}

/// Primitive shape variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Rect,
    Circle,
}

/// Kind-specific layer content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerContent {
    Text(TextStyle),
    Image {
        src: String,
        #[serde(default)]
        filters: ImageFilters,
    },
    Shape {
        shape: ShapeKind,
        fill: String,
        #[serde(default)]
        stroke: Option<String>,
    },
}

impl LayerContent {
    pub fn kind(&self) -> LayerKind {
        match self {
            LayerContent::Text(_) => LayerKind::Text,
            LayerContent::Image { .. } => LayerKind::Image,
            LayerContent::Shape { .. } => LayerKind::Shape,
        }
    }
}

/// Position, size and transform of a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    #[serde(default = "unit_scale")]
    pub scale_x: f64,
    #[serde(default = "unit_scale")]
    pub scale_y: f64,
}

fn unit_scale() -> f64 {
    1.0
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

/// One addressable design element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub content: LayerContent,
    pub geometry: Geometry,
    pub visible: bool,
    pub locked: bool,
    /// Tombstone consumed by the synchronizer; the owner prunes the layer afterwards.
    #[serde(default)]
    pub should_delete: bool,
}

impl Layer {
    pub fn new(id: LayerId, content: LayerContent, geometry: Geometry) -> Self {
        Self {
            id,
            name: None,
            content,
            geometry,
            visible: true,
            locked: false,
            should_delete: false,
        }
    }

    pub fn kind(&self) -> LayerKind {
        self.content.kind()
    }

    /// Display label: the explicit name, else the kind.
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.kind().to_string())
    }

    pub fn text_style(&self) -> Option<&TextStyle> {
        match &self.content {
            LayerContent::Text(style) => Some(style),
            _ => None,
        }
    }

    pub fn filters(&self) -> Option<&ImageFilters> {
        match &self.content {
            LayerContent::Image { filters, .. } => Some(filters),
            _ => None,
        }
    }
}

/// Partial update of a [`Layer`], as issued by panels and external actors.
///
/// Every field is optional. `shadow` distinguishes "leave as is" (absent)
/// from "clear" (`null`). Fields that do not apply to the layer's kind are
/// ignored. Geometry is not patchable here; it flows back from the scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_delete: Option<bool>,

    // Text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub char_spacing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub shadow: Option<Option<Shadow>>,

    // Image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flip_x: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flip_y: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grayscale: Option<bool>,

    // Shape
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
}

/// Keeps an explicit `null` distinct from a missing field.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

fn assign<T: PartialEq>(slot: &mut T, value: &Option<T>) -> bool
where
    T: Clone,
{
    match value {
        Some(v) if slot != v => {
            *slot = v.clone();
            true
        }
        _ => false,
    }
}

impl LayerPatch {
    /// Apply the patch, returning whether anything changed.
    pub fn apply_to(&self, layer: &mut Layer) -> bool {
        let mut changed = false;

        if let Some(name) = &self.name {
            if layer.name.as_ref() != Some(name) {
                layer.name = Some(name.clone());
                changed = true;
            }
        }
        changed |= assign(&mut layer.visible, &self.visible);
        changed |= assign(&mut layer.locked, &self.locked);
        changed |= assign(&mut layer.should_delete, &self.should_delete);

        match &mut layer.content {
            LayerContent::Text(style) => {
                changed |= assign(&mut style.text, &self.text);
                changed |= assign(&mut style.fill, &self.fill);
                changed |= assign(&mut style.font_family, &self.font_family);
                changed |= assign(&mut style.font_size, &self.font_size);
                changed |= assign(&mut style.font_weight, &self.font_weight);
                changed |= assign(&mut style.font_style, &self.font_style);
                changed |= assign(&mut style.underline, &self.underline);
                changed |= assign(&mut style.text_align, &self.text_align);
                changed |= assign(&mut style.char_spacing, &self.char_spacing);
                changed |= assign(&mut style.line_height, &self.line_height);
                changed |= assign(&mut style.shadow, &self.shadow);
            }
            LayerContent::Image { filters, .. } => {
                changed |= assign(&mut filters.flip_x, &self.flip_x);
                changed |= assign(&mut filters.flip_y, &self.flip_y);
                changed |= assign(&mut filters.brightness, &self.brightness);
                changed |= assign(&mut filters.contrast, &self.contrast);
                changed |= assign(&mut filters.saturation, &self.saturation);
                changed |= assign(&mut filters.blur, &self.blur);
                changed |= assign(&mut filters.grayscale, &self.grayscale);
            }
            LayerContent::Shape { fill, stroke, .. } => {
                changed |= assign(fill, &self.fill);
                if let Some(new_stroke) = &self.stroke {
                    if stroke.as_ref() != Some(new_stroke) {
                        *stroke = Some(new_stroke.clone());
                        changed = true;
                    }
                }
            }
        }

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_layer() -> Layer {
        Layer::new(
            LayerId::from("text-1"),
            LayerContent::Text(TextStyle::default()),
            Geometry::default(),
        )
    }

    #[test]
    fn test_layer_serializes_type_tag() {
        let layer = text_layer();
        let json = serde_json::to_value(&layer).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["id"], "text-1");

        let back: Layer = serde_json::from_value(json).unwrap();
        assert_eq!(back, layer);
    }

    #[test]
    fn test_patch_distinguishes_null_shadow() {
        let clear: LayerPatch = serde_json::from_str(r#"{"shadow": null}"#).unwrap();
        assert_eq!(clear.shadow, Some(None));

        let untouched: LayerPatch = serde_json::from_str(r#"{"visible": false}"#).unwrap();
        assert_eq!(untouched.shadow, None);
    }

    #[test]
    fn test_patch_rejects_unknown_fields() {
        assert!(serde_json::from_str::<LayerPatch>(r#"{"colour": "red"}"#).is_err());
    }

    #[test]
    fn test_patch_apply_reports_changes() {
        let mut layer = text_layer();
        let patch = LayerPatch {
            font_size: Some(72.0),
            shadow: Some(Some(Shadow::default())),
            ..Default::default()
        };
        assert!(patch.apply_to(&mut layer));
        assert!(!patch.apply_to(&mut layer));

        let style = layer.text_style().unwrap();
        assert_eq!(style.font_size, 72.0);
        assert!(style.shadow.is_some());

        let clear = LayerPatch {
            shadow: Some(None),
            ..Default::default()
        };
        assert!(clear.apply_to(&mut layer));
        assert!(layer.text_style().unwrap().shadow.is_none());
    }

    #[test]
    fn test_patch_ignores_fields_of_other_kinds() {
        let mut layer = Layer::new(
            LayerId::from("image-1"),
            LayerContent::Image {
                src: "packshot.png".to_string(),
                filters: ImageFilters::default(),
            },
            Geometry::default(),
        );
        let patch = LayerPatch {
            font_size: Some(10.0),
            ..Default::default()
        };
        assert!(!patch.apply_to(&mut layer));

        let flip = LayerPatch {
            flip_x: Some(true),
            brightness: Some(0.2),
            ..Default::default()
        };
        assert!(flip.apply_to(&mut layer));
        let filters = layer.filters().unwrap();
        assert!(filters.flip_x);
        assert_eq!(filters.brightness, 0.2);
    }
}

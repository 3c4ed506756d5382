//! Scene Graph Objects
//!
//! The rendering surface's live counterpart of a layer. Geometry follows the
//! surface's conventions: `left`/`top` locate the origin point selected by
//! `origin_x`/`origin_y`, `width`/`height` are the native (unscaled) size.

use serde::{Deserialize, Serialize};

use crate::layers::{LayerId, LayerKind, Shadow, ShapeKind, TextAlign, TextStyle};

/// Average glyph advance in em units used for text box estimates.
const AVERAGE_GLYPH_EM: f64 = 0.55;

/// Horizontal anchor of `left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginX {
    #[default]
    Left,
    Center,
    Right,
}

impl OriginX {
    fn factor(self) -> f64 {
        match self {
            OriginX::Left => 0.0,
            OriginX::Center => 0.5,
            OriginX::Right => 1.0,
        }
    }
}

/// Vertical anchor of `top`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginY {
    #[default]
    Top,
    Center,
    Bottom,
}

impl OriginY {
    fn factor(self) -> f64 {
        match self {
            OriginY::Top => 0.0,
            OriginY::Center => 0.5,
            OriginY::Bottom => 1.0,
        }
    }
}

/// Interaction locks. Only settable as a whole through
/// [`SceneObject::set_locked`], so a partially locked object cannot be built
/// through this API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LockFlags {
    movement: bool,
    rotation: bool,
    scaling_x: bool,
    scaling_y: bool,
}

impl LockFlags {
    fn uniform(locked: bool) -> Self {
        Self {
            movement: locked,
            rotation: locked,
            scaling_x: locked,
            scaling_y: locked,
        }
    }

    pub fn movement(&self) -> bool {
        self.movement
    }

    pub fn rotation(&self) -> bool {
        self.rotation
    }

    pub fn scaling_x(&self) -> bool {
        self.scaling_x
    }

    pub fn scaling_y(&self) -> bool {
        self.scaling_y
    }

    /// `Some(locked)` when all four flags agree.
    pub fn uniform_value(&self) -> Option<bool> {
        let all = [self.movement, self.rotation, self.scaling_x, self.scaling_y];
        if all.iter().all(|f| *f) {
            Some(true)
        } else if all.iter().all(|f| !*f) {
            Some(false)
        } else {
            None
        }
    }
}

/// Typography on a live text object. The fill lives on the object itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextProps {
    pub text: String,
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: u16,
    pub font_style: String,
    pub underline: bool,
    pub text_align: TextAlign,
    pub char_spacing: f64,
    pub line_height: f64,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: "Inter".to_string(),
            font_size: 40.0,
            font_weight: 400,
            font_style: "normal".to_string(),
            underline: false,
            text_align: TextAlign::Left,
            char_spacing: 0.0,
            line_height: 1.16,
        }
    }
}

impl From<&TextStyle> for TextProps {
    fn from(style: &TextStyle) -> Self {
        Self {
            text: style.text.clone(),
            font_family: style.font_family.clone(),
            font_size: style.font_size,
            font_weight: style.font_weight,
            font_style: style.font_style.clone(),
            underline: style.underline,
            text_align: style.text_align,
            char_spacing: style.char_spacing,
            line_height: style.line_height,
        }
    }
}

/// Kind-specific part of a scene object, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectBody {
    Text(TextProps),
    Image {
        src: String,
    },
    Shape {
        shape: ShapeKind,
        #[serde(default)]
        stroke: Option<String>,
    },
}

/// Render-only interaction state. Never serialized, never mirrored back.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransientState {
    pub drag_dx: f64,
    pub drag_dy: f64,
    pub dragging: bool,
}

/// Axis-aligned bounds in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

fn unit_scale() -> f64 {
    1.0
}

fn visible_default() -> bool {
    true
}

/// A live object on the rendering surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: LayerId,
    #[serde(flatten)]
    pub body: ObjectBody,
    #[serde(default)]
    pub name: Option<String>,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "unit_scale")]
    pub scale_x: f64,
    #[serde(default = "unit_scale")]
    pub scale_y: f64,
    #[serde(default)]
    pub angle: f64,
    #[serde(default)]
    pub origin_x: OriginX,
    #[serde(default)]
    pub origin_y: OriginY,
    #[serde(default = "visible_default")]
    pub visible: bool,
    #[serde(default)]
    locks: LockFlags,
    #[serde(default)]
    pub flip_x: bool,
    #[serde(default)]
    pub flip_y: bool,
    #[serde(default)]
    pub fill: Option<String>,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub padding: f64,
    #[serde(default)]
    pub shadow: Option<Shadow>,
    #[serde(skip)]
    pub transient: TransientState,
}

impl SceneObject {
    fn with_body(id: LayerId, body: ObjectBody, width: f64, height: f64) -> Self {
        Self {
            id,
            body,
            name: None,
            left: 0.0,
            top: 0.0,
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            origin_x: OriginX::Left,
            origin_y: OriginY::Top,
            visible: true,
            locks: LockFlags::default(),
            flip_x: false,
            flip_y: false,
            fill: None,
            background_color: None,
            padding: 0.0,
            shadow: None,
            transient: TransientState::default(),
        }
    }

    /// Text object sized from an estimate of its rendered box.
    pub fn text(id: LayerId, props: TextProps) -> Self {
        let (width, height) = estimate_text_box(&props.text, props.font_size, props.line_height);
        Self::with_body(id, ObjectBody::Text(props), width, height)
    }

    pub fn image(id: LayerId, src: impl Into<String>, width: f64, height: f64) -> Self {
        Self::with_body(id, ObjectBody::Image { src: src.into() }, width, height)
    }

    pub fn shape(id: LayerId, shape: ShapeKind, width: f64, height: f64) -> Self {
        Self::with_body(
            id,
            ObjectBody::Shape {
                shape,
                stroke: None,
            },
            width,
            height,
        )
    }

    pub fn at(mut self, left: f64, top: f64) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    pub fn kind(&self) -> LayerKind {
        match self.body {
            ObjectBody::Text(_) => LayerKind::Text,
            ObjectBody::Image { .. } => LayerKind::Image,
            ObjectBody::Shape { .. } => LayerKind::Shape,
        }
    }

    pub fn text_props(&self) -> Option<&TextProps> {
        match &self.body {
            ObjectBody::Text(props) => Some(props),
            _ => None,
        }
    }

    pub fn text_props_mut(&mut self) -> Option<&mut TextProps> {
        match &mut self.body {
            ObjectBody::Text(props) => Some(props),
            _ => None,
        }
    }

    pub fn locks(&self) -> LockFlags {
        self.locks
    }

    /// Set all four interaction locks from one boolean.
    pub fn set_locked(&mut self, locked: bool) {
        self.locks = LockFlags::uniform(locked);
    }

    pub fn scaled_width(&self) -> f64 {
        self.width * self.scale_x
    }

    pub fn scaled_height(&self) -> f64 {
        self.height * self.scale_y
    }

    pub fn scaled_area(&self) -> f64 {
        self.scaled_width() * self.scaled_height()
    }

    /// Font size as rendered, `None` for non-text objects.
    pub fn effective_font_size(&self) -> Option<f64> {
        self.text_props().map(|p| p.font_size * self.scale_y)
    }

    /// Uniform scale.
    pub fn scale(&mut self, factor: f64) {
        self.scale_x = factor;
        self.scale_y = factor;
    }

    /// Uniformly scale so the rendered width equals `target`.
    pub fn scale_to_width(&mut self, target: f64) {
        if self.width > 0.0 {
            self.scale(target / self.width);
        }
    }

    /// Unrotated bounds of the rendered object.
    pub fn bounding_rect(&self) -> Rect {
        let width = self.scaled_width();
        let height = self.scaled_height();
        Rect {
            x: self.left - self.origin_x.factor() * width,
            y: self.top - self.origin_y.factor() * height,
            width,
            height,
        }
    }
}

/// Rough rendered size of a text block: average glyph advance per character
/// on the longest line, one line box per line.
pub fn estimate_text_box(text: &str, font_size: f64, line_height: f64) -> (f64, f64) {
    let lines: Vec<&str> = if text.is_empty() {
        vec![""]
    } else {
        text.lines().collect()
    };
    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let width = longest as f64 * font_size * AVERAGE_GLYPH_EM;
    let height = lines.len() as f64 * font_size * line_height;
    (width, height)
}

//! Starter templates
//!
//! A template is a canvas format plus a ready-made object set. Loading one
//! replaces the scene and rebuilds the layer list from it.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::canvas::{Background, CanvasFormat};
use crate::error::{AtelierError, Result};
use crate::layers::{LayerId, ShapeKind, TextAlign};
use crate::scene::{OriginX, SceneObject, TextProps};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    /// `WIDTHxHEIGHT`.
    pub format: String,
    #[serde(default)]
    pub background: Option<Background>,
    pub objects: Vec<SceneObject>,
}

impl Template {
    /// Read a template from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AtelierError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path).map_err(|e| AtelierError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Built-in template by id.
    pub fn builtin(id: &str) -> Option<Template> {
        builtin_templates().into_iter().find(|t| t.id == id)
    }
}

fn copy(id: &str, text: &str, font_size: f64, weight: u16, fill: &str) -> SceneObject {
    SceneObject::text(
        LayerId::from(id),
        TextProps {
            text: text.to_string(),
            font_size,
            font_weight: weight,
            ..Default::default()
        },
    )
    .with_fill(fill)
}

/// Templates shipped with the editor.
pub fn builtin_templates() -> Vec<Template> {
    let (sq_w, _) = CanvasFormat::Square.dimensions();
    let (story_w, story_h) = CanvasFormat::Story.dimensions();

    let mut sale_band = SceneObject::shape(LayerId::from("shape-1"), ShapeKind::Rect, f64::from(sq_w), 220.0)
        .at(0.0, 760.0)
        .with_fill("#111827");
    sale_band.name = Some("Band".to_string());

    let mut launch_title = copy("text-1", "New Arrival", 120.0, 800, "#ffffff");
    launch_title.origin_x = OriginX::Center;
    launch_title.left = f64::from(story_w) / 2.0;
    launch_title.top = f64::from(story_h) * 0.2;
    if let Some(props) = launch_title.text_props_mut() {
        props.text_align = TextAlign::Center;
    }

    vec![
        Template {
            id: "summer-sale".to_string(),
            name: "Summer Sale".to_string(),
            format: CanvasFormat::Square.to_string(),
            background: Some(Background::Solid("#fde68a".to_string())),
            objects: vec![
                sale_band,
                copy("text-2", "Summer Sale", 96.0, 800, "#111827").at(80.0, 120.0),
                copy("text-3", "Up to 50% off", 48.0, 600, "#111827").at(80.0, 260.0),
                copy("text-4", "Shop now", 36.0, 600, "#ffffff").at(80.0, 840.0),
            ],
        },
        Template {
            id: "story-launch".to_string(),
            name: "Product Launch Story".to_string(),
            format: CanvasFormat::Story.to_string(),
            background: Some(Background::Solid("#0f172a".to_string())),
            objects: vec![
                launch_title,
                copy("text-2", "Available today", 56.0, 500, "#e2e8f0").at(120.0, 1500.0),
            ],
        },
        Template {
            id: "blank-landscape".to_string(),
            name: "Blank Landscape".to_string(),
            format: CanvasFormat::Landscape.to_string(),
            background: None,
            objects: Vec::new(),
        },
    ]
}

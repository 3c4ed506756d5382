//! Role classification of live objects.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::layers::{LayerId, LayerKind};
use crate::scene::SceneGraph;

/// Compositional role assigned to an object by a layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    PrimaryImage,
    Headline,
    Subhead,
    CallToAction,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::PrimaryImage => write!(f, "primary image"),
            Role::Headline => write!(f, "headline"),
            Role::Subhead => write!(f, "subhead"),
            Role::CallToAction => write!(f, "call to action"),
        }
    }
}

/// Objects sorted into roles for one layout pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roles {
    pub primary_image: Option<LayerId>,
    pub headline: Option<LayerId>,
    pub subhead: Option<LayerId>,
    pub call_to_action: Option<LayerId>,
    /// Shapes take no role in the current patterns.
    pub shapes: Vec<LayerId>,
}

/// Classify the scene's objects.
///
/// The primary image is the one with the largest rendered area; the first
/// one encountered wins a tie. Texts are ranked by rendered font size,
/// largest first, keeping paint order among equals.
pub fn classify(scene: &SceneGraph) -> Roles {
    let mut primary: Option<(LayerId, f64)> = None;
    let mut texts: Vec<(LayerId, f64)> = Vec::new();
    let mut shapes = Vec::new();

    for object in scene.objects() {
        match object.kind() {
            LayerKind::Image => {
                let area = object.scaled_area();
                if primary.as_ref().map_or(true, |(_, best)| area > *best) {
                    primary = Some((object.id.clone(), area));
                }
            }
            LayerKind::Text => {
                let size = object.effective_font_size().unwrap_or(0.0);
                texts.push((object.id.clone(), size));
            }
            LayerKind::Shape => shapes.push(object.id.clone()),
        }
    }

    texts.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    let mut ranked = texts.into_iter().map(|(id, _)| id);

    Roles {
        primary_image: primary.map(|(id, _)| id),
        headline: ranked.next(),
        subhead: ranked.next(),
        call_to_action: ranked.next(),
        shapes,
    }
}

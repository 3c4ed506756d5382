//! Auto-Layout Engine
//!
//! Heuristic composition over the live object set:
//! - `classify`: role assignment (primary image, headline, subhead, call to action)
//! - `patterns`: placement rules per composition pattern
//!
//! Layout only touches scene geometry. The layer model learns about the new
//! positions from its owner afterwards.

mod classify;
mod patterns;

use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

pub use classify::{classify, Role, Roles};

use crate::layers::LayerId;
use crate::scene::SceneGraph;

/// Supported composition patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutPattern {
    ZPattern,
    RuleOfThirds,
}

impl LayoutPattern {
    /// Look up a pattern by its identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "z-pattern" => Some(LayoutPattern::ZPattern),
            "rule-of-thirds" => Some(LayoutPattern::RuleOfThirds),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            LayoutPattern::ZPattern => "z-pattern",
            LayoutPattern::RuleOfThirds => "rule-of-thirds",
        }
    }

    pub fn all() -> [LayoutPattern; 2] {
        [LayoutPattern::ZPattern, LayoutPattern::RuleOfThirds]
    }
}

impl fmt::Display for LayoutPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Result of a layout request.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutOutcome {
    /// The identifier names no known pattern; nothing was touched.
    Unsupported { pattern: String },
    /// The pattern ran; `placed` lists the roles that had an object.
    Applied {
        pattern: LayoutPattern,
        placed: Vec<(Role, LayerId)>,
    },
}

impl LayoutOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, LayoutOutcome::Applied { .. })
    }

    pub fn placed(&self) -> &[(Role, LayerId)] {
        match self {
            LayoutOutcome::Applied { placed, .. } => placed,
            LayoutOutcome::Unsupported { .. } => &[],
        }
    }
}

/// Arrange the scene's objects according to `pattern_id`.
///
/// Unknown identifiers leave the scene untouched and request no render.
/// Otherwise one render is requested after all placements.
pub fn apply_auto_layout(scene: &mut SceneGraph, pattern_id: &str) -> LayoutOutcome {
    let Some(pattern) = LayoutPattern::from_id(pattern_id) else {
        debug!(pattern = pattern_id, "unknown layout pattern ignored");
        return LayoutOutcome::Unsupported {
            pattern: pattern_id.to_string(),
        };
    };

    let roles = classify(scene);
    let placed = match pattern {
        LayoutPattern::ZPattern => patterns::z_pattern(scene, &roles),
        LayoutPattern::RuleOfThirds => patterns::rule_of_thirds(scene, &roles),
    };
    scene.request_render();

    info!(pattern = %pattern, placed = placed.len(), "auto layout applied");
    LayoutOutcome::Applied { pattern, placed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::TextAlign;
    use crate::scene::{OriginX, OriginY, SceneObject, TextProps};
    use approx::assert_relative_eq;

    fn text(id: &str, copy: &str, font_size: f64) -> SceneObject {
        SceneObject::text(
            LayerId::from(id),
            TextProps {
                text: copy.to_string(),
                font_size,
                ..Default::default()
            },
        )
    }

    fn sample_scene() -> SceneGraph {
        let mut scene = SceneGraph::new(1000, 1000);
        scene.add(SceneObject::image(LayerId::from("image-1"), "hero.png", 200.0, 200.0).at(13.0, 17.0));
        scene.add(text("text-1", "Big Summer Sale", 64.0));
        scene.add(text("text-2", "Everything must go", 32.0));
        scene.add(text("text-3", "Shop now", 24.0));
        scene
    }

    #[test]
    fn test_z_pattern_geometry() {
        let mut scene = sample_scene();
        let outcome = apply_auto_layout(&mut scene, "z-pattern");
        assert!(outcome.is_applied());
        assert_eq!(outcome.placed().len(), 4);

        let image = scene.get(&LayerId::from("image-1")).unwrap();
        let bounds = image.bounding_rect();
        assert_relative_eq!(bounds.width, 400.0);
        assert_relative_eq!(bounds.right(), 900.0);
        assert_relative_eq!(bounds.center_y(), 500.0);

        let headline = scene.get(&LayerId::from("text-1")).unwrap();
        assert_relative_eq!(headline.left, 100.0);
        assert_relative_eq!(headline.top, 300.0);
        assert_eq!(headline.text_props().unwrap().text_align, TextAlign::Left);
        assert!(headline.scaled_width() <= 400.0 + 1e-9);
    }

    #[test]
    fn test_z_pattern_stacks_copy() {
        let mut scene = sample_scene();
        apply_auto_layout(&mut scene, "z-pattern");

        let headline = scene.get(&LayerId::from("text-1")).unwrap().bounding_rect();
        let subhead = scene.get(&LayerId::from("text-2")).unwrap().bounding_rect();
        let cta = scene.get(&LayerId::from("text-3")).unwrap();

        assert_relative_eq!(subhead.y, headline.bottom() + 20.0);
        assert_relative_eq!(cta.top, subhead.bottom() + 40.0);
        assert_eq!(cta.background_color.as_deref(), Some("#000000"));
        assert_eq!(cta.fill.as_deref(), Some("#ffffff"));
        assert_relative_eq!(cta.padding, 10.0);
    }

    #[test]
    fn test_rule_of_thirds_anchors() {
        let mut scene = SceneGraph::new(900, 900);
        scene.add(SceneObject::image(LayerId::from("image-1"), "hero.png", 300.0, 600.0));
        scene.add(text("text-1", "Headline", 40.0));

        apply_auto_layout(&mut scene, "rule-of-thirds");

        let image = scene.get(&LayerId::from("image-1")).unwrap();
        // min(450/300, 720/600) = 1.2
        assert_relative_eq!(image.scale_x, 1.2);
        assert_eq!(image.origin_y, OriginY::Center);
        assert_relative_eq!(image.bounding_rect().center_x(), 600.0);
        assert_relative_eq!(image.top, 300.0);

        let headline = scene.get(&LayerId::from("text-1")).unwrap();
        assert_eq!((headline.origin_x, headline.origin_y), (OriginX::Center, OriginY::Bottom));
        assert_relative_eq!(headline.bounding_rect().center_x(), 300.0);
        assert_relative_eq!(headline.bounding_rect().bottom(), 300.0);
        assert_eq!(headline.text_props().unwrap().text_align, TextAlign::Center);
    }

    #[test]
    fn test_unknown_pattern_is_noop() {
        let mut scene = sample_scene();
        let before = scene.to_snapshot();
        let renders = scene.render_requests();

        let outcome = apply_auto_layout(&mut scene, "golden-spiral");
        assert_eq!(
            outcome,
            LayoutOutcome::Unsupported {
                pattern: "golden-spiral".to_string()
            }
        );
        assert_eq!(scene.to_snapshot(), before);
        assert_eq!(scene.render_requests(), renders);
    }

    #[test]
    fn test_missing_roles_are_skipped() {
        let mut scene = SceneGraph::new(1000, 1000);
        scene.add(text("text-1", "Only copy", 40.0));
        let outcome = apply_auto_layout(&mut scene, "z-pattern");
        assert_eq!(outcome.placed(), &[(Role::Headline, LayerId::from("text-1"))]);
        assert_eq!(scene.render_requests(), 1);
    }
}

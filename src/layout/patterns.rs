//! Placement rules of the composition patterns.
//!
//! Every rule reads the object's current native size and scale, then writes
//! geometry through [`SceneGraph::mutate`]. Positions are canvas pixels.

use super::classify::{Role, Roles};
use crate::layers::{LayerId, TextAlign};
use crate::scene::{OriginX, OriginY, SceneGraph};

/// Safe-area inset as a fraction of each canvas dimension.
const MARGIN_RATIO: f64 = 0.1;

/// Gap below the headline.
const HEADLINE_GAP: f64 = 20.0;

/// Gap below the subhead.
const SUBHEAD_GAP: f64 = 40.0;

const CTA_BACKGROUND: &str = "#000000";
const CTA_FILL: &str = "#ffffff";
const CTA_PADDING: f64 = 10.0;

/// Canvas measurements shared by the rules.
#[derive(Debug, Clone, Copy)]
struct Frame {
    width: f64,
    height: f64,
    margin_x: f64,
    margin_y: f64,
}

impl Frame {
    fn of(scene: &SceneGraph) -> Self {
        let width = f64::from(scene.width());
        let height = f64::from(scene.height());
        Self {
            width,
            height,
            margin_x: width * MARGIN_RATIO,
            margin_y: height * MARGIN_RATIO,
        }
    }

    fn safe_width(&self) -> f64 {
        self.width - 2.0 * self.margin_x
    }

    fn safe_height(&self) -> f64 {
        self.height - 2.0 * self.margin_y
    }
}

fn native_size(scene: &SceneGraph, id: &LayerId) -> Option<(f64, f64)> {
    scene
        .get(id)
        .map(|o| (o.width, o.height))
        .filter(|(w, h)| *w > 0.0 && *h > 0.0)
}

/// Stack a text block at the left margin, shrinking it to `max_width`.
/// Returns its rendered height.
fn place_left_text(scene: &mut SceneGraph, id: &LayerId, left: f64, top: f64, max_width: f64) -> f64 {
    let mut rendered_height = 0.0;
    scene.mutate(id, |text| {
        text.left = left;
        text.top = top;
        text.origin_x = OriginX::Left;
        text.origin_y = OriginY::Top;
        if let Some(props) = text.text_props_mut() {
            props.text_align = TextAlign::Left;
        }
        if text.scaled_width() > max_width {
            text.scale_to_width(max_width);
        }
        rendered_height = text.scaled_height();
    });
    rendered_height
}

/// Image on the right half, copy stacked on the left.
pub(super) fn z_pattern(scene: &mut SceneGraph, roles: &Roles) -> Vec<(Role, LayerId)> {
    let frame = Frame::of(scene);
    let mut placed = Vec::new();

    if let Some(id) = &roles.primary_image {
        if let Some((w, h)) = native_size(scene, id) {
            let scale = (frame.safe_width() * 0.5 / w).min(frame.safe_height() * 0.8 / h);
            scene.mutate(id, |image| {
                image.scale(scale);
                image.left = frame.width - w * scale - frame.margin_x;
                image.top = (frame.height - h * scale) / 2.0;
                image.origin_x = OriginX::Left;
                image.origin_y = OriginY::Top;
            });
            placed.push((Role::PrimaryImage, id.clone()));
        }
    }

    let max_text_width = frame.safe_width() * 0.5;
    let mut cursor = frame.margin_y + frame.height * 0.2;

    if let Some(id) = &roles.headline {
        cursor += place_left_text(scene, id, frame.margin_x, cursor, max_text_width) + HEADLINE_GAP;
        placed.push((Role::Headline, id.clone()));
    }

    if let Some(id) = &roles.subhead {
        cursor += place_left_text(scene, id, frame.margin_x, cursor, max_text_width) + SUBHEAD_GAP;
        placed.push((Role::Subhead, id.clone()));
    }

    if let Some(id) = &roles.call_to_action {
        scene.mutate(id, |cta| {
            cta.left = frame.margin_x;
            cta.top = cursor;
            cta.origin_x = OriginX::Left;
            cta.origin_y = OriginY::Top;
            cta.background_color = Some(CTA_BACKGROUND.to_string());
            cta.fill = Some(CTA_FILL.to_string());
            cta.padding = CTA_PADDING;
        });
        placed.push((Role::CallToAction, id.clone()));
    }

    placed
}

/// Image centred on the right third-line, headline on the left one, both
/// anchored to the upper boundary of the middle third.
pub(super) fn rule_of_thirds(scene: &mut SceneGraph, roles: &Roles) -> Vec<(Role, LayerId)> {
    let frame = Frame::of(scene);
    let third_x = frame.width / 3.0;
    let third_y = frame.height / 3.0;
    let mut placed = Vec::new();

    if let Some(id) = &roles.primary_image {
        if let Some((w, h)) = native_size(scene, id) {
            let scale = (third_x * 1.5 / w).min(frame.height * 0.8 / h);
            scene.mutate(id, |image| {
                image.scale(scale);
                image.left = third_x * 2.0 - w * scale / 2.0;
                image.top = third_y;
                image.origin_x = OriginX::Left;
                image.origin_y = OriginY::Center;
            });
            placed.push((Role::PrimaryImage, id.clone()));
        }
    }

    if let Some(id) = &roles.headline {
        scene.mutate(id, |headline| {
            headline.left = third_x;
            headline.top = third_y;
            headline.origin_x = OriginX::Center;
            headline.origin_y = OriginY::Bottom;
            if let Some(props) = headline.text_props_mut() {
                props.text_align = TextAlign::Center;
            }
        });
        placed.push((Role::Headline, id.clone()));
    }

    placed
}

//! Forward synchronizer: Layer Model -> Scene Graph
//!
//! One reconciliation pass per layer-model notification. Style state of each
//! layer is written onto its existing object, tombstoned objects are removed
//! and paint order is aligned with layer order. A single repaint is requested
//! at the end. Objects are never created or moved here; a text object's box is
//! re-estimated when its copy or font metrics change.

use tracing::{debug, trace};

use super::guard::SyncGuard;
use crate::layers::{Layer, LayerContent, LayerId};
use crate::scene::{estimate_text_box, ObjectBody, SceneGraph, SceneObject};

/// What one pass did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// Objects that received at least one property write.
    pub changed: usize,
    /// Objects removed because their layer was tombstoned.
    pub removed: Vec<LayerId>,
    /// Layers without a live object.
    pub skipped: usize,
    /// Whether paint order was adjusted.
    pub reordered: bool,
}

impl SyncReport {
    /// True when the pass left the scene exactly as it found it.
    pub fn is_noop(&self) -> bool {
        self.changed == 0 && self.removed.is_empty() && !self.reordered
    }
}

/// Store-to-scene reconciler.
#[derive(Debug, Clone)]
pub struct Synchronizer {
    guard: SyncGuard,
    passes: u64,
}

impl Synchronizer {
    pub fn new(guard: SyncGuard) -> Self {
        Self { guard, passes: 0 }
    }

    pub fn guard(&self) -> &SyncGuard {
        &self.guard
    }

    /// Number of passes run so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Reconcile the scene with `layers`.
    pub fn reconcile(&mut self, layers: &[Layer], scene: &mut SceneGraph) -> SyncReport {
        let _token = self.guard.hold();
        self.passes += 1;
        let mut report = SyncReport::default();

        for layer in layers {
            let Some(current) = scene.get(&layer.id) else {
                trace!(layer = %layer.id, "no live object, skipping");
                report.skipped += 1;
                continue;
            };

            if layer.should_delete {
                scene.remove(&layer.id);
                report.removed.push(layer.id.clone());
                continue;
            }

            let mut next = current.clone();
            if write_layer(layer, &mut next) {
                scene.mutate(&layer.id, move |object| *object = next);
                report.changed += 1;
            }
        }

        let order: Vec<LayerId> = layers
            .iter()
            .filter(|l| !l.should_delete)
            .map(|l| l.id.clone())
            .collect();
        report.reordered = scene.reorder(&order);

        scene.request_render();
        debug!(
            pass = self.passes,
            changed = report.changed,
            removed = report.removed.len(),
            skipped = report.skipped,
            reordered = report.reordered,
            "layer sync pass complete"
        );
        report
    }
}

fn set<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot != value {
        *slot = value;
        true
    } else {
        false
    }
}

/// Write the layer's reconciled properties onto `object`, reporting whether
/// any value differed.
fn write_layer(layer: &Layer, object: &mut SceneObject) -> bool {
    let mut changed = set(&mut object.visible, layer.visible);

    if object.locks().uniform_value() != Some(layer.locked) {
        object.set_locked(layer.locked);
        changed = true;
    }

    match (&layer.content, &mut object.body) {
        (LayerContent::Text(style), ObjectBody::Text(props)) => {
            let mut reflow = set(&mut props.text, style.text.clone());
            reflow |= set(&mut props.font_size, style.font_size);
            reflow |= set(&mut props.line_height, style.line_height);
            if reflow {
                let (width, height) =
                    estimate_text_box(&props.text, props.font_size, props.line_height);
                object.width = width;
                object.height = height;
                changed = true;
            }
            changed |= set(&mut props.font_family, style.font_family.clone());
            changed |= set(&mut props.font_weight, style.font_weight);
            changed |= set(&mut props.font_style, style.font_style.clone());
            changed |= set(&mut props.underline, style.underline);
            changed |= set(&mut props.text_align, style.text_align);
            changed |= set(&mut props.char_spacing, style.char_spacing);
            changed |= set(&mut object.fill, Some(style.fill.clone()));
            // An absent shadow clears whatever the object carried.
            changed |= set(&mut object.shadow, style.shadow.clone());
        }
        (LayerContent::Image { filters, .. }, ObjectBody::Image { .. }) => {
            // Other adjustments stay in the layer; only flips are reconciled.
            changed |= set(&mut object.flip_x, filters.flip_x);
            changed |= set(&mut object.flip_y, filters.flip_y);
        }
        (LayerContent::Shape { fill, stroke, .. }, ObjectBody::Shape { stroke: live_stroke, .. }) => {
            changed |= set(live_stroke, stroke.clone());
            changed |= set(&mut object.fill, Some(fill.clone()));
        }
        (content, _) => {
            debug!(
                layer = %layer.id,
                layer_kind = %content.kind(),
                object_kind = %object.kind(),
                "layer and object kinds differ; style not reconciled"
            );
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{Geometry, ImageFilters, Shadow, ShapeKind, TextStyle};
    use crate::scene::TextProps;

    fn text_layer(id: &str) -> Layer {
        Layer::new(
            LayerId::from(id),
            LayerContent::Text(TextStyle::default()),
            Geometry::default(),
        )
    }

    fn text_object(id: &str) -> SceneObject {
        SceneObject::text(
            LayerId::from(id),
            TextProps {
                text: "Hello".to_string(),
                ..Default::default()
            },
        )
    }

    fn setup() -> (Synchronizer, SceneGraph) {
        let mut scene = SceneGraph::new(1000, 1000);
        scene.add(text_object("text-1"));
        scene.add(SceneObject::image(LayerId::from("image-1"), "a.png", 100.0, 100.0));
        (Synchronizer::new(SyncGuard::new()), scene)
    }

    #[test]
    fn test_second_pass_is_noop() {
        let (mut sync, mut scene) = setup();
        let mut layers = vec![text_layer("text-1")];
        layers[0].locked = true;
        layers[0].visible = false;

        let first = sync.reconcile(&layers, &mut scene);
        assert_eq!(first.changed, 1);
        let after_first = scene.to_snapshot();

        let second = sync.reconcile(&layers, &mut scene);
        assert!(second.is_noop());
        assert_eq!(scene.to_snapshot(), after_first);
    }

    #[test]
    fn test_lock_is_all_or_nothing() {
        let (mut sync, mut scene) = setup();
        let mut layers = vec![text_layer("text-1")];
        for locked in [true, false, true] {
            layers[0].locked = locked;
            sync.reconcile(&layers, &mut scene);
            let locks = scene.get(&LayerId::from("text-1")).unwrap().locks();
            assert_eq!(locks.uniform_value(), Some(locked));
        }
    }

    #[test]
    fn test_absent_shadow_clears_existing() {
        let (mut sync, mut scene) = setup();
        let mut layer = text_layer("text-1");
        if let LayerContent::Text(style) = &mut layer.content {
            style.shadow = Some(Shadow::default());
        }
        sync.reconcile(std::slice::from_ref(&layer), &mut scene);
        assert!(scene.get(&layer.id).unwrap().shadow.is_some());

        if let LayerContent::Text(style) = &mut layer.content {
            style.shadow = None;
        }
        sync.reconcile(std::slice::from_ref(&layer), &mut scene);
        assert!(scene.get(&layer.id).unwrap().shadow.is_none());
    }

    #[test]
    fn test_tombstone_removes_and_stops() {
        let (mut sync, mut scene) = setup();
        let mut layer = text_layer("text-1");
        layer.should_delete = true;
        layer.visible = false;

        let report = sync.reconcile(&[layer], &mut scene);
        assert_eq!(report.removed, vec![LayerId::from("text-1")]);
        assert_eq!(report.changed, 0);
        assert!(!scene.contains(&LayerId::from("text-1")));
    }

    #[test]
    fn test_missing_object_skipped_and_never_created() {
        let (mut sync, mut scene) = setup();
        let report = sync.reconcile(&[text_layer("text-9")], &mut scene);
        assert_eq!(report.skipped, 1);
        assert!(!scene.contains(&LayerId::from("text-9")));
    }

    #[test]
    fn test_image_only_flips_reconciled() {
        let (mut sync, mut scene) = setup();
        let layer = Layer::new(
            LayerId::from("image-1"),
            LayerContent::Image {
                src: "a.png".to_string(),
                filters: ImageFilters {
                    flip_x: true,
                    brightness: 0.8,
                    ..Default::default()
                },
            },
            Geometry::default(),
        );
        let before = scene.get(&layer.id).unwrap().clone();
        sync.reconcile(&[layer.clone()], &mut scene);
        let after = scene.get(&layer.id).unwrap();
        assert!(after.flip_x);
        assert!(!after.flip_y);
        assert_eq!(after.fill, before.fill);
    }

    #[test]
    fn test_shape_fill_and_stroke_reconciled() {
        let (mut sync, mut scene) = setup();
        scene.add(
            SceneObject::shape(LayerId::from("shape-1"), ShapeKind::Rect, 5.0, 5.0).with_fill("#000000"),
        );
        let layer = Layer::new(
            LayerId::from("shape-1"),
            LayerContent::Shape {
                shape: ShapeKind::Rect,
                fill: "#ff0000".to_string(),
                stroke: Some("#00ff00".to_string()),
            },
            Geometry::default(),
        );

        let first = sync.reconcile(std::slice::from_ref(&layer), &mut scene);
        assert_eq!(first.changed, 1);
        let object = scene.get(&layer.id).unwrap();
        assert_eq!(object.fill.as_deref(), Some("#ff0000"));
        assert!(matches!(&object.body, ObjectBody::Shape { stroke: Some(s), .. } if s == "#00ff00"));

        assert!(sync.reconcile(&[layer], &mut scene).is_noop());
    }

    #[test]
    fn test_single_render_request_per_pass() {
        let (mut sync, mut scene) = setup();
        let layers = vec![text_layer("text-1"), text_layer("text-2")];
        let before = scene.render_requests();
        sync.reconcile(&layers, &mut scene);
        assert_eq!(scene.render_requests(), before + 1);
    }

    #[test]
    fn test_paint_order_follows_layers() {
        let (mut sync, mut scene) = setup();
        scene.add(SceneObject::shape(LayerId::from("shape-1"), ShapeKind::Rect, 5.0, 5.0));
        let layers = vec![
            text_layer("text-1"),
            Layer::new(
                LayerId::from("image-1"),
                LayerContent::Image {
                    src: "a.png".to_string(),
                    filters: ImageFilters::default(),
                },
                Geometry::default(),
            ),
        ];
        let report = sync.reconcile(&layers, &mut scene);
        assert!(report.reordered);
        assert_eq!(
            scene.ids(),
            vec![
                LayerId::from("shape-1"),
                LayerId::from("text-1"),
                LayerId::from("image-1")
            ]
        );
    }

    #[test]
    fn test_guard_held_only_during_pass() {
        let guard = SyncGuard::new();
        let observed = std::rc::Rc::new(std::cell::Cell::new(false));
        let (flag, seen) = (guard.clone(), std::rc::Rc::clone(&observed));

        let mut scene = SceneGraph::new(100, 100);
        scene.add(text_object("text-1"));
        scene.add_listener(Box::new(move |_, _| seen.set(flag.is_held())));

        let mut sync = Synchronizer::new(guard.clone());
        let mut layer = text_layer("text-1");
        layer.visible = false;
        sync.reconcile(&[layer], &mut scene);

        assert!(observed.get());
        assert!(!guard.is_held());
    }
}

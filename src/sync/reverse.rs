//! Reverse path: user edits on the scene -> Layer Model
//!
//! The listener only queues captures; it never touches the Layer Model
//! directly, because it runs inside a scene-graph mutation. The owner drains
//! the queue once the scene is released.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::trace;

use super::guard::SyncGuard;
use crate::layers::{Geometry, Layer, LayerContent, LayerId, TextStyle};
use crate::scene::{ObjectBody, SceneEvent, SceneListener, SceneObject};

/// Queues user-originated object modifications.
#[derive(Debug, Clone, Default)]
pub struct ReverseSync {
    guard: SyncGuard,
    attached: Rc<RefCell<HashSet<LayerId>>>,
    queue: Rc<RefCell<Vec<SceneObject>>>,
}

impl ReverseSync {
    pub fn new(guard: SyncGuard) -> Self {
        Self {
            guard,
            attached: Rc::default(),
            queue: Rc::default(),
        }
    }

    /// Listener to register once on the scene graph.
    pub fn listener(&self) -> SceneListener {
        let guard = self.guard.clone();
        let attached = Rc::clone(&self.attached);
        let queue = Rc::clone(&self.queue);
        Box::new(move |event, object| {
            let (SceneEvent::Modified(id), Some(object)) = (event, object) else {
                return;
            };
            if guard.is_held() {
                return;
            }
            if !attached.borrow().contains(id) {
                trace!(object = %id, "modification of unwatched object ignored");
                return;
            }
            queue.borrow_mut().push(object.clone());
        })
    }

    /// Start watching an object. Returns false when it was already watched.
    pub fn attach(&self, id: LayerId) -> bool {
        self.attached.borrow_mut().insert(id)
    }

    pub fn detach(&self, id: &LayerId) -> bool {
        self.attached.borrow_mut().remove(id)
    }

    pub fn detach_all(&self) {
        self.attached.borrow_mut().clear();
    }

    pub fn is_attached(&self, id: &LayerId) -> bool {
        self.attached.borrow().contains(id)
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Take the queued captures, one per object, latest state wins.
    pub fn drain(&self) -> Vec<SceneObject> {
        let captured: Vec<SceneObject> = self.queue.borrow_mut().drain(..).collect();
        let mut latest: IndexMap<LayerId, SceneObject> = IndexMap::new();
        for object in captured {
            latest.insert(object.id.clone(), object);
        }
        latest.into_values().collect()
    }
}

/// Describe a live object as a layer. Store-only state (tombstone, display
/// name, stored image adjustments) is carried over from `previous`.
pub fn capture_layer(object: &SceneObject, previous: Option<&Layer>) -> Layer {
    let content = match &object.body {
        ObjectBody::Text(props) => {
            let fill = object
                .fill
                .clone()
                .or_else(|| previous.and_then(|l| l.text_style()).map(|s| s.fill.clone()))
                .unwrap_or_else(|| TextStyle::default().fill);
            LayerContent::Text(TextStyle {
                text: props.text.clone(),
                fill,
                font_family: props.font_family.clone(),
                font_size: props.font_size,
                font_weight: props.font_weight,
                font_style: props.font_style.clone(),
                underline: props.underline,
                text_align: props.text_align,
                char_spacing: props.char_spacing,
                line_height: props.line_height,
                shadow: object.shadow.clone(),
            })
        }
        ObjectBody::Image { src } => {
            let mut filters = previous
                .and_then(|l| l.filters())
                .cloned()
                .unwrap_or_default();
            filters.flip_x = object.flip_x;
            filters.flip_y = object.flip_y;
            LayerContent::Image {
                src: src.clone(),
                filters,
            }
        }
        ObjectBody::Shape { shape, stroke } => {
            let previous_fill = previous.and_then(|l| match &l.content {
                LayerContent::Shape { fill, .. } => Some(fill.clone()),
                _ => None,
            });
            LayerContent::Shape {
                shape: *shape,
                fill: object
                    .fill
                    .clone()
                    .or(previous_fill)
                    .unwrap_or_else(|| "#000000".to_string()),
                stroke: stroke.clone(),
            }
        }
    };

    Layer {
        id: object.id.clone(),
        name: previous
            .and_then(|l| l.name.clone())
            .or_else(|| object.name.clone()),
        content,
        geometry: Geometry {
            x: object.left,
            y: object.top,
            width: object.width,
            height: object.height,
            rotation: object.angle,
            scale_x: object.scale_x,
            scale_y: object.scale_y,
        },
        visible: object.visible,
        locked: object
            .locks()
            .uniform_value()
            .unwrap_or_else(|| previous.map(|l| l.locked).unwrap_or(false)),
        should_delete: previous.map(|l| l.should_delete).unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{ImageFilters, ShapeKind};
    use crate::scene::SceneGraph;

    fn scene_with_reverse() -> (SceneGraph, ReverseSync, SyncGuard) {
        let guard = SyncGuard::new();
        let reverse = ReverseSync::new(guard.clone());
        let mut scene = SceneGraph::new(500, 500);
        scene.add_listener(reverse.listener());
        scene.add(SceneObject::shape(LayerId::from("shape-1"), ShapeKind::Rect, 10.0, 10.0));
        reverse.attach(LayerId::from("shape-1"));
        (scene, reverse, guard)
    }

    #[test]
    fn test_user_edit_is_queued() {
        let (mut scene, reverse, _guard) = scene_with_reverse();
        scene.mutate(&LayerId::from("shape-1"), |o| o.left = 40.0);
        scene.mutate(&LayerId::from("shape-1"), |o| o.left = 60.0);
        assert_eq!(reverse.pending(), 2);

        let drained = reverse.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].left, 60.0);
        assert_eq!(reverse.pending(), 0);
    }

    #[test]
    fn test_programmatic_write_not_queued() {
        let (mut scene, reverse, guard) = scene_with_reverse();
        {
            let _token = guard.hold();
            scene.mutate(&LayerId::from("shape-1"), |o| o.left = 40.0);
        }
        assert_eq!(reverse.pending(), 0);
    }

    #[test]
    fn test_detached_object_ignored() {
        let (mut scene, reverse, _guard) = scene_with_reverse();
        reverse.detach(&LayerId::from("shape-1"));
        scene.mutate(&LayerId::from("shape-1"), |o| o.top = 3.0);
        assert_eq!(reverse.pending(), 0);
    }

    #[test]
    fn test_capture_keeps_store_only_state() {
        let mut object = SceneObject::image(LayerId::from("image-1"), "a.png", 100.0, 50.0).at(7.0, 9.0);
        object.flip_y = true;
        object.set_locked(true);

        let mut previous = Layer::new(
            LayerId::from("image-1"),
            LayerContent::Image {
                src: "a.png".to_string(),
                filters: ImageFilters {
                    brightness: 0.3,
                    ..Default::default()
                },
            },
            Geometry::default(),
        );
        previous.name = Some("Packshot".to_string());

        let layer = capture_layer(&object, Some(&previous));
        assert_eq!(layer.name.as_deref(), Some("Packshot"));
        assert!(layer.locked);
        assert_eq!(layer.geometry.x, 7.0);
        let filters = layer.filters().unwrap();
        assert!(filters.flip_y);
        assert_eq!(filters.brightness, 0.3);
    }
}

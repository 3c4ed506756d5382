//! Scene Graph Adapter
//!
//! Thin wrapper over the rendering surface's object collection: lookup,
//! insertion, removal and mutation by id, plus the surface-level state
//! (dimensions, background) and batched render requests.
//!
//! Insertion order of the arena is the paint order (first = bottom).
//! Every add/remove/mutate is reported to the registered listeners.

use std::fmt;

use indexmap::IndexMap;
use tracing::{debug, trace};

use super::object::SceneObject;
use super::snapshot::{SceneDocument, Snapshot, SNAPSHOT_VERSION};
use crate::canvas::{Background, CanvasSettings};
use crate::error::Result;
use crate::layers::LayerId;

/// Change notifications emitted by the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    Added(LayerId),
    Modified(LayerId),
    Removed(LayerId),
    Reordered,
    /// The whole object set was replaced from a snapshot.
    Reloaded,
}

/// Listener callback. The object is present for `Added` and `Modified`.
pub type SceneListener = Box<dyn FnMut(&SceneEvent, Option<&SceneObject>)>;

fn emit(listeners: &mut [SceneListener], event: &SceneEvent, object: Option<&SceneObject>) {
    for listener in listeners.iter_mut() {
        listener(event, object);
    }
}

/// Live object collection of the rendering surface.
pub struct SceneGraph {
    width: u32,
    height: u32,
    background: Background,
    objects: IndexMap<LayerId, SceneObject>,
    listeners: Vec<SceneListener>,
    render_requests: u64,
}

impl fmt::Debug for SceneGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneGraph")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("background", &self.background)
            .field("objects", &self.objects.len())
            .field("render_requests", &self.render_requests)
            .finish()
    }
}

impl SceneGraph {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: Background::default(),
            objects: IndexMap::new(),
            listeners: Vec::new(),
            render_requests: 0,
        }
    }

    pub fn from_settings(settings: &CanvasSettings) -> Self {
        let mut scene = Self::new(settings.width, settings.height);
        scene.background = settings.background.clone();
        scene
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    /// Apply canvas settings: dimensions and background, one render request.
    pub fn apply_settings(&mut self, settings: &CanvasSettings) {
        self.width = settings.width;
        self.height = settings.height;
        self.background = settings.background.clone();
        self.request_render();
    }

    pub fn add_listener(&mut self, listener: SceneListener) {
        self.listeners.push(listener);
    }

    pub fn get(&self, id: &LayerId) -> Option<&SceneObject> {
        self.objects.get(id)
    }

    pub fn contains(&self, id: &LayerId) -> bool {
        self.objects.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects in paint order.
    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.values()
    }

    pub fn ids(&self) -> Vec<LayerId> {
        self.objects.keys().cloned().collect()
    }

    /// Add an object on top. An object with the same id is replaced in place.
    pub fn add(&mut self, object: SceneObject) {
        let id = object.id.clone();
        self.objects.insert(id.clone(), object);
        let event = SceneEvent::Added(id.clone());
        emit(&mut self.listeners, &event, self.objects.get(&id));
    }

    pub fn remove(&mut self, id: &LayerId) -> Option<SceneObject> {
        let removed = self.objects.shift_remove(id)?;
        emit(&mut self.listeners, &SceneEvent::Removed(id.clone()), None);
        Some(removed)
    }

    /// Mutate one object. Returns false, without notifying, for unknown ids.
    pub fn mutate<F>(&mut self, id: &LayerId, update: F) -> bool
    where
        F: FnOnce(&mut SceneObject),
    {
        let Some(object) = self.objects.get_mut(id) else {
            trace!(object = %id, "mutation of missing object skipped");
            return false;
        };
        update(object);
        emit(
            &mut self.listeners,
            &SceneEvent::Modified(id.clone()),
            self.objects.get(id),
        );
        true
    }

    /// Reorder so that `order` (ids with objects) is painted in that sequence
    /// on top of every object not mentioned. Returns whether anything moved.
    pub fn reorder(&mut self, order: &[LayerId]) -> bool {
        let mentioned: Vec<&LayerId> = order.iter().filter(|id| self.contains(id)).collect();
        let mut target: Vec<LayerId> = self
            .objects
            .keys()
            .filter(|id| !mentioned.contains(id))
            .cloned()
            .collect();
        target.extend(mentioned.into_iter().cloned());

        if self.objects.keys().eq(target.iter()) {
            return false;
        }

        let mut reordered = IndexMap::with_capacity(self.objects.len());
        for id in target {
            if let Some(object) = self.objects.shift_remove(&id) {
                reordered.insert(id, object);
            }
        }
        self.objects = reordered;
        emit(&mut self.listeners, &SceneEvent::Reordered, None);
        true
    }

    /// Remove every object.
    pub fn clear(&mut self) {
        self.objects.clear();
        emit(&mut self.listeners, &SceneEvent::Reloaded, None);
    }

    /// Ask the surface for one repaint.
    pub fn request_render(&mut self) {
        self.render_requests += 1;
        trace!(total = self.render_requests, "render requested");
    }

    /// Number of render requests issued so far.
    pub fn render_requests(&self) -> u64 {
        self.render_requests
    }

    /// Full serialization of the scene.
    pub fn to_snapshot(&self) -> Snapshot {
        SceneDocument {
            version: SNAPSHOT_VERSION.to_string(),
            width: self.width,
            height: self.height,
            background: self.background.clone(),
            objects: self.objects.values().cloned().collect(),
        }
        .into_snapshot()
    }

    /// Replace the scene with the content of a snapshot.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<()> {
        let doc = SceneDocument::from_snapshot(snapshot)?;
        self.width = doc.width;
        self.height = doc.height;
        self.background = doc.background;
        self.objects = doc
            .objects
            .into_iter()
            .map(|object| (object.id.clone(), object))
            .collect();
        debug!(objects = self.objects.len(), "scene restored from snapshot");
        emit(&mut self.listeners, &SceneEvent::Reloaded, None);
        self.request_render();
        Ok(())
    }
}

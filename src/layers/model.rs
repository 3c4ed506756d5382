//! Layer Model
//!
//! The canonical, ordered list of layers. Index 0 is the bottom of the stack.
//! Every mutation goes through this API and ends with a change notification
//! to the subscribers, which is how the synchronizer learns it has work to do.

use std::fmt;

use tracing::debug;

use super::layer::{Layer, LayerId, LayerKind, LayerPatch};

/// Callback invoked with the full layer list after every change.
pub type LayerListener = Box<dyn FnMut(&[Layer])>;

/// Handle returned by [`LayerModel::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Direction for z-order moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Towards the top of the stack (end of the list).
    Up,
    /// Towards the bottom of the stack (start of the list).
    Down,
}

/// Store-held layer list with subscriptions.
pub struct LayerModel {
    layers: Vec<Layer>,
    next_id: u64,
    revision: u64,
    listeners: Vec<(SubscriptionId, LayerListener)>,
    next_subscription: u64,
}

impl fmt::Debug for LayerModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerModel")
            .field("layers", &self.layers)
            .field("next_id", &self.next_id)
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for LayerModel {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerModel {
    pub fn new() -> Self {
        Self::with_next_id(1)
    }

    /// Create an empty model whose allocator resumes at `next_id`.
    pub fn with_next_id(next_id: u64) -> Self {
        Self {
            layers: Vec::new(),
            next_id: next_id.max(1),
            revision: 0,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn get(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| &l.id == id)
    }

    pub fn position(&self, id: &LayerId) -> Option<usize> {
        self.layers.iter().position(|l| &l.id == id)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Number of notifications delivered so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Next counter value the allocator will try.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Allocate a fresh id. The counter only moves forward and skips ids that
    /// are already present, so an id is never handed out twice.
    pub fn allocate_id(&mut self, kind: LayerKind) -> LayerId {
        loop {
            let candidate = LayerId::new(format!("{}-{}", kind.id_prefix(), self.next_id));
            self.next_id += 1;
            if self.get(&candidate).is_none() {
                return candidate;
            }
        }
    }

    /// Register a change listener.
    pub fn subscribe(&mut self, listener: LayerListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    /// Replace the whole list (template load, history restore).
    pub fn set_layers(&mut self, layers: Vec<Layer>) {
        self.layers = layers;
        self.notify();
    }

    /// Append a layer on top of the stack.
    pub fn push(&mut self, layer: Layer) {
        self.layers.push(layer);
        self.notify();
    }

    /// Mutate one layer in place. Returns false when the id is unknown.
    pub fn update_layer<F>(&mut self, id: &LayerId, update: F) -> bool
    where
        F: FnOnce(&mut Layer),
    {
        match self.layers.iter_mut().find(|l| &l.id == id) {
            Some(layer) => {
                update(layer);
                self.notify();
                true
            }
            None => {
                debug!(layer = %id, "update for unknown layer ignored");
                false
            }
        }
    }

    /// Apply a partial update. Returns whether the layer changed; no
    /// notification is sent for a patch that changes nothing.
    pub fn apply_patch(&mut self, id: &LayerId, patch: &LayerPatch) -> bool {
        let Some(layer) = self.layers.iter_mut().find(|l| &l.id == id) else {
            debug!(layer = %id, "patch for unknown layer ignored");
            return false;
        };
        let changed = patch.apply_to(layer);
        if changed {
            self.notify();
        }
        changed
    }

    /// Set the deletion tombstone.
    pub fn mark_for_deletion(&mut self, id: &LayerId) -> bool {
        self.apply_patch(
            id,
            &LayerPatch {
                should_delete: Some(true),
                ..Default::default()
            },
        )
    }

    /// Drop every tombstoned layer, returning their ids.
    pub fn prune_deleted(&mut self) -> Vec<LayerId> {
        let pruned: Vec<LayerId> = self
            .layers
            .iter()
            .filter(|l| l.should_delete)
            .map(|l| l.id.clone())
            .collect();
        if !pruned.is_empty() {
            self.layers.retain(|l| !l.should_delete);
            self.notify();
        }
        pruned
    }

    /// Swap a layer with its neighbour. Returns false at the stack edges.
    pub fn move_layer(&mut self, id: &LayerId, direction: MoveDirection) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let target = match direction {
            MoveDirection::Up if index + 1 < self.layers.len() => index + 1,
            MoveDirection::Down if index > 0 => index - 1,
            _ => return false,
        };
        self.layers.swap(index, target);
        self.notify();
        true
    }

    fn notify(&mut self) {
        self.revision += 1;
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.layers);
        }
    }
}

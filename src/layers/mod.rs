//! Layer Model Module
//!
//! Layer descriptors and the store that owns them:
//! - `layer`: the layer record, its kind-specific content and partial patches
//! - `model`: the ordered list, id allocation and change subscriptions

mod layer;
mod model;

pub use layer::{
    Geometry, ImageFilters, Layer, LayerContent, LayerId, LayerKind, LayerPatch, Shadow,
    ShapeKind, TextAlign, TextStyle,
};
pub use model::{LayerListener, LayerModel, MoveDirection, SubscriptionId};

//! Scene Graph Module
//!
//! The live, mutable object collection drawn by the rendering surface:
//! - `object`: scene objects and their render-side geometry
//! - `graph`: the id-keyed arena with events and render requests
//! - `snapshot`: full-scene serialization used by history

mod graph;
mod object;
mod snapshot;

pub use graph::{SceneEvent, SceneGraph, SceneListener};
pub use object::{
    estimate_text_box, LockFlags, ObjectBody, OriginX, OriginY, Rect, SceneObject, TextProps,
    TransientState,
};
pub use snapshot::{Snapshot, SNAPSHOT_VERSION};

//! Layer Sync Module
//!
//! Keeps the scene graph consistent with the layer model:
//! - `forward`: store -> scene reconciliation, one pass per change notification
//! - `reverse`: queued captures of user edits, scene -> store
//! - `guard`: the shared flag separating the two

mod forward;
mod guard;
mod reverse;

pub use forward::{SyncReport, Synchronizer};
pub use guard::{GuardToken, SyncGuard};
pub use reverse::{capture_layer, ReverseSync};

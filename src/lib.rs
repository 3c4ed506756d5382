//! Atelier - Scene Consistency Core for a Layered Creative Editor
//!
//! Atelier keeps two views of one design consistent:
//! 1. The Layer Model - the ordered, serializable list of layers the panels edit
//! 2. The Scene Graph - the live objects the rendering surface draws and the
//!    user drags around
//!
//! # Architecture
//!
//! - `sync`: forward reconciliation (layers to scene) and the reverse path
//!   (user edits on the scene back into layers), sharing a re-entrancy guard
//! - `history`: bounded undo/redo over full scene snapshots
//! - `layout`: role classification and the composition patterns
//! - `export`: byte-budgeted raster export
//! - `editor`: the single-threaded orchestrator wiring all of the above

pub mod brand;
pub mod canvas;
pub mod cli;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod export;
pub mod history;
pub mod layers;
pub mod layout;
pub mod scene;
pub mod sync;
pub mod template;

pub use canvas::{Background, CanvasFormat, CanvasSettings};
pub use config::EditorConfig;
pub use document::Document;
pub use editor::{Editor, ImagePlacement};
pub use error::{AtelierError, Result};
pub use history::HistoryManager;
pub use layers::{Layer, LayerId, LayerModel, LayerPatch};
pub use layout::{apply_auto_layout, LayoutOutcome, LayoutPattern};
pub use scene::{SceneGraph, SceneObject, Snapshot};

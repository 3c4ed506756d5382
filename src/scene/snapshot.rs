//! Scene snapshots
//!
//! A snapshot is the full serialization of the scene graph at one instant.
//! History treats it as opaque and only ever compares two snapshots for deep
//! equality.

use serde::{Deserialize, Serialize};

use super::object::SceneObject;
use crate::canvas::Background;
use crate::error::{AtelierError, Result};

/// Serialization schema version written into every snapshot.
pub const SNAPSHOT_VERSION: &str = "1.0";

/// Opaque, comparable capture of the scene graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(serde_json::Value);

impl Snapshot {
    pub fn from_value(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

/// Typed view of the snapshot payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct SceneDocument {
    pub version: String,
    pub width: u32,
    pub height: u32,
    pub background: Background,
    pub objects: Vec<SceneObject>,
}

impl SceneDocument {
    pub fn into_snapshot(self) -> Snapshot {
        // Plain data with string keys; serialization cannot fail.
        Snapshot(serde_json::to_value(self).unwrap_or(serde_json::Value::Null))
    }

    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self> {
        let doc: SceneDocument = serde_json::from_value(snapshot.0.clone()).map_err(|e| {
            AtelierError::SnapshotRestore {
                reason: e.to_string(),
            }
        })?;
        if doc.version != SNAPSHOT_VERSION {
            return Err(AtelierError::SnapshotRestore {
                reason: format!("unsupported snapshot version {}", doc.version),
            });
        }
        Ok(doc)
    }
}

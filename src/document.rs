//! Document files
//!
//! The editing session as a single local JSON file: canvas settings, the
//! layer list with its id allocator, the scene snapshot and the history.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::canvas::CanvasSettings;
use crate::error::{AtelierError, Result};
use crate::history::HistoryManager;
use crate::layers::Layer;
use crate::scene::Snapshot;

/// Current document schema version.
pub const DOCUMENT_VERSION: &str = "1.0";

/// Default document file name used by the CLI.
pub const DEFAULT_DOCUMENT_FILE: &str = "creative.json";

fn default_version() -> String {
    DOCUMENT_VERSION.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    #[serde(default = "default_version")]
    pub version: String,
    pub saved_at: DateTime<Utc>,
    pub canvas: CanvasSettings,
    /// Canvas the session started on.
    #[serde(default)]
    pub base_canvas: Option<CanvasSettings>,
    /// Next value of the layer id allocator.
    pub next_layer_id: u64,
    pub layers: Vec<Layer>,
    pub scene: Snapshot,
    #[serde(default)]
    pub history: HistoryManager,
}

impl Document {
    /// Read a document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AtelierError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path).map_err(|e| AtelierError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let document: Document = serde_json::from_reader(BufReader::new(file))?;
        if document.version != DOCUMENT_VERSION {
            return Err(AtelierError::InvalidConfig {
                reason: format!(
                    "unsupported document version {} in {}",
                    document.version,
                    path.display()
                ),
            });
        }
        Ok(document)
    }

    /// Write the document to disk, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| AtelierError::DirectoryCreateError {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let file = File::create(path).map_err(|e| AtelierError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush().map_err(|e| AtelierError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!(path = %path.display(), layers = self.layers.len(), "document saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn empty_document() -> Document {
        Document {
            version: DOCUMENT_VERSION.to_string(),
            saved_at: Utc::now(),
            canvas: CanvasSettings::default(),
            base_canvas: None,
            next_layer_id: 4,
            layers: Vec::new(),
            scene: Snapshot::from_value(serde_json::json!({})),
            history: HistoryManager::default(),
        }
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join(DEFAULT_DOCUMENT_FILE);
        empty_document().save(&path).unwrap();

        let loaded = Document::load(&path).unwrap();
        assert_eq!(loaded.next_layer_id, 4);
        assert_eq!(loaded.canvas, CanvasSettings::default());
    }

    #[test]
    fn test_rejects_unknown_version() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.json");
        let mut doc = empty_document();
        doc.version = "9.9".to_string();
        doc.save(&path).unwrap();
        assert!(matches!(Document::load(&path), Err(AtelierError::InvalidConfig { .. })));
    }

    #[test]
    fn test_missing_document() {
        let err = Document::load(Path::new("/nonexistent/creative.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    }
}

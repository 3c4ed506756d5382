//! Download sinks
//!
//! Where a finished export lands. The browser-side equivalent is an anchor
//! click; here it is a file written into a directory, or a buffer kept in
//! memory for callers that want the bytes.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use tracing::info;

use crate::error::{AtelierError, Result};

/// Receives the decoded bytes of a finished export.
pub trait DownloadSink {
    /// Deliver `bytes` under `filename`, returning where it went.
    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> Result<String>;
}

/// Writes downloads into a directory.
#[derive(Debug, Clone)]
pub struct DirectoryDownload {
    dir: PathBuf,
}

impl DirectoryDownload {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadSink for DirectoryDownload {
    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> Result<String> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| AtelierError::DirectoryCreateError {
                path: self.dir.clone(),
                source: e,
            })?;
        }

        let path = self.dir.join(filename);
        let file = fs::File::create(&path).map_err(|e| AtelierError::FileWriteError {
            path: path.clone(),
            source: e,
        })?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(bytes)
            .and_then(|_| writer.flush())
            .map_err(|e| AtelierError::FileWriteError {
                path: path.clone(),
                source: e,
            })?;

        info!(path = %path.display(), bytes = bytes.len(), "export saved");
        Ok(path.display().to_string())
    }
}

/// Keeps every download in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDownload {
    pub files: Vec<(String, Vec<u8>)>,
}

impl MemoryDownload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&(String, Vec<u8>)> {
        self.files.last()
    }
}

impl DownloadSink for MemoryDownload {
    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> Result<String> {
        self.files.push((filename.to_string(), bytes.to_vec()));
        Ok(format!("memory:{filename}"))
    }
}

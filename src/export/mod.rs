//! Export Encoder
//!
//! Byte-budgeted raster export of the rendering surface:
//! - `surface`: the encode hook and a frame-backed implementation
//! - `search`: the quality/resolution search
//! - `download`: delivery of the finished file

mod download;
mod search;
mod surface;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use download::{DirectoryDownload, DownloadSink, MemoryDownload};
pub use search::export_scene;
pub use surface::{decode_data_url, estimate_bytes, FrameSurface, RasterSurface};

/// Supported raster formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Lossless, quality is ignored.
    Png,
    /// Lossy.
    Jpeg,
}

impl ExportFormat {
    /// Parse a format identifier. Unknown identifiers yield `None`.
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_ascii_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpeg" | "jpg" => Some(ExportFormat::Jpeg),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
        }
    }

    pub fn is_lossy(&self) -> bool {
        matches!(self, ExportFormat::Jpeg)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Png => write!(f, "png"),
            ExportFormat::Jpeg => write!(f, "jpeg"),
        }
    }
}

/// What the caller asks for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    /// Format identifier, e.g. `png` or `jpeg`.
    pub format: String,
    /// Quality of the first attempt, in `[0, 1]`.
    #[serde(default = "full_quality")]
    pub quality: f64,
    /// Overrides the configured budget when set.
    #[serde(default)]
    pub byte_budget: Option<usize>,
}

fn full_quality() -> f64 {
    1.0
}

impl Default for ExportRequest {
    fn default() -> Self {
        Self {
            format: "png".to_string(),
            quality: full_quality(),
            byte_budget: None,
        }
    }
}

/// Outcome of a finished export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportReport {
    /// Encoded payload of the delivered attempt.
    #[serde(skip)]
    pub data_url: String,
    pub format: ExportFormat,
    pub quality: f64,
    pub multiplier: f64,
    pub estimated_bytes: usize,
    pub byte_budget: usize,
    pub attempts: u32,
    /// True when even the last attempt is larger than the budget.
    pub exceeded_budget: bool,
    pub filename: String,
    /// Where the sink put the file.
    pub location: String,
    pub sha256: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ids() {
        assert_eq!(ExportFormat::from_id("PNG"), Some(ExportFormat::Png));
        assert_eq!(ExportFormat::from_id("jpg"), Some(ExportFormat::Jpeg));
        assert_eq!(ExportFormat::from_id("webp"), None);
        assert!(ExportFormat::Jpeg.is_lossy());
        assert_eq!(ExportFormat::Jpeg.extension(), "jpeg");
    }

    #[test]
    fn test_request_defaults_from_json() {
        let request: ExportRequest = serde_json::from_str(r#"{"format": "jpeg"}"#).unwrap();
        assert_eq!(request.quality, 1.0);
        assert_eq!(request.byte_budget, None);
    }
}

//! Error handling for Atelier
//!
//! The scene core resolves its expected conditions (missing objects, unknown
//! layout patterns, empty history, an export that overshoots its budget) to
//! no-ops or best-effort results. The variants here cover the genuine failures
//! around it: file I/O, JSON, image encoding and bad user input.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Atelier operations
pub type Result<T> = std::result::Result<T, AtelierError>;

/// Main error type for Atelier operations
#[derive(Error, Debug)]
pub enum AtelierError {
    // File Errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to read file: {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory creation failed: {path}: {source}")]
    DirectoryCreateError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Input Errors
    #[error("Invalid canvas format: {format} (expected WIDTHxHEIGHT)")]
    InvalidFormat { format: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Invalid layer patch: {reason}")]
    InvalidPatch { reason: String },

    #[error("Invalid asset: {reason}")]
    InvalidAsset { reason: String },

    // Encoding Errors
    #[error("Raster encoding failed: {reason}")]
    Encoding { reason: String },

    #[error("Malformed data URL: {reason}")]
    MalformedDataUrl { reason: String },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    // Snapshot Errors
    #[error("Snapshot could not be restored: {reason}")]
    SnapshotRestore { reason: String },

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AtelierError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            AtelierError::FileNotFound { .. } => "FILE_NOT_FOUND",
            AtelierError::FileReadError { .. } => "FILE_READ_ERROR",
            AtelierError::FileWriteError { .. } => "FILE_WRITE_ERROR",
            AtelierError::DirectoryCreateError { .. } => "DIRECTORY_CREATE_ERROR",
            AtelierError::InvalidFormat { .. } => "INVALID_FORMAT",
            AtelierError::InvalidConfig { .. } => "INVALID_CONFIG",
            AtelierError::InvalidPatch { .. } => "INVALID_PATCH",
            AtelierError::InvalidAsset { .. } => "INVALID_ASSET",
            AtelierError::Encoding { .. } => "ENCODING_ERROR",
            AtelierError::MalformedDataUrl { .. } => "MALFORMED_DATA_URL",
            AtelierError::Image(_) => "IMAGE_ERROR",
            AtelierError::Base64(_) => "BASE64_ERROR",
            AtelierError::SnapshotRestore { .. } => "SNAPSHOT_RESTORE_ERROR",
            AtelierError::Serialization(_) => "SERIALIZATION_ERROR",
            AtelierError::Io(_) => "IO_ERROR",
        }
    }

    /// Returns a user-friendly recovery suggestion.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            AtelierError::FileNotFound { .. } => Some("Check the file path and try again."),
            AtelierError::InvalidFormat { .. } => {
                Some("Use a preset (1080x1080, 1080x1920, 1200x628) or WIDTHxHEIGHT.")
            }
            AtelierError::InvalidConfig { .. } => {
                Some("Fix the configuration file or remove it to use defaults.")
            }
            AtelierError::InvalidPatch { .. } => {
                Some("Patches are JSON objects with optional layer fields.")
            }
            AtelierError::Encoding { .. } | AtelierError::Image(_) => {
                Some("Try exporting as JPEG or with a smaller frame.")
            }
            AtelierError::SnapshotRestore { .. } => {
                Some("The history entry may be corrupted; try undoing one more step.")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AtelierError::InvalidFormat {
            format: "square".to_string(),
        };
        assert_eq!(err.error_code(), "INVALID_FORMAT");
        assert!(err.to_string().contains("square"));
    }

    #[test]
    fn test_recovery_suggestions() {
        let err = AtelierError::FileNotFound {
            path: PathBuf::from("scene.json"),
        };
        assert!(err.recovery_suggestion().is_some());

        let err = AtelierError::Serialization(
            serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        );
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
        assert!(err.recovery_suggestion().is_none());
    }
}

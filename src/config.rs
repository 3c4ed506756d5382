//! Editor Configuration
//!
//! JSON configuration with every field defaulted, so an empty object (or no
//! file at all) yields the stock editor. A few values can be overridden from
//! the environment:
//!
//! - `ATELIER_HISTORY_DEPTH`: maximum number of history entries
//! - `ATELIER_EXPORT_BUDGET`: export byte budget

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::canvas::CanvasSettings;
use crate::error::{AtelierError, Result};
use crate::history::DEFAULT_MAX_DEPTH;

/// Environment variable overriding [`HistoryConfig::max_depth`].
pub const ENV_HISTORY_DEPTH: &str = "ATELIER_HISTORY_DEPTH";

/// Environment variable overriding [`ExportConfig::byte_budget`].
pub const ENV_EXPORT_BUDGET: &str = "ATELIER_EXPORT_BUDGET";

/// Default export byte budget (500 KiB).
pub const DEFAULT_BYTE_BUDGET: usize = 500 * 1024;

/// Top-level editor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub history: HistoryConfig,
    pub export: ExportConfig,
    pub canvas: CanvasSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of recorded states.
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Parameters of the size-bounded export search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Target size of the delivered file.
    pub byte_budget: usize,
    /// Resolution multiplier of the first attempt.
    pub initial_multiplier: f64,
    /// Lossy quality the search starts from.
    pub search_quality: f64,
    /// Resolution multiplier the search starts from.
    pub search_multiplier: f64,
    /// Below this quality the search shrinks resolution instead.
    pub quality_switch_floor: f64,
    /// Lowest quality ever tried.
    pub quality_floor: f64,
    /// Factor applied to the multiplier on each shrink.
    pub multiplier_decay: f64,
    /// Smallest multiplier ever tried.
    pub min_multiplier: f64,
    /// Hard cap on encodings per export, first attempt included.
    pub max_attempts: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            byte_budget: DEFAULT_BYTE_BUDGET,
            initial_multiplier: 2.0,
            search_quality: 0.8,
            search_multiplier: 1.5,
            quality_switch_floor: 0.5,
            quality_floor: 0.1,
            multiplier_decay: 0.8,
            min_multiplier: 0.1,
            max_attempts: 64,
        }
    }
}

impl ExportConfig {
    fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| {
            Err(AtelierError::InvalidConfig {
                reason: reason.to_string(),
            })
        };
        if self.byte_budget == 0 {
            return invalid("export.byte_budget must be positive");
        }
        if !(0.0 < self.multiplier_decay && self.multiplier_decay < 1.0) {
            return invalid("export.multiplier_decay must be between 0 and 1");
        }
        if self.min_multiplier <= 0.0 || self.initial_multiplier <= 0.0 || self.search_multiplier <= 0.0 {
            return invalid("export multipliers must be positive");
        }
        if !(self.quality_floor > 0.0
            && self.quality_floor <= self.quality_switch_floor
            && self.quality_switch_floor <= self.search_quality
            && self.search_quality <= 1.0)
        {
            return invalid("export qualities must satisfy 0 < floor <= switch floor <= search quality <= 1");
        }
        if self.max_attempts == 0 {
            return invalid("export.max_attempts must be at least 1");
        }
        Ok(())
    }
}

impl EditorConfig {
    /// Load configuration from `path` (defaults when `None`), then apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AtelierError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path).map_err(|e| AtelierError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: EditorConfig = serde_json::from_str(&content)?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Apply overrides looked up through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_HISTORY_DEPTH) {
            self.history.max_depth = parse_override(ENV_HISTORY_DEPTH, &raw)?;
        }
        if let Some(raw) = lookup(ENV_EXPORT_BUDGET) {
            self.export.byte_budget = parse_override(ENV_EXPORT_BUDGET, &raw)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.history.max_depth == 0 {
            return Err(AtelierError::InvalidConfig {
                reason: "history.max_depth must be at least 1".to_string(),
            });
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(AtelierError::InvalidConfig {
                reason: "canvas dimensions must be positive".to_string(),
            });
        }
        self.export.validate()
    }
}

fn parse_override(key: &str, raw: &str) -> Result<usize> {
    raw.trim().parse().map_err(|_| AtelierError::InvalidConfig {
        reason: format!("{key} must be a non-negative integer, got {raw:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.history.max_depth, 50);
        assert_eq!(config.export.byte_budget, 512_000);
        assert_eq!(config.canvas.width, 1080);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"export": {{"byte_budget": 1000}}}}"#).unwrap();

        let config = EditorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.export.byte_budget, 1000);
        assert_eq!(config.export.max_attempts, 64);
        assert_eq!(config.history.max_depth, 50);
    }

    #[test]
    fn test_missing_file() {
        let err = EditorConfig::from_file(Path::new("/nonexistent/atelier.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    }

    #[test]
    fn test_environment_overrides() {
        let mut config = EditorConfig::default();
        config
            .apply_overrides(|key| match key {
                ENV_HISTORY_DEPTH => Some("7".to_string()),
                ENV_EXPORT_BUDGET => Some(" 2048 ".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.history.max_depth, 7);
        assert_eq!(config.export.byte_budget, 2048);

        let bad = config.apply_overrides(|key| (key == ENV_HISTORY_DEPTH).then(|| "deep".to_string()));
        assert!(matches!(bad, Err(AtelierError::InvalidConfig { .. })));
    }

    #[test]
    fn test_rejects_inconsistent_export_search() {
        let mut config = EditorConfig::default();
        config.export.multiplier_decay = 1.5;
        assert!(config.validate().is_err());

        let mut config = EditorConfig::default();
        config.export.quality_floor = 0.9;
        assert!(config.validate().is_err());
    }
}

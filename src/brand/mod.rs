//! Brand Kit
//!
//! Colours, fonts and presets the user keeps across sessions. Persistence
//! goes through a [`KeyValueStore`] supplied by the caller.

mod store;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use store::{FileStore, KeyValueStore, MemoryStore};

use crate::error::Result;

/// Storage key of the brand kit.
pub const BRAND_KIT_KEY: &str = "brandKit";

/// Default picks for new content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandPresets {
    pub primary_color: String,
    pub headline_font: String,
}

impl Default for BrandPresets {
    fn default() -> Self {
        Self {
            primary_color: "#6366f1".to_string(),
            headline_font: "Inter".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandKit {
    pub colors: Vec<String>,
    pub fonts: Vec<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub presets: BrandPresets,
}

impl Default for BrandKit {
    fn default() -> Self {
        Self {
            colors: vec![
                "#FF0000".to_string(),
                "#00FF00".to_string(),
                "#0000FF".to_string(),
            ],
            fonts: vec![
                "Inter".to_string(),
                "Roboto".to_string(),
                "Poppins".to_string(),
            ],
            logo: None,
            presets: BrandPresets::default(),
        }
    }
}

/// Shallow update: every present field replaces the stored one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrandKitUpdate {
    #[serde(default)]
    pub colors: Option<Vec<String>>,
    #[serde(default)]
    pub fonts: Option<Vec<String>>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub presets: Option<BrandPresets>,
}

impl BrandKit {
    pub fn merge(&mut self, update: BrandKitUpdate) {
        if let Some(colors) = update.colors {
            self.colors = colors;
        }
        if let Some(fonts) = update.fonts {
            self.fonts = fonts;
        }
        if let Some(logo) = update.logo {
            self.logo = Some(logo);
        }
        if let Some(presets) = update.presets {
            self.presets = presets;
        }
    }
}

/// Brand kit bound to a store.
pub struct BrandKitRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> BrandKitRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Stored kit, or the defaults when nothing usable is stored.
    pub fn load(&self) -> Result<BrandKit> {
        let Some(raw) = self.store.load(BRAND_KIT_KEY)? else {
            return Ok(BrandKit::default());
        };
        match serde_json::from_str(&raw) {
            Ok(kit) => Ok(kit),
            Err(e) => {
                warn!(error = %e, "stored brand kit unreadable, using defaults");
                Ok(BrandKit::default())
            }
        }
    }

    /// Merge `update` into the stored kit and persist the result.
    pub fn update(&mut self, update: BrandKitUpdate) -> Result<BrandKit> {
        let mut kit = self.load()?;
        kit.merge(update);
        self.store
            .save(BRAND_KIT_KEY, &serde_json::to_string_pretty(&kit)?)?;
        info!(colors = kit.colors.len(), fonts = kit.fonts.len(), "brand kit saved");
        Ok(kit)
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let repo = BrandKitRepository::new(MemoryStore::new());
        let kit = repo.load().unwrap();
        assert_eq!(kit.colors, vec!["#FF0000", "#00FF00", "#0000FF"]);
        assert_eq!(kit.fonts, vec!["Inter", "Roboto", "Poppins"]);
        assert_eq!(kit.presets.primary_color, "#6366f1");
        assert!(kit.logo.is_none());
    }

    #[test]
    fn test_update_merges_and_persists() {
        let mut repo = BrandKitRepository::new(MemoryStore::new());
        repo.update(BrandKitUpdate {
            colors: Some(vec!["#123456".to_string()]),
            ..Default::default()
        })
        .unwrap();

        let kit = repo.load().unwrap();
        assert_eq!(kit.colors, vec!["#123456"]);
        assert_eq!(kit.fonts.len(), 3);

        let raw = repo.into_store().load(BRAND_KIT_KEY).unwrap().unwrap();
        assert!(raw.contains("primaryColor"));
    }

    #[test]
    fn test_corrupt_entry_falls_back() {
        let mut store = MemoryStore::new();
        store.save(BRAND_KIT_KEY, "not json").unwrap();
        let repo = BrandKitRepository::new(store);
        assert_eq!(repo.load().unwrap(), BrandKit::default());
    }
}

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Startup settings for the local catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// SQLite file holding the apartments and floor plans
    pub database_path: PathBuf,
    /// Load the fixed catalog into an empty store on startup
    pub seed_on_start: bool,
    /// Where the catalog snapshot is written as JSON
    pub export_path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("apartments.db"),
            seed_on_start: true,
            export_path: PathBuf::from("apartments.json"),
        }
    }
}

impl CatalogConfig {
    /// Defaults overridden by `APARTMENT_DB_PATH`, `APARTMENT_SEED` and
    /// `APARTMENT_EXPORT_PATH`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("APARTMENT_DB_PATH").filter(|p| !p.trim().is_empty()) {
            config.database_path = PathBuf::from(path);
        }
        if let Some(flag) = lookup("APARTMENT_SEED") {
            config.seed_on_start = !matches!(flag.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off");
        }
        if let Some(path) = lookup("APARTMENT_EXPORT_PATH").filter(|p| !p.trim().is_empty()) {
            config.export_path = PathBuf::from(path);
        }

        config
    }
}

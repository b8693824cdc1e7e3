//! Configuration for Daily Verse CLI
//!
//! Settings are resolved from, in increasing priority: built-in defaults,
//! the persisted translation preference, environment variables and CLI flags.
//!
//! # Environment Variables
//! - `DAILYVERSE_TRANSLATION` - Translation id (default: persisted choice, then "web")
//! - `DAILYVERSE_API_BASE` - Bible API base URL (default: https://bible-api.com)
//! - `DAILYVERSE_DATA_DIR` - Where cache and preferences are stored

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use directories::ProjectDirs;
use thiserror::Error;
use tracing::warn;

use crate::data::bible_api::BIBLE_API_BASE_URL;
use crate::data::{get_translation_by_id, DEFAULT_TRANSLATION};
use crate::storage::{Storage, StorageError};

/// Storage key of the persisted translation preference
pub const SELECTED_TRANSLATION_KEY: &str = "selectedTranslation";

const ENV_TRANSLATION: &str = "DAILYVERSE_TRANSLATION";
const ENV_API_BASE: &str = "DAILYVERSE_API_BASE";
const ENV_DATA_DIR: &str = "DAILYVERSE_DATA_DIR";

/// Errors raised while resolving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The translation id is not one of the known translations
    #[error("Unknown translation: '{0}'. Valid translations: web, kjv, bbe, oeb-us")]
    UnknownTranslation(String),

    /// No data directory was given and none could be derived from the home directory
    #[error("Could not determine a data directory; pass --data-dir or set DAILYVERSE_DATA_DIR")]
    NoDataDir,

    /// Persisting a preference failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Resolved runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Translation id passed to every fetch
    pub translation: String,
    /// Bible API base URL
    pub api_base_url: String,
    /// Directory holding the cache and preferences
    pub data_dir: PathBuf,
}

impl Settings {
    /// Resolves settings from the process environment
    ///
    /// # Arguments
    /// * `data_dir` - Already resolved data directory (see `resolve_data_dir`)
    /// * `preferences` - Persisted preferences
    /// * `cli_translation` - Value of `--translation`, if given
    pub fn load(
        data_dir: PathBuf,
        preferences: &Preferences,
        cli_translation: Option<&str>,
    ) -> Result<Self, ConfigError> {
        Self::load_with(data_dir, preferences, cli_translation, |key| env::var(key).ok())
    }

    /// Same as `load`, reading variables through `lookup`
    pub fn load_with(
        data_dir: PathBuf,
        preferences: &Preferences,
        cli_translation: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let translation = match cli_translation.map(str::to_string).or_else(|| lookup(ENV_TRANSLATION)) {
            Some(id) => validate_translation(&id)?,
            None => preferences.selected_translation(),
        };

        let api_base_url = lookup(ENV_API_BASE)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| BIBLE_API_BASE_URL.to_string());

        Ok(Self {
            translation,
            api_base_url,
            data_dir,
        })
    }
}

/// Picks the data directory: CLI flag, then environment, then XDG data dir
pub fn resolve_data_dir(cli_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    resolve_data_dir_with(cli_dir, |key| env::var(key).ok())
}

/// Same as `resolve_data_dir`, reading variables through `lookup`
pub fn resolve_data_dir_with(
    cli_dir: Option<PathBuf>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = cli_dir {
        return Ok(dir);
    }
    if let Some(dir) = lookup(ENV_DATA_DIR).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("", "", "dailyverse")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or(ConfigError::NoDataDir)
}

/// Returns `id` if it names a known translation
pub fn validate_translation(id: &str) -> Result<String, ConfigError> {
    let normalized = id.trim().to_lowercase();
    get_translation_by_id(&normalized)
        .map(|t| t.id.to_string())
        .ok_or_else(|| ConfigError::UnknownTranslation(id.to_string()))
}

/// Persisted user preferences
pub struct Preferences {
    storage: Arc<dyn Storage>,
}

impl Preferences {
    /// Creates preferences backed by `storage`
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// The persisted translation, or "web" if none or an unknown one is stored
    pub fn selected_translation(&self) -> String {
        let stored = match self.storage.get(SELECTED_TRANSLATION_KEY) {
            Ok(Some(bytes)) => serde_json::from_slice::<String>(&bytes).ok(),
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read translation preference: {}", e);
                None
            }
        };

        match stored {
            Some(id) if get_translation_by_id(&id).is_some() => id,
            Some(id) => {
                warn!("Ignoring unknown stored translation '{}'", id);
                DEFAULT_TRANSLATION.to_string()
            }
            None => DEFAULT_TRANSLATION.to_string(),
        }
    }

    /// Persists `id` as the selected translation and returns the stored id
    pub fn set_translation(&self, id: &str) -> Result<String, ConfigError> {
        let id = validate_translation(id)?;
        let bytes = serde_json::to_vec(&id).map_err(StorageError::from)?;
        self.storage.set(SELECTED_TRANSLATION_KEY, &bytes)?;
        Ok(id)
    }

    /// Restores the default translation
    pub fn reset(&self) -> Result<(), ConfigError> {
        self.storage.remove(SELECTED_TRANSLATION_KEY)?;
        Ok(())
    }
}

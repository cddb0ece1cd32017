//! Engine configuration
//!
//! Re-exports the shared settings from curse-types and adds persistence.
//! The config lives in the platform config dir under app name `curse`.

use std::path::{Path, PathBuf};

pub use curse_types::CurseConfig;

use super::ConfigError;

const APP_NAME: &str = "curse";
const CONFIG_NAME: &str = "config";

// ─────────────────────────────────────────────────────────────────────────────
// CurseConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for CurseConfig persistence
pub trait CurseConfigExt: Sized {
    /// Load the stored config, falling back to defaults when it is unreadable.
    fn load() -> Self;
    fn try_load() -> Result<Self, ConfigError>;
    /// Load an explicit TOML file. Missing sections keep their defaults.
    fn load_from(path: &Path) -> Result<Self, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
}

impl CurseConfigExt for CurseConfig {
    fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Config unreadable, using defaults");
                Self::default()
            }
        }
    }

    fn try_load() -> Result<Self, ConfigError> {
        Ok(confy::load(APP_NAME, CONFIG_NAME)?)
    }

    fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }
}

/// Where `load`/`save` keep the file.
pub fn config_path() -> Option<PathBuf> {
    confy::get_configuration_file_path(APP_NAME, CONFIG_NAME).ok()
}

use std::{fs, path::Path};

use getset::{Getters, Setters};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Result, fs::config_dir};

const CURRENT_CONFIG_VERSION: u16 = 1;
const FILE_NAME: &str = "core.toml";

pub const DEFAULT_STORAGE_KEY: &str = "nm_profiles_simple_v2";
pub const DEFAULT_EXPORT_FILE_NAME: &str = "profiles.json";

/// The library's core configuration, serialized to TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, Setters)]
#[getset(get = "pub", set = "pub")]
#[serde(default)]
pub struct CoreConfig {
    version: u16,
    /// Key of the blob profiles are persisted under
    storage_key: String,
    /// File name suggested for exports
    export_file_name: String,
}

impl CoreConfig {
    /// Load the configuration from the config directory, writing the defaults there
    /// on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_dir()?.join(FILE_NAME))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            Ok(toml::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring unreadable {}: {err}", path.display());
                Self::default()
            }))
        } else {
            let cfg = Self::default();
            cfg.save_to(path)?;
            Ok(cfg)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;

        Ok(())
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            storage_key: DEFAULT_STORAGE_KEY.into(),
            export_file_name: DEFAULT_EXPORT_FILE_NAME.into(),
        }
    }
}

//! Persistent CLI configuration.
//!
//! Read from `config.toml` in the platform config directory:
//! `~/.config/zakatinator/` on Linux, `~/Library/Application Support/zakatinator/`
//! on macOS and `%APPDATA%\zakatinator\` on Windows.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const APP_DIR: &str = "zakatinator";
const HISTORY_FILE: &str = "history.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CliConfig {
    /// Where calculations and payments are stored.
    pub history_path: Option<PathBuf>,
    /// Enable file logging by default.
    pub enable_logging: Option<bool>,
}

impl CliConfig {
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR))
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.toml"))
    }

    /// Loads the default config file. Missing or unreadable files yield defaults.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            debug!("Could not determine config directory");
            return Self::default();
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            debug!("No config file found at {:?}", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<CliConfig>(&content) {
                Ok(config) => {
                    debug!("Loaded configuration from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse config file {:?}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// The configured history file, else `<data_dir>/zakatinator/history.json`,
    /// else `history.json` in the working directory.
    pub fn resolved_history_path(&self) -> PathBuf {
        self.history_path
            .clone()
            .or_else(|| dirs::data_dir().map(|p| p.join(APP_DIR).join(HISTORY_FILE)))
            .unwrap_or_else(|| PathBuf::from(HISTORY_FILE))
    }

    pub fn logging_enabled(&self) -> bool {
        self.enable_logging.unwrap_or(false)
    }
}

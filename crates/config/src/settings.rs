// User settings
// Loaded from ~/.config/plantnet/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SQLite database file. None = `plantnet.db` in the data dir.
    #[serde(rename = "store.database")]
    pub database: Option<PathBuf>,

    /// Organization every command is scoped to.
    #[serde(rename = "census.organization")]
    pub organization: Option<String>,

    /// Recorded as the operator of each census.
    #[serde(rename = "census.performedBy")]
    pub performed_by: Option<String>,

    /// Reconciliation policy TOML. None = built-in defaults.
    #[serde(rename = "census.policyFile")]
    pub policy_file: Option<PathBuf>,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("plantnet");
        config_dir.join("settings.json")
    }

    /// Database used when none is configured.
    pub fn default_database_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("plantnet")
            .join("plantnet.db")
    }

    pub fn effective_database(&self) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(Self::default_database_path)
    }

    /// Operator name, falling back to the login user.
    pub fn effective_performed_by(&self) -> String {
        self.performed_by
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Load settings from the user config dir, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`. A missing or unreadable file yields defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                // Strip comments (lines starting with //)
                let cleaned: String = contents
                    .lines()
                    .filter(|line| !line.trim().starts_with("//"))
                    .collect::<Vec<_>>()
                    .join("\n");

                match serde_json::from_str(&cleaned) {
                    Ok(settings) => settings,
                    Err(e) => {
                        log::warn!("error parsing {}: {e}; using default settings", path.display());
                        Self::default()
                    }
                }
            }
            Err(e) => {
                log::warn!("error reading {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Save current settings to the user config dir
    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let write_err = |source| SettingsError::Write { path: path.to_path_buf(), source };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(write_err)
    }
}

//! The small JSON configuration document. Today it holds only the
//! backup folder; an absent file behaves as "nothing configured".

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while saving the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filesystem failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Serialization failure.
    #[error("failed to serialize configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Application configuration persisted as `config.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Folder holding the single-generation database backup.
    #[serde(default)]
    pub backup_folder: Option<PathBuf>,
}

impl AppConfig {
    /// Loads the configuration from `path`. A missing file means an
    /// empty configuration; an unreadable or malformed file is logged
    /// and treated the same way rather than blocking startup.
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Self::default();
            }
            Err(err) => {
                log::warn!("could not read {}: {err}", path.display());
                return Self::default();
            }
        };

        match serde_json::from_str(&text) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("malformed configuration at {}: {err}", path.display());
                Self::default()
            }
        }
    }

    /// Persists the configuration to `path` as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// The configured backup folder, if any.
    pub fn backup_folder(&self) -> Option<&Path> {
        self.backup_folder.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_empty_configuration() {
        let config = AppConfig::load(Path::new("definitely/not/here/config.json"));
        assert_eq!(config, AppConfig::default());
        assert!(config.backup_folder().is_none());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("config.json");

        let config = AppConfig {
            backup_folder: Some(PathBuf::from("/tmp/respaldos")),
        };
        config.save(&path).expect("save configuration");

        let loaded = AppConfig::load(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn malformed_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").expect("write file");

        let config = AppConfig::load(&path);
        assert_eq!(config, AppConfig::default());
    }
}

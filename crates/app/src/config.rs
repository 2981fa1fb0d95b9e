use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use common::prelude::KdfParams;
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "tableshare";
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default log level, overridden by `--log-level` and `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Work factor for new passphrase wraps
    #[serde(default)]
    pub kdf: KdfParams,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            kdf: KdfParams::default(),
        }
    }
}

impl AppConfig {
    /// Get the config directory path (~/.tableshare)
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Load the config file
    ///
    /// An explicit path must exist. Without one, `~/.tableshare/config.toml`
    /// is read if present and defaults are used otherwise.
    pub fn load(custom_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match custom_path {
            Some(path) => path.to_path_buf(),
            None => {
                let path = Self::config_dir()?.join(CONFIG_FILE_NAME);
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let config_toml = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config: AppConfig = toml::from_str(&config_toml)?;
        config.level()?;
        Ok(config)
    }

    pub fn level(&self) -> Result<tracing::Level, ConfigError> {
        tracing::Level::from_str(&self.log_level)
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_full_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level = \"debug\"\n\n[kdf]\niterations = 310000").unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.level().unwrap(), tracing::Level::DEBUG);
        assert_eq!(config.kdf, KdfParams::new(310_000));
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[kdf]").unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level = \"chatty\"").unwrap();

        let err = AppConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogLevel(_)));
    }

    #[test]
    fn test_roundtrip_toml() {
        let config = AppConfig {
            log_level: "info".to_string(),
            kdf: KdfParams::LEGACY,
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(toml::from_str::<AppConfig>(&text).unwrap(), config);
    }
}

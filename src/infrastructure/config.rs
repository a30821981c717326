use crate::constants::DEFAULT_BUSY_TIMEOUT_MS;
use crate::domain::CardState;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// TOML configuration for the card store
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cards: CardDefaults,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct DatabaseConfig {
    /// Empty means the platform data directory
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct CardDefaults {
    #[serde(default)]
    pub default_state: CardState,
}

// Default value functions
fn default_path() -> String { String::new() }
fn default_busy_timeout_ms() -> u64 { DEFAULT_BUSY_TIMEOUT_MS }

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl DatabaseConfig {
    pub fn path(&self) -> Option<PathBuf> {
        if self.path.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.path))
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse TOML config")?;

        Ok(config)
    }

    /// Load the file if one is given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Create default configuration file at path; an existing file is kept
    pub fn create_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            anyhow::bail!("Config file already exists: {}", path.display());
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let config = Self::default();
        config.save(path)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn given_no_file_when_creating_default_then_creates_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("boardcards.toml");

        let config = Config::create_default(&config_path).unwrap();

        assert_eq!(config.database.path(), None);
        assert_eq!(config.database.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
        assert_eq!(config.cards.default_state, CardState::Todo);
        assert!(config_path.exists());
    }

    #[test]
    fn given_existing_file_when_creating_default_then_fails_and_keeps_content() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("boardcards.toml");
        fs::write(&config_path, "[database]\nbusy_timeout_ms = 10\n").unwrap();

        let result = Config::create_default(&config_path);

        assert!(result.is_err());
        assert_eq!(Config::load(&config_path).unwrap().database.busy_timeout_ms, 10);
    }

    #[test]
    fn given_partial_toml_when_loading_then_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("boardcards.toml");
        fs::write(
            &config_path,
            "[database]\npath = \"/tmp/cards.db\"\n\n[cards]\ndefault_state = \"in-progress\"\n",
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();

        assert_eq!(config.database.path(), Some(PathBuf::from("/tmp/cards.db")));
        assert_eq!(config.database.busy_timeout(), Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS));
        assert_eq!(config.cards.default_state, CardState::InProgress);
    }

    #[test]
    fn given_config_when_saving_and_loading_then_values_survive() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("boardcards.toml");
        let mut config = Config::default();
        config.database.busy_timeout_ms = 250;

        config.save(&config_path).unwrap();
        let loaded = Config::load(&config_path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn given_invalid_toml_when_loading_then_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "[database\npath = ").unwrap();

        let result = Config::load(&config_path);

        assert!(result.is_err());
    }

    #[test]
    fn given_no_path_when_loading_or_default_then_returns_defaults() {
        let config = Config::load_or_default(None).unwrap();

        assert_eq!(config, Config::default());
    }
}

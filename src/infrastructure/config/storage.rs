//! TOML configuration file persistence.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::app_config::AppConfig;

/// Configuration loading and saving errors.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ConfigError {
    #[error("failed to determine config directory")]
    ConfigDirNotFound,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("toml deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
    #[error("invalid base URL {url:?}: {message}")]
    InvalidBaseUrl { url: String, message: String },
}

/// Reads and writes one `config.toml`.
#[derive(Debug, Clone)]
pub struct StorageManager {
    path: PathBuf,
}

impl StorageManager {
    /// Uses the platform config location.
    ///
    /// # Errors
    /// Returns `ConfigDirNotFound` when no home directory can be determined.
    pub fn new() -> Result<Self, ConfigError> {
        AppConfig::default_config_path()
            .map(Self::at)
            .ok_or(ConfigError::ConfigDirNotFound)
    }

    /// Uses an explicit file.
    #[must_use]
    pub const fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Uses `--config` when given, the platform location otherwise.
    ///
    /// # Errors
    /// Returns `ConfigDirNotFound` when neither is available.
    pub fn for_override(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Ok(Self::at(path.to_path_buf())),
            None => Self::new(),
        }
    }

    /// Configuration file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the configuration.
    ///
    /// A missing file is created with defaults. A file that fails to parse is
    /// left untouched and defaults are used for this run.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or the default written.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = if self.path.exists() {
            let content = fs::read_to_string(&self.path)?;
            toml::from_str::<AppConfig>(&content).unwrap_or_else(|e| {
                warn!(path = %self.path.display(), error = %e, "Malformed config file, using defaults");
                AppConfig::default()
            })
        } else {
            info!(path = %self.path.display(), "Writing default configuration");
            let config = AppConfig::default();
            self.save(&config)?;
            config
        };

        config.config = Some(self.path.clone());
        Ok(config)
    }

    /// Saves the configuration atomically.
    ///
    /// # Errors
    /// Returns error if serialization or the write fails.
    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(config)?;
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut staged = tempfile::NamedTempFile::new_in(dir)?;
        staged.write_all(content.as_bytes())?;
        staged.persist(&self.path).map_err(|e| e.error)?;

        debug!(path = %self.path.display(), "Saved configuration");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let storage = StorageManager::at(path.clone());

        let config = storage.load().unwrap();

        assert!(path.exists());
        assert_eq!(config.config.as_deref(), Some(path.as_path()));
        let written: AppConfig = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.images.disk_cache_mb, config.images.disk_cache_mb);
    }

    #[test]
    fn test_malformed_file_is_kept() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "log_level = [").unwrap();

        let config = StorageManager::at(path.clone()).load().unwrap();

        assert_eq!(config.search.page_size, 20);
        assert_eq!(fs::read_to_string(&path).unwrap(), "log_level = [");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let storage = StorageManager::at(dir.path().join("config.toml"));

        let mut config = AppConfig::default();
        config.images.disk_cache_mb = 75;
        config.api.base_url = "https://testbooru.donmai.us".to_string();
        storage.save(&config).unwrap();

        let loaded = storage.load().unwrap();
        assert_eq!(loaded.images.disk_cache_mb, 75);
        assert_eq!(loaded.api.base_url, "https://testbooru.donmai.us");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_override_path_wins() {
        let storage = StorageManager::for_override(Some(Path::new("/tmp/custom.toml"))).unwrap();
        assert_eq!(storage.path(), Path::new("/tmp/custom.toml"));
    }
}

//! Application configuration.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::args::CliArgs;
use super::storage::ConfigError;
use crate::infrastructure::api::{DEFAULT_CONTENT_HOST, TransportConfig};
use crate::infrastructure::image::ImageFetcherConfig;

const APP_NAME: &str = "booru-view";
const APP_QUALIFIER: &str = "com";
const APP_ORGANIZATION: &str = "booru-view";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Converts to tracing level.
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path. Logs go to stderr when unset.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Content API settings.
    #[serde(default)]
    pub api: ApiSettings,

    /// Image pipeline settings.
    #[serde(default)]
    pub images: ImageSettings,

    /// Search settings.
    #[serde(default)]
    pub search: SearchSettings,
}

/// Content API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL of the content host.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Total time budget per resource in seconds, including connectivity
    /// waits.
    #[serde(default = "default_resource_timeout")]
    pub resource_timeout_secs: u64,

    /// Maximum concurrent API connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Keep retrying while the host is unreachable.
    #[serde(default = "default_true")]
    pub wait_for_connectivity: bool,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            resource_timeout_secs: default_resource_timeout(),
            max_connections: default_max_connections(),
            wait_for_connectivity: true,
        }
    }
}

/// Image pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSettings {
    /// Disk cache limit in megabytes.
    #[serde(default = "default_disk_cache_mb")]
    pub disk_cache_mb: u64,

    /// Maximum decoded images held in memory.
    #[serde(default = "default_memory_cache_entries")]
    pub memory_cache_entries: usize,

    /// Maximum concurrent image downloads.
    #[serde(default = "default_max_connections")]
    pub max_concurrent_downloads: usize,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            disk_cache_mb: default_disk_cache_mb(),
            memory_cache_entries: default_memory_cache_entries(),
            max_concurrent_downloads: default_max_connections(),
        }
    }
}

/// Search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Posts per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_CONTENT_HOST.to_string()
}

const fn default_request_timeout() -> u64 {
    20
}

const fn default_resource_timeout() -> u64 {
    60
}

const fn default_max_connections() -> usize {
    4
}

const fn default_disk_cache_mb() -> u64 {
    200
}

const fn default_memory_cache_entries() -> usize {
    64
}

const fn default_page_size() -> u32 {
    20
}

const fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(base_url) = &args.base_url {
            self.api.base_url.clone_from(base_url);
        }
        if let Some(wait) = args.wait_for_connectivity {
            self.api.wait_for_connectivity = wait;
        }
        if let Some(page_size) = args.page_size {
            self.search.page_size = page_size;
        }
    }

    /// Parses the configured base URL.
    ///
    /// # Errors
    /// Returns error if the URL is malformed.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.api.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.api.base_url.clone(),
            message: e.to_string(),
        })
    }

    /// Transport settings for API requests.
    #[must_use]
    pub fn api_transport(&self) -> TransportConfig {
        TransportConfig {
            referer: referer_for(&self.api.base_url),
            request_timeout: Duration::from_secs(self.api.request_timeout_secs),
            resource_timeout: Duration::from_secs(self.api.resource_timeout_secs),
            max_connections: self.api.max_connections,
            wait_for_connectivity: self.api.wait_for_connectivity,
            ..TransportConfig::default()
        }
    }

    /// Transport settings for image downloads.
    #[must_use]
    pub fn image_transport(&self) -> TransportConfig {
        TransportConfig {
            max_connections: self.images.max_concurrent_downloads,
            ..self.api_transport()
        }
    }

    /// Image fetcher settings.
    #[must_use]
    pub fn fetcher(&self) -> ImageFetcherConfig {
        ImageFetcherConfig {
            max_concurrent_downloads: self.images.max_concurrent_downloads,
            ..ImageFetcherConfig::default()
        }
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default config file path.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.data_dir().join("booru-view.log"))
    }

    /// Returns the image disk cache directory.
    #[must_use]
    pub fn image_cache_dir() -> PathBuf {
        project_dirs().map_or_else(
            || std::env::temp_dir().join(APP_NAME).join("images"),
            |dirs| dirs.cache_dir().join("images"),
        )
    }

    /// Returns the search history file path.
    #[must_use]
    pub fn search_history_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.data_dir().join("search_history.json"))
    }

    /// Returns effective config path.
    #[must_use]
    pub fn effective_config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(Self::default_config_path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            log_level: LogLevel::Info,
            api: ApiSettings::default(),
            images: ImageSettings::default(),
            search: SearchSettings::default(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
}

fn referer_for(base_url: &str) -> String {
    if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{base_url}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_partial_config() {
        let toml_content = r#"
            log_level = "debug"

            [api]
            base_url = "https://testbooru.donmai.us"
            wait_for_connectivity = false

            [images]
            disk_cache_mb = 50
        "#;

        let config: AppConfig = toml::from_str(toml_content).expect("Failed to parse config");

        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.api.base_url, "https://testbooru.donmai.us");
        assert!(!config.api.wait_for_connectivity);
        assert_eq!(config.api.request_timeout_secs, 20);
        assert_eq!(config.images.disk_cache_mb, 50);
        assert_eq!(config.images.memory_cache_entries, 64);
        assert_eq!(config.search.page_size, 20);
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.api.base_url, DEFAULT_CONTENT_HOST);
        assert_eq!(config.api.resource_timeout_secs, 60);
        assert_eq!(config.api.max_connections, 4);
        assert!(config.api.wait_for_connectivity);
        assert_eq!(config.images.max_concurrent_downloads, 4);
        assert!(config.base_url().is_ok());
    }

    #[test]
    fn test_transport_settings() {
        let mut config = AppConfig::default();
        config.api.request_timeout_secs = 5;
        config.images.max_concurrent_downloads = 2;

        let api = config.api_transport();
        assert_eq!(api.request_timeout, Duration::from_secs(5));
        assert_eq!(api.referer, "https://danbooru.donmai.us/");

        let images = config.image_transport();
        assert_eq!(images.max_connections, 2);
        assert_eq!(images.request_timeout, Duration::from_secs(5));
        assert_eq!(config.fetcher().max_attempts, 3);
    }

    #[test]
    fn test_merge_with_args() {
        let args = CliArgs::parse_from([
            "booru-view",
            "--log-level",
            "trace",
            "--base-url",
            "https://safebooru.donmai.us",
            "--page-size",
            "50",
            "history",
        ]);

        let mut config = AppConfig::default();
        config.merge_with_args(&args);

        assert_eq!(config.log_level, LogLevel::Trace);
        assert_eq!(config.api.base_url, "https://safebooru.donmai.us");
        assert_eq!(config.search.page_size, 50);
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = AppConfig::default();
        config.api.base_url = "not a url".to_string();
        assert!(config.base_url().is_err());
    }
}

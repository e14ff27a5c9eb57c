//! Application configuration.

pub mod app_config;
pub mod args;
pub mod storage;

pub use app_config::{AppConfig, ApiSettings, ImageSettings, LogLevel, SearchSettings};
pub use args::{CacheAction, CliArgs, Command};
pub use storage::{ConfigError, StorageManager};

//! Infrastructure layer with external service adapters.

/// Content API client and repositories.
pub mod api;
/// Application configuration.
pub mod config;
/// Search history persistence.
pub mod history_store;
/// Image handling (decoding, caching, fetching).
pub mod image;
/// Fuzzy matching over search history.
pub mod search;
/// Credential storage adapters.
pub mod storage;

pub use api::{
    ApiAccountRepository, ApiConfig, ApiPostRepository, ApiTagRepository, BooruClient,
    ReqwestTransport, UrlResolver,
};
pub use config::{AppConfig, CliArgs, LogLevel, StorageManager};
pub use history_store::JsonHistoryStore;
pub use image::{CacheStats, DiskImageCache, ImageFetcher, MemoryImageCache, RasterDecoder};
pub use search::FuzzySearcher;
pub use storage::{InMemoryCredentialStore, KeyringCredentialStore};

//! Port definitions implemented by infrastructure adapters.

mod account_repository_port;
mod credential_store_port;
mod image_cache_port;
mod post_repository_port;
mod search_history_port;
mod tag_repository_port;

pub use account_repository_port::AccountRepository;
pub use credential_store_port::CredentialStore;
pub use image_cache_port::{ImageCachePort, ImageDecoder, ImageLoaderPort};
pub use post_repository_port::PostRepository;
pub use search_history_port::SearchHistoryStore;
pub use tag_repository_port::TagRepository;

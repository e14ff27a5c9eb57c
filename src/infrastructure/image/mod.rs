//! Image handling infrastructure.
//!
//! This module provides:
//! - Memory caching with LRU eviction
//! - Disk caching for persistence
//! - Raster decoding
//! - Throttled, retrying image fetcher

pub mod decoder;
pub mod disk_cache;
pub mod loader;
pub mod memory_cache;
#[cfg(test)]
pub mod test_support;

pub use decoder::RasterDecoder;
pub use disk_cache::DiskImageCache;
pub use loader::{ImageFetcher, ImageFetcherConfig};
pub use memory_cache::{CacheStats, MemoryImageCache};

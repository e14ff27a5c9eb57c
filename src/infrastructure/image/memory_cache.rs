//! In-memory LRU image cache implementation.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use lru::LruCache;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::domain::entities::{DecodedImage, ImageId};
use crate::domain::ports::ImageCachePort;

/// Default maximum number of images to cache in memory.
pub const DEFAULT_CACHE_SIZE: usize = 64;

/// Default bound on total decoded bytes held in memory.
pub const DEFAULT_COST_LIMIT: usize = 256 * 1024 * 1024;

struct Entries {
    lru: LruCache<ImageId, DecodedImage>,
    cost: usize,
}

impl Entries {
    fn pop_lru(&mut self) -> Option<ImageId> {
        let (id, image) = self.lru.pop_lru()?;
        self.cost = self.cost.saturating_sub(image.byte_cost());
        Some(id)
    }
}

/// In-memory LRU cache for decoded images, bounded by entry count and
/// total decoded size.
pub struct MemoryImageCache {
    entries: RwLock<Entries>,
    cost_limit: usize,
    len: AtomicUsize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryImageCache {
    /// Creates a new cache with the specified capacity and the default
    /// cost bound.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_limits(capacity, DEFAULT_COST_LIMIT)
    }

    /// Creates a new cache with explicit entry and byte bounds.
    #[must_use]
    pub fn with_limits(capacity: usize, cost_limit: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: RwLock::new(Entries {
                lru: LruCache::new(cap),
                cost: 0,
            }),
            cost_limit: cost_limit.max(1),
            len: AtomicUsize::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Creates a new cache with the default capacity.
    #[must_use]
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }

    /// Returns cache statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits,
            misses,
            hit_rate,
            size: self.len(),
        }
    }

    /// Total decoded bytes currently held.
    pub async fn cost(&self) -> usize {
        self.entries.read().await.cost
    }

    /// Peeks at an image without promoting it in the LRU.
    pub async fn peek(&self, id: &ImageId) -> Option<DecodedImage> {
        let entries = self.entries.read().await;
        entries.lru.peek(id).cloned()
    }
}

impl Default for MemoryImageCache {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl std::fmt::Debug for MemoryImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryImageCache")
            .field("len", &self.len())
            .field("cost_limit", &self.cost_limit)
            .finish_non_exhaustive()
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached images.
    pub size: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} images, {:.1}% hit rate ({} hits, {} misses)",
            self.size, self.hit_rate, self.hits, self.misses
        )
    }
}

#[async_trait::async_trait]
impl ImageCachePort for MemoryImageCache {
    async fn get(&self, id: &ImageId) -> Option<DecodedImage> {
        let mut entries = self.entries.write().await;
        if let Some(img) = entries.lru.get(id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(id = %id, "Memory cache hit");
            Some(img.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(id = %id, "Memory cache miss");
            None
        }
    }

    async fn put(&self, id: ImageId, image: DecodedImage) {
        let cost = image.byte_cost();
        if cost > self.cost_limit {
            debug!(id = %id, cost, "Image exceeds memory cache budget, not caching");
            return;
        }

        let mut entries = self.entries.write().await;
        if let Some((_, replaced)) = entries.lru.push(id.clone(), image) {
            entries.cost = entries.cost.saturating_sub(replaced.byte_cost());
        }
        entries.cost += cost;

        while entries.cost > self.cost_limit {
            match entries.pop_lru() {
                Some(evicted) => trace!(id = %evicted, "Evicted image over memory budget"),
                None => break,
            }
        }

        self.len.store(entries.lru.len(), Ordering::Relaxed);
        debug!(id = %id, cost, total = entries.cost, "Stored image in memory cache");
    }

    async fn evict(&self, id: &ImageId) {
        let mut entries = self.entries.write().await;
        if let Some(image) = entries.lru.pop(id) {
            entries.cost = entries.cost.saturating_sub(image.byte_cost());
            self.len.store(entries.lru.len(), Ordering::Relaxed);
            debug!(id = %id, "Evicted image from memory cache");
        }
    }

    fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.lru.clear();
        entries.cost = 0;
        self.len.store(0, Ordering::Relaxed);
        debug!("Cleared memory image cache");
    }
}

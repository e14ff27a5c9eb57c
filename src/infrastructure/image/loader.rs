//! Async image loading orchestrator.
//!
//! Implements a three-tier cache: Memory -> Disk -> Network

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use reqwest::Url;
use tokio::sync::Semaphore;
use tracing::{debug, info, trace, warn};

use crate::domain::entities::{DecodedImage, ImageId, ImageSource, LoadedImage};
use crate::domain::errors::{ImageError, ImageResult};
use crate::domain::ports::{ImageCachePort, ImageDecoder, ImageLoaderPort};
use crate::infrastructure::api::{ACCEPT_IMAGE, HttpRequest, HttpTransport};

use super::disk_cache::DiskImageCache;
use super::memory_cache::{CacheStats, MemoryImageCache};

/// Configuration for the image fetcher.
#[derive(Debug, Clone)]
pub struct ImageFetcherConfig {
    /// Maximum concurrent downloads; further requests queue.
    pub max_concurrent_downloads: usize,
    /// Network attempts per load, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each further one.
    pub retry_base_delay: Duration,
}

impl Default for ImageFetcherConfig {
    fn default() -> Self {
        Self {
            max_concurrent_downloads: 4,
            max_attempts: 3,
            retry_base_delay: Duration::from_millis(200),
        }
    }
}

impl ImageFetcherConfig {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.retry_base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

type InFlight = Shared<BoxFuture<'static, ImageResult<LoadedImage>>>;

/// Everything a fetch task needs, cheap to clone into spawned futures.
#[derive(Clone)]
struct FetchContext {
    transport: Arc<dyn HttpTransport>,
    memory_cache: Arc<MemoryImageCache>,
    disk_cache: Arc<DiskImageCache>,
    decoder: Arc<dyn ImageDecoder>,
    permits: Arc<Semaphore>,
    config: ImageFetcherConfig,
}

/// Loads images through memory, disk and network tiers with throttling,
/// retries and in-flight deduplication.
pub struct ImageFetcher {
    ctx: FetchContext,
    in_flight: Arc<Mutex<HashMap<ImageId, InFlight>>>,
}

impl std::fmt::Debug for ImageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFetcher")
            .field("config", &self.ctx.config)
            .field("in_flight", &self.in_flight.lock().len())
            .finish_non_exhaustive()
    }
}

impl ImageFetcher {
    /// Creates a fetcher.
    #[must_use]
    pub fn new(
        config: ImageFetcherConfig,
        transport: Arc<dyn HttpTransport>,
        memory_cache: Arc<MemoryImageCache>,
        disk_cache: Arc<DiskImageCache>,
        decoder: Arc<dyn ImageDecoder>,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent_downloads.max(1)));
        Self {
            ctx: FetchContext {
                transport,
                memory_cache,
                disk_cache,
                decoder,
                permits,
                config,
            },
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Loads an image, checking caches first.
    ///
    /// The disk and network work runs as its own task shared by every
    /// concurrent caller for the same URL. It runs to completion, releasing
    /// its download slot and populating the caches, even when every caller
    /// has gone away.
    ///
    /// # Errors
    /// Returns the last failure once every attempt is exhausted.
    pub async fn load(&self, url: &str) -> ImageResult<LoadedImage> {
        let id = ImageId::from_url(url);

        if let Some(image) = self.ctx.memory_cache.get(&id).await {
            return Ok(LoadedImage {
                id,
                url: url.to_string(),
                image,
                source: ImageSource::MemoryCache,
            });
        }

        let shared = {
            let mut in_flight = self.in_flight.lock();
            if let Some(existing) = in_flight.get(&id) {
                trace!(id = %id, "Joining in-flight image load");
                existing.clone()
            } else {
                let ctx = self.ctx.clone();
                let registry = Arc::clone(&self.in_flight);
                let task_id = id.clone();
                let task_url = url.to_string();
                let task = tokio::spawn(async move {
                    let result = ctx.fetch(&task_id, &task_url).await;
                    registry.lock().remove(&task_id);
                    result
                });

                let registry = Arc::clone(&self.in_flight);
                let task_id = id.clone();
                let fut = async move {
                    task.await.unwrap_or_else(|e| {
                        warn!(id = %task_id, error = %e, "Image fetch task failed");
                        registry.lock().remove(&task_id);
                        Err(ImageError::Cancelled)
                    })
                }
                .boxed()
                .shared();
                in_flight.insert(id.clone(), fut.clone());
                fut
            }
        };

        shared.await
    }

    /// Starts loading each URL in the background, discarding results.
    pub fn prefetch(self: &Arc<Self>, urls: Vec<String>) {
        for url in urls {
            let fetcher = Arc::clone(self);
            tokio::spawn(async move {
                if let Err(e) = fetcher.load(&url).await {
                    debug!(url = %url, error = %e, "Prefetch failed");
                }
            });
        }
    }

    /// Number of loads currently in flight.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// Returns memory cache statistics.
    #[must_use]
    pub fn memory_cache_stats(&self) -> CacheStats {
        self.ctx.memory_cache.stats()
    }

    /// Bytes currently stored in the disk cache.
    pub async fn disk_usage(&self) -> u64 {
        self.ctx.disk_cache.current_usage_bytes().await
    }

    /// Returns the disk cache.
    #[must_use]
    pub fn disk_cache(&self) -> &Arc<DiskImageCache> {
        &self.ctx.disk_cache
    }

    /// Clears all caches.
    pub async fn clear_all(&self) {
        self.ctx.memory_cache.clear().await;
        if let Err(e) = self.ctx.disk_cache.clear().await {
            warn!(error = %e, "Failed to clear disk cache");
        }
        info!("Cleared all image caches");
    }
}

#[async_trait]
impl ImageLoaderPort for ImageFetcher {
    async fn load(&self, url: &str) -> ImageResult<LoadedImage> {
        Self::load(self, url).await
    }
}

impl FetchContext {
    async fn fetch(&self, id: &ImageId, url: &str) -> ImageResult<LoadedImage> {
        if let Some(bytes) = self.disk_cache.get_bytes(id).await {
            match self.decode(bytes).await {
                Ok(image) => {
                    debug!(id = %id, "Decoded image from disk cache");
                    self.memory_cache.put(id.clone(), image.clone()).await;
                    return Ok(LoadedImage {
                        id: id.clone(),
                        url: url.to_string(),
                        image,
                        source: ImageSource::DiskCache,
                    });
                }
                Err(e) => {
                    warn!(id = %id, error = %e, "Failed to decode cached image, refetching");
                    self.disk_cache.evict(id).await;
                }
            }
        }

        let parsed = Url::parse(url).map_err(|e| {
            warn!(url = %url, error = %e, "Refusing to fetch malformed image URL");
            ImageError::CannotLoad
        })?;

        let mut last_error = None;
        for attempt in 1..=self.config.max_attempts {
            match self.download(&parsed).await {
                Ok((bytes, image)) => {
                    if let Err(e) = self.disk_cache.put_bytes(id, &bytes).await {
                        warn!(id = %id, error = %e, "Failed to cache to disk");
                    }
                    self.memory_cache.put(id.clone(), image.clone()).await;
                    debug!(id = %id, attempt, source = "network", "Image loaded successfully");
                    return Ok(LoadedImage {
                        id: id.clone(),
                        url: url.to_string(),
                        image,
                        source: ImageSource::Network,
                    });
                }
                Err(e) => {
                    warn!(id = %id, attempt, error = %e, "Image download attempt failed");
                    last_error = Some(e);
                    if attempt < self.config.max_attempts {
                        tokio::time::sleep(self.config.backoff(attempt)).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or(ImageError::CannotLoad))
    }

    async fn download(&self, url: &Url) -> ImageResult<(bytes::Bytes, DecodedImage)> {
        let response = {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|_| ImageError::Cancelled)?;
            debug!(url = %url, "Downloading image from network");
            self.transport
                .send(HttpRequest::get(url.clone(), ACCEPT_IMAGE))
                .await
                .map_err(|e| ImageError::Network(e.to_string()))?
        };

        if !response.is_success() {
            return Err(ImageError::Status(response.status));
        }

        let image = self.decode(response.body.to_vec()).await?;
        Ok((response.body, image))
    }

    async fn decode(&self, bytes: Vec<u8>) -> ImageResult<DecodedImage> {
        let decoder = Arc::clone(&self.decoder);
        tokio::task::spawn_blocking(move || decoder.decode(&bytes))
            .await
            .map_err(|e| ImageError::Decode(format!("Decode task panicked: {e}")))?
    }
}

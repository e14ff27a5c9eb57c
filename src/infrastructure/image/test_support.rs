//! Shared fixtures for image pipeline tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use crate::domain::entities::DecodedImage;
use crate::domain::errors::ApiError;
use crate::infrastructure::api::{HttpRequest, HttpResponse, HttpTransport};

use super::{DiskImageCache, ImageFetcher, ImageFetcherConfig, MemoryImageCache, RasterDecoder};

/// Encodes a blank PNG of the given size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    DecodedImage::new(image::DynamicImage::new_rgb8(width, height))
        .export_png()
        .unwrap()
}

/// Builds a fetcher over `transport` with a fresh disk cache.
pub async fn fetcher_over(
    transport: Arc<dyn HttpTransport>,
    config: ImageFetcherConfig,
) -> (ImageFetcher, TempDir) {
    let temp = TempDir::new().unwrap();
    let disk = DiskImageCache::open(temp.path().to_path_buf(), 10)
        .await
        .unwrap();
    let fetcher = ImageFetcher::new(
        config,
        transport,
        Arc::new(MemoryImageCache::default()),
        Arc::new(disk),
        Arc::new(RasterDecoder::default()),
    );
    (fetcher, temp)
}

/// Serves fixed bodies per URL after a per-URL delay. Unknown URLs get 404.
///
/// Tracks how many requests are in flight at once.
#[derive(Default)]
pub struct DelayedTransport {
    routes: HashMap<String, (Vec<u8>, Duration)>,
    active: Arc<AtomicUsize>,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl DelayedTransport {
    /// Serves `body` at `url` after `delay`.
    #[must_use]
    pub fn with_image(mut self, url: &str, body: Vec<u8>, delay: Duration) -> Self {
        self.routes.insert(url.to_string(), (body, delay));
        self
    }

    /// Highest number of requests seen in flight together.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Requests received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl HttpTransport for DelayedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = ActiveGuard(Arc::clone(&self.active));
        self.peak.fetch_max(now, Ordering::SeqCst);

        match self.routes.get(request.url.as_str()) {
            Some((body, delay)) => {
                tokio::time::sleep(*delay).await;
                Ok(HttpResponse::new(200, body.clone()))
            }
            None => Ok(HttpResponse::new(404, Vec::new())),
        }
    }
}

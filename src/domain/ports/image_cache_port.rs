//! Port definitions for image caching, decoding and loading.

use async_trait::async_trait;

use crate::domain::entities::{DecodedImage, ImageId, LoadedImage};
use crate::domain::errors::{ImageError, ImageResult};

/// Port for decoded-image caching operations.
/// Implementations must be thread-safe.
#[async_trait]
pub trait ImageCachePort: Send + Sync {
    /// Attempts to get an image from the cache.
    /// Returns None if not cached.
    async fn get(&self, id: &ImageId) -> Option<DecodedImage>;

    /// Stores an image in the cache.
    async fn put(&self, id: ImageId, image: DecodedImage);

    /// Removes an image from the cache.
    async fn evict(&self, id: &ImageId);

    /// Returns the current number of cached images.
    fn len(&self) -> usize;

    /// Returns true if the cache is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears all images from the cache.
    async fn clear(&self);
}

/// Strategy turning raw bytes into a [`DecodedImage`].
pub trait ImageDecoder: Send + Sync {
    /// Decodes encoded image bytes.
    ///
    /// # Errors
    /// Returns [`ImageError::Decode`] if the bytes are not a supported image.
    fn decode(&self, bytes: &[u8]) -> ImageResult<DecodedImage>;
}

/// Port for loading images from various sources.
#[async_trait]
pub trait ImageLoaderPort: Send + Sync {
    /// Loads an image, checking caches first then network.
    async fn load(&self, url: &str) -> ImageResult<LoadedImage>;

    /// Tries each candidate in order and returns the first success.
    async fn load_first(&self, candidates: &[String]) -> ImageResult<LoadedImage> {
        let mut last_error = None;
        for url in candidates {
            match self.load(url).await {
                Ok(loaded) => return Ok(loaded),
                Err(e) => last_error = Some(e),
            }
        }
        Err(last_error.unwrap_or(ImageError::CannotLoad))
    }
}

//! Domain types for image handling.

use std::io::Cursor;
use std::sync::Arc;

/// Unique identifier for a cached image.
/// Generated from a hash of the resolved URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageId(pub String);

impl ImageId {
    /// Creates a new `ImageId` from any string-like input.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates an `ImageId` from a URL by hashing it.
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        let result = hasher.finalize();
        Self(hex::encode(&result[..16]))
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ImageId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A decoded bitmap, independent of how it was decoded.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    bitmap: Arc<image::DynamicImage>,
    scale: f32,
}

impl DecodedImage {
    /// Wraps a decoded bitmap at scale 1.
    #[must_use]
    pub fn new(bitmap: image::DynamicImage) -> Self {
        Self::with_scale(bitmap, 1.0)
    }

    /// Wraps a decoded bitmap with a display scale factor.
    #[must_use]
    pub fn with_scale(bitmap: image::DynamicImage, scale: f32) -> Self {
        Self {
            bitmap: Arc::new(bitmap),
            scale: if scale.is_finite() && scale > 0.0 {
                scale
            } else {
                1.0
            },
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    /// Display scale factor.
    #[must_use]
    pub const fn scale(&self) -> f32 {
        self.scale
    }

    /// Scale-adjusted pixel count, used to compare fidelity.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pixel_count(&self) -> f64 {
        let scale = f64::from(self.scale);
        f64::from(self.width()) * scale * f64::from(self.height()) * scale
    }

    /// Approximate decoded size in bytes.
    #[must_use]
    pub fn byte_cost(&self) -> usize {
        self.bitmap.as_bytes().len()
    }

    /// Returns the underlying bitmap.
    #[must_use]
    pub fn bitmap(&self) -> &image::DynamicImage {
        &self.bitmap
    }

    /// Encodes the bitmap as PNG.
    ///
    /// # Errors
    /// Returns error if encoding fails.
    pub fn export_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut out = Cursor::new(Vec::new());
        self.bitmap.write_to(&mut out, image::ImageFormat::Png)?;
        Ok(out.into_inner())
    }

    /// Returns true if both wrap the same bitmap allocation.
    #[must_use]
    pub fn same_bitmap(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.bitmap, &other.bitmap)
    }
}

/// Where an image was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Loaded from in-memory LRU cache.
    MemoryCache,
    /// Loaded from disk cache.
    DiskCache,
    /// Downloaded from network.
    Network,
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MemoryCache => write!(f, "memory"),
            Self::DiskCache => write!(f, "disk"),
            Self::Network => write!(f, "network"),
        }
    }
}

/// A loaded image together with its cache key and origin.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Cache key.
    pub id: ImageId,
    /// URL the image was loaded for.
    pub url: String,
    /// The decoded image.
    pub image: DecodedImage,
    /// Where it came from.
    pub source: ImageSource,
}

/// Status of a display slot in the loading pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageStatus {
    /// Nothing bound yet.
    #[default]
    NotStarted,
    /// Candidates are being fetched and nothing is shown yet.
    Loading,
    /// An image is displayed; higher-fidelity candidates may still arrive.
    Ready,
    /// Every candidate failed; the slot can be retried.
    Failed(String),
}

impl ImageStatus {
    /// Returns true if an image is displayed.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Returns true if the slot is waiting on its first image.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns true if loading failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

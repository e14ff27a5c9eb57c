//! Image pipeline error types.

/// Result type for image pipeline operations.
pub type ImageResult<T> = std::result::Result<T, ImageError>;

/// Errors that can occur while fetching, decoding or caching images.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    /// Transport failure during download.
    #[error("Network error: {0}")]
    Network(String),
    /// Non-success HTTP status.
    #[error("HTTP {0}")]
    Status(u16),
    /// Failed to decode image.
    #[error("Decode error: {0}")]
    Decode(String),
    /// I/O error during cache operation.
    #[error("IO error: {0}")]
    Io(String),
    /// Every attempt failed without a more specific cause.
    #[error("cannot load image")]
    CannotLoad,
    /// The load was superseded or cancelled.
    #[error("image load cancelled")]
    Cancelled,
}

//! Domain error types.

mod api_error;
mod auth_error;
mod image_error;
mod secret_error;

pub use api_error::{ApiError, ErrorCategory, TransportErrorKind};
pub use auth_error::AuthError;
pub use image_error::{ImageError, ImageResult};
pub use secret_error::SecretError;

//! Raster image decoding backed by the `image` crate.

use crate::domain::entities::DecodedImage;
use crate::domain::errors::{ImageError, ImageResult};
use crate::domain::ports::ImageDecoder;

/// Decodes PNG, JPEG, WebP and GIF bytes (first frame for animations).
#[derive(Debug, Clone, Copy)]
pub struct RasterDecoder {
    scale: f32,
}

impl RasterDecoder {
    /// Creates a decoder tagging results with the given display scale.
    #[must_use]
    pub const fn with_scale(scale: f32) -> Self {
        Self { scale }
    }
}

impl Default for RasterDecoder {
    fn default() -> Self {
        Self::with_scale(1.0)
    }
}

impl ImageDecoder for RasterDecoder {
    fn decode(&self, bytes: &[u8]) -> ImageResult<DecodedImage> {
        if bytes.is_empty() {
            return Err(ImageError::Decode("empty body".to_string()));
        }
        let bitmap = image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))?;
        Ok(DecodedImage::with_scale(bitmap, self.scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_png() {
        let png = DecodedImage::new(image::DynamicImage::new_rgba8(4, 3))
            .export_png()
            .unwrap();

        let decoded = RasterDecoder::with_scale(2.0).decode(&png).unwrap();
        assert_eq!(decoded.width(), 4);
        assert_eq!(decoded.height(), 3);
        assert!((decoded.pixel_count() - 48.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_garbage() {
        let result = RasterDecoder::default().decode(b"<html>not an image</html>");
        assert!(matches!(result, Err(ImageError::Decode(_))));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            RasterDecoder::default().decode(&[]),
            Err(ImageError::Decode(_))
        ));
    }
}

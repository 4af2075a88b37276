//! Image payload decoding.
//!
//! Payloads are decoded with the `image` crate. A [`DecodedImage`] keeps the
//! raw payload (for the persistent cache) next to the decoded pixels, so a
//! payload that only carries a valid header is rejected here rather than at
//! display time.

use std::sync::Arc;

use image::{DynamicImage, GenericImageView};
pub use image::ImageFormat;

use crate::error::DecodeError;

/// A decoded image: format, natural dimensions, pixels and the raw payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pixels: Arc<DynamicImage>,
    data: Arc<[u8]>,
}

impl DecodedImage {
    /// Decode a payload, detecting its format from the leading bytes.
    pub fn decode(data: Vec<u8>) -> Result<Self, DecodeError> {
        let format = image::guess_format(&data).map_err(|_| DecodeError::UnknownFormat)?;
        let pixels = image::load_from_memory_with_format(&data, format)?;
        let (width, height) = pixels.dimensions();

        Ok(Self {
            format,
            width,
            height,
            pixels: Arc::new(pixels),
            data: data.into(),
        })
    }

    /// Raw payload bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    /// Bytes held in memory for this image, used as the cache weight.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.data.len() + self.pixels.as_bytes().len()
    }
}

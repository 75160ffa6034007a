//! Image carriers: flat channel buffers backed by the `image` crate.
//!
//! Decoding and encoding of files is left to `image`. The carrier holds every
//! channel of every pixel as one byte, row-major, so the engine sees a plain
//! `[u8]`. Images with alpha keep it as a fourth channel; everything else is
//! converted to 8-bit RGB. Only lossless formats (PNG, BMP) survive a save.

use std::io::Cursor;
use std::path::Path;

use image::{ColorType, DynamicImage, ImageBuffer, ImageFormat, Rgb, Rgba};
use thiserror::Error;

use crate::stego::frame::frame_bit_len;

/// Errors that can occur while loading or saving a carrier image.
#[derive(Error, Debug)]
pub enum ImageCarrierError {
    #[error("Image load error: {0}")]
    ImageLoadError(String),

    #[error("Image save error: {0}")]
    ImageSaveError(String),
}

/// A decoded image as a flat, mutable channel buffer.
#[derive(Debug, Clone)]
pub struct ImageCarrier {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    has_alpha: bool,
}

impl ImageCarrier {
    /// Loads a carrier from an image file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ImageCarrierError> {
        let image =
            image::open(path).map_err(|e| ImageCarrierError::ImageLoadError(e.to_string()))?;
        Ok(Self::from_image(image))
    }

    /// Loads a carrier from encoded image bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImageCarrierError> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| ImageCarrierError::ImageLoadError(e.to_string()))?;
        Ok(Self::from_image(image))
    }

    pub fn from_image(image: DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        if image.color().has_alpha() {
            Self {
                pixels: image.into_rgba8().into_raw(),
                width,
                height,
                has_alpha: true,
            }
        } else {
            Self {
                pixels: image.into_rgb8().into_raw(),
                width,
                height,
                has_alpha: false,
            }
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of embeddable bits (one per channel byte).
    pub fn capacity_bits(&self) -> usize {
        self.pixels.len()
    }

    /// Largest message, in bytes, whose frame still fits.
    pub fn max_message_len(&self) -> Option<usize> {
        let overhead = frame_bit_len(0);
        if self.capacity_bits() < overhead {
            return None;
        }
        Some((self.capacity_bits() - overhead) / 8)
    }

    /// Rebuilds the image from the current buffer.
    pub fn to_image(&self) -> Result<DynamicImage, ImageCarrierError> {
        let raw = self.pixels.clone();
        let image = if self.has_alpha {
            ImageBuffer::<Rgba<u8>, _>::from_raw(self.width, self.height, raw)
                .map(DynamicImage::ImageRgba8)
        } else {
            ImageBuffer::<Rgb<u8>, _>::from_raw(self.width, self.height, raw)
                .map(DynamicImage::ImageRgb8)
        };
        image.ok_or_else(|| {
            ImageCarrierError::ImageSaveError("pixel buffer does not match dimensions".to_string())
        })
    }

    /// Saves the carrier. The format follows the file extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ImageCarrierError> {
        let color = if self.has_alpha {
            ColorType::Rgba8
        } else {
            ColorType::Rgb8
        };
        image::save_buffer(path, &self.pixels, self.width, self.height, color)
            .map_err(|e| ImageCarrierError::ImageSaveError(e.to_string()))
    }

    /// Returns the carrier encoded as PNG.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, ImageCarrierError> {
        let mut bytes = Vec::new();
        self.to_image()?
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| ImageCarrierError::ImageSaveError(e.to_string()))?;
        Ok(bytes)
    }
}

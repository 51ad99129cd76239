// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: decode standalone images, turn them in quarter turns, and
// produce downscaled previews. Operates on in-memory images using the `image`
// crate.

use std::sync::Arc;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use pagewerk_core::error::PagewerkError;
use pagewerk_core::{Preview, Rotation};
use tracing::{debug, instrument};

/// Image pipeline operating on a single in-memory image.
///
/// Transformations consume `self` and return a new `ImageProcessor`, enabling
/// method chaining:
///
/// ```ignore
/// let preview = ImageProcessor::from_bytes(&bytes)?
///     .rotate(Rotation::from_degrees(90)?)
///     .preview(0.25)?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, PagewerkError> {
        let img = image::load_from_memory(data).map_err(|err| {
            PagewerkError::ImageError(format!("failed to decode image: {}", err))
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Turn the image clockwise. Quarter turns are lossless.
    pub fn rotate(self, rotation: Rotation) -> Self {
        let image = match rotation.degrees() {
            90 => self.image.rotate90(),
            180 => self.image.rotate180(),
            270 => self.image.rotate270(),
            _ => self.image,
        };
        Self { image }
    }

    // -- Output ---------------------------------------------------------------

    /// Downscale by `scale` (never below one pixel per side) and encode as a
    /// PNG preview.
    #[instrument(skip(self))]
    pub fn preview(&self, scale: f32) -> Result<Preview, PagewerkError> {
        let width = scaled(self.image.width(), scale);
        let height = scaled(self.image.height(), scale);

        let thumbnail = if (width, height) == (self.image.width(), self.image.height()) {
            self.image.clone()
        } else {
            self.image.resize_exact(width, height, FilterType::Triangle)
        };

        let png = encode_to_format(&thumbnail, ImageFormat::Png)?;
        debug!(width, height, png_bytes = png.len(), "Preview encoded");

        Ok(Preview {
            width,
            height,
            png: Arc::from(png),
        })
    }

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, PagewerkError> {
        encode_to_format(&self.image, ImageFormat::Png)
    }
}

fn scaled(length: u32, scale: f32) -> u32 {
    ((length as f32 * scale).round() as u32).max(1)
}

/// Encode a `DynamicImage` into the specified format, returning the raw bytes.
fn encode_to_format(
    image: &DynamicImage,
    format: ImageFormat,
) -> Result<Vec<u8>, PagewerkError> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image.write_to(&mut cursor, format).map_err(|err| {
        PagewerkError::ImageError(format!("image encoding failed: {}", err))
    })?;
    Ok(buffer)
}

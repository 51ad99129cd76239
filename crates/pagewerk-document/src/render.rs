// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page preview rendering.
//
// Previews are display-only; export never reads them. With the `pdfium`
// feature, pages are rasterised by pdfium. Without it, or when the pdfium
// library cannot be loaded at runtime, pages are drawn as outlines of the
// right proportions.

#[cfg(feature = "pdfium")]
mod pdfium;

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use pagewerk_core::error::PagewerkError;
use tracing::debug;

use crate::pdf::reader::PdfReader;

#[cfg(feature = "pdfium")]
pub use self::pdfium::PdfiumRenderer;

/// Largest preview edge in pixels, whatever the scale.
const MAX_PREVIEW_EDGE: f32 = 4096.0;

/// Produces the raster preview of one document page.
///
/// One renderer is shared by a whole import pass; implementations must not
/// assume they are called for pages of a single document.
pub trait PageRenderer {
    /// Render page `index` (zero-based) of `reader` at `scale` pixels per
    /// PDF point.
    fn render_page(&self, reader: &PdfReader, index: u32, scale: f32) -> Result<DynamicImage, PagewerkError>;
}

/// Draws a blank sheet with the page's true display proportions (intrinsic
/// /Rotate applied), a border, and a faint text block.
#[derive(Debug, Clone)]
pub struct OutlineRenderer {
    pub paper: Rgba<u8>,
    pub border: Rgba<u8>,
    pub body: Rgba<u8>,
}

impl Default for OutlineRenderer {
    fn default() -> Self {
        Self {
            paper: Rgba([255, 255, 255, 255]),
            border: Rgba([160, 160, 160, 255]),
            body: Rgba([232, 232, 232, 255]),
        }
    }
}

impl PageRenderer for OutlineRenderer {
    fn render_page(&self, reader: &PdfReader, index: u32, scale: f32) -> Result<DynamicImage, PagewerkError> {
        let geometry = reader.page_geometry(index)?;
        let (width_pt, height_pt) = geometry.display_size();

        let width = pixels(width_pt, scale);
        let height = pixels(height_pt, scale);

        let mut canvas = RgbaImage::from_pixel(width, height, self.paper);

        // Text block inset by roughly a one-inch margin.
        let margin_x = (width / 8).max(1);
        let margin_y = (height / 10).max(1);
        if width > 2 * margin_x && height > 2 * margin_y {
            let body = Rect::at(margin_x as i32, margin_y as i32)
                .of_size(width - 2 * margin_x, height - 2 * margin_y);
            draw_filled_rect_mut(&mut canvas, body, self.body);
        }
        draw_hollow_rect_mut(&mut canvas, Rect::at(0, 0).of_size(width, height), self.border);

        debug!(page = index + 1, width, height, "Page outline rendered");
        Ok(DynamicImage::ImageRgba8(canvas))
    }
}

/// The renderer an import pass should use: pdfium when it can be bound,
/// page outlines otherwise.
#[cfg(feature = "pdfium")]
pub fn preview_renderer() -> Box<dyn PageRenderer> {
    match PdfiumRenderer::bind() {
        Ok(renderer) => Box::new(renderer),
        Err(err) => {
            tracing::warn!(error = %err, "pdfium unavailable, previews fall back to page outlines");
            Box::new(OutlineRenderer::default())
        }
    }
}

/// The renderer an import pass should use.
#[cfg(not(feature = "pdfium"))]
pub fn preview_renderer() -> Box<dyn PageRenderer> {
    Box::new(OutlineRenderer::default())
}

fn pixels(points: f32, scale: f32) -> u32 {
    (points * scale).round().clamp(1.0, MAX_PREVIEW_EDGE) as u32
}

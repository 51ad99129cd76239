// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page previews rasterised by pdfium, loaded dynamically at runtime.

use image::DynamicImage;
use pagewerk_core::error::PagewerkError;
use pdfium_render::prelude::*;
use tracing::{debug, info};

use super::{PageRenderer, pixels};
use crate::pdf::reader::PdfReader;

/// Renders the real page content, annotations included.
///
/// pdfium reads the reader's original bytes; the page is shown as displayed,
/// with its own /Rotate applied.
pub struct PdfiumRenderer {
    pdfium: Pdfium,
}

impl PdfiumRenderer {
    /// Bind to a pdfium library in the working directory, or failing that to
    /// the system one.
    pub fn bind() -> Result<Self, PagewerkError> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|err| PagewerkError::PdfError(format!("cannot load pdfium: {err}")))?;
        info!("pdfium bound for page previews");
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl PageRenderer for PdfiumRenderer {
    fn render_page(&self, reader: &PdfReader, index: u32, scale: f32) -> Result<DynamicImage, PagewerkError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(reader.bytes(), None)
            .map_err(render_error)?;
        let page_index = index
            .try_into()
            .map_err(|_| PagewerkError::PdfError(format!("page {} is beyond pdfium's page range", index + 1)))?;
        let page = document.pages().get(page_index).map_err(render_error)?;

        let width = pixels(page.width().value, scale);
        let height = pixels(page.height().value, scale);
        let bitmap = page
            .render_with_config(
                &PdfRenderConfig::new()
                    .set_target_width(width as i32)
                    .set_target_height(height as i32)
                    .render_annotations(true),
            )
            .map_err(render_error)?;

        debug!(page = index + 1, width, height, "Page rasterised");
        Ok(bitmap.as_image())
    }
}

fn render_error(err: PdfiumError) -> PagewerkError {
    PagewerkError::PdfError(format!("pdfium: {err}"))
}

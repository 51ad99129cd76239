// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagewerk-document: Document handling for the Pagewerk assembly engine.
//
// Provides PDF page copying and assembly (lopdf), image-to-page conversion
// (printpdf), image decoding and previews (image), page preview rendering
// (pdfium-render, or imageproc outlines), and the per-asset source decoder
// that ties them together.

pub mod decode;
pub mod image;
pub mod pdf;
pub mod render;

// Re-export the primary structs so callers can use `pagewerk_document::PdfReader` etc.
pub use decode::{DecodedContent, DecodedPage, DecodedSource, SourceDecoder};
pub use self::image::processor::ImageProcessor;
pub use pdf::assembler::{DocumentInfo, PdfAssembler};
pub use pdf::reader::{PageCopier, PageGeometry, PdfReader};
pub use pdf::writer::PdfWriter;
pub use render::{OutlineRenderer, PageRenderer, preview_renderer};
#[cfg(feature = "pdfium")]
pub use render::PdfiumRenderer;

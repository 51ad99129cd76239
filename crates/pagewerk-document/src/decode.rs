// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Source decoding: turn one source asset into previewed pages plus a handle
// good enough to re-extract each original page at export time.
//
// Any failure is reported as `PagewerkError::Decode` naming the asset, so the
// caller can record it and move on to the next asset.

use std::sync::Arc;

use pagewerk_core::error::PagewerkError;
use pagewerk_core::{MediaKind, NodeKind, Preview, SourceAsset};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use crate::image::processor::ImageProcessor;
use crate::pdf::reader::PdfReader;
use crate::render::PageRenderer;

/// What export needs to rebuild a node from its source.
pub enum DecodedContent {
    /// A parsed paginated document; pages are copied from it object by object.
    Document(PdfReader),
    /// The original image bytes and their native size in pixels.
    Image {
        bytes: Arc<[u8]>,
        width: u32,
        height: u32,
    },
}

impl DecodedContent {
    pub fn media_kind(&self) -> MediaKind {
        match self {
            Self::Document(_) => MediaKind::PaginatedDocument,
            Self::Image { .. } => MediaKind::Image,
        }
    }
}

/// One page ready to become a node.
#[derive(Debug, Clone)]
pub struct DecodedPage {
    pub kind: NodeKind,
    /// Zero-based index in the source; 0 for images.
    pub original_index: u32,
    pub preview: Preview,
}

/// A fully decoded asset.
pub struct DecodedSource {
    pub name: String,
    /// SHA-256 of the asset bytes, lowercase hex.
    pub fingerprint: String,
    /// Total pages in the source (1 for images), not just the decoded ones.
    pub page_count: u32,
    pub content: DecodedContent,
    /// Decoded pages in ascending page order.
    pub pages: Vec<DecodedPage>,
}

/// SHA-256 of `data` as a lowercase hex string.
pub fn fingerprint(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Parse a paginated asset without rendering anything. Used at staging time
/// to learn the page count before the user picks a range.
pub fn open_document(asset: &SourceAsset) -> Result<PdfReader, PagewerkError> {
    let reader = PdfReader::from_shared(Arc::clone(&asset.bytes)).map_err(|err| decode_error(asset, err))?;
    if reader.page_count() == 0 {
        return Err(PagewerkError::Decode {
            source_name: asset.name.clone(),
            reason: "document has no pages".into(),
        });
    }
    Ok(reader)
}

/// Decodes assets one at a time through a shared renderer.
pub struct SourceDecoder<'r> {
    renderer: &'r dyn PageRenderer,
    preview_scale: f32,
}

impl<'r> SourceDecoder<'r> {
    pub fn new(renderer: &'r dyn PageRenderer, preview_scale: f32) -> Self {
        Self {
            renderer,
            preview_scale,
        }
    }

    /// Decode `asset`. For documents, `pages` lists the 1-based page numbers to
    /// preview (`None` means all); it is ignored for images.
    ///
    /// `on_page` is called after every page with (pages done, pages wanted).
    #[instrument(skip(self, asset, pages, on_page), fields(name = %asset.name))]
    pub fn decode(
        &self,
        asset: &SourceAsset,
        pages: Option<&[u32]>,
        on_page: &mut dyn FnMut(usize, usize),
    ) -> Result<DecodedSource, PagewerkError> {
        match asset.media_kind() {
            MediaKind::PaginatedDocument => {
                let reader = open_document(asset)?;
                self.decode_document(asset, reader, pages, on_page)
            }
            MediaKind::Image => self.decode_image(asset, on_page),
            MediaKind::Unsupported => Err(PagewerkError::UnsupportedDocument(asset.media_type.clone())),
        }
    }

    /// Decode a document that has already been parsed (at staging time).
    pub fn decode_document(
        &self,
        asset: &SourceAsset,
        reader: PdfReader,
        pages: Option<&[u32]>,
        on_page: &mut dyn FnMut(usize, usize),
    ) -> Result<DecodedSource, PagewerkError> {
        let page_count = reader.page_count();
        let wanted: Vec<u32> = match pages {
            Some(numbers) => numbers.to_vec(),
            None => (1..=page_count).collect(),
        };

        let mut decoded = Vec::with_capacity(wanted.len());
        for (done, &number) in wanted.iter().enumerate() {
            if number == 0 || number > page_count {
                warn!(name = %asset.name, number, page_count, "Skipping page outside the document");
                continue;
            }
            let index = number - 1;
            let raster = self
                .renderer
                .render_page(&reader, index, self.preview_scale)
                .map_err(|err| decode_error(asset, err))?;
            let preview = ImageProcessor::from_dynamic(raster)
                .preview(1.0)
                .map_err(|err| decode_error(asset, err))?;

            decoded.push(DecodedPage {
                kind: NodeKind::Page,
                original_index: index,
                preview,
            });
            on_page(done + 1, wanted.len());
        }

        info!(
            name = %asset.name,
            page_count,
            decoded = decoded.len(),
            "Document decoded"
        );

        Ok(DecodedSource {
            name: asset.name.clone(),
            fingerprint: fingerprint(&asset.bytes),
            page_count,
            content: DecodedContent::Document(reader),
            pages: decoded,
        })
    }

    fn decode_image(
        &self,
        asset: &SourceAsset,
        on_page: &mut dyn FnMut(usize, usize),
    ) -> Result<DecodedSource, PagewerkError> {
        let processor = ImageProcessor::from_bytes(&asset.bytes).map_err(|err| decode_error(asset, err))?;
        let (width, height) = (processor.width(), processor.height());
        let preview = processor
            .preview(self.preview_scale)
            .map_err(|err| decode_error(asset, err))?;
        on_page(1, 1);

        debug!(name = %asset.name, width, height, "Image decoded");

        Ok(DecodedSource {
            name: asset.name.clone(),
            fingerprint: fingerprint(&asset.bytes),
            page_count: 1,
            content: DecodedContent::Image {
                bytes: Arc::clone(&asset.bytes),
                width,
                height,
            },
            pages: vec![DecodedPage {
                kind: NodeKind::Image,
                original_index: 0,
                preview,
            }],
        })
    }
}

fn decode_error(asset: &SourceAsset, err: PagewerkError) -> PagewerkError {
    let reason = match err {
        PagewerkError::PdfError(detail) | PagewerkError::ImageError(detail) => detail,
        PagewerkError::Decode { reason, .. } => reason,
        other => other.to_string(),
    };
    PagewerkError::Decode {
        source_name: asset.name.clone(),
        reason,
    }
}

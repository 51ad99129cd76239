// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF assembler: the single composition context an export pass writes into.
// Pages are appended one at a time, each finished before the next begins, and
// the document is only serialised once every page is in.

use std::collections::HashMap;

use chrono::Utc;
use lopdf::{Document, Object, ObjectId, dictionary};
use pagewerk_core::error::PagewerkError;
use pagewerk_core::{Rotation, SourceId};
use tracing::{debug, info, instrument};

use crate::pdf::reader::{PageCopier, PdfReader};
use crate::pdf::writer::PdfWriter;

/// Document-level metadata written into the /Info dictionary.
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub producer: String,
}

/// Accumulates pages from many sources into one new PDF.
pub struct PdfAssembler {
    document: Document,
    /// Reserved id of the page tree root; written in [`PdfAssembler::finish`].
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
    /// One copier per source so shared resources are copied once per source.
    copiers: HashMap<SourceId, PageCopier>,
    image_writer: PdfWriter,
}

impl PdfAssembler {
    pub fn new(pdf_version: &str) -> Self {
        let mut document = Document::with_version(pdf_version);
        let pages_id = document.new_object_id();
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        Self {
            document,
            pages_id,
            kids: Vec::new(),
            copiers: HashMap::new(),
            image_writer: PdfWriter::new(),
        }
    }

    /// Pages appended so far.
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Copy page `index` (zero-based) of a source document, adding `rotation`
    /// to the page's own /Rotate.
    pub fn append_page(
        &mut self,
        source: SourceId,
        reader: &PdfReader,
        index: u32,
        rotation: Rotation,
    ) -> Result<(), PagewerkError> {
        let copier = self.copiers.entry(source).or_default();
        let page_id = copier.copy_page(reader, index, &mut self.document, self.pages_id, rotation)?;
        self.kids.push(page_id);
        Ok(())
    }

    /// Add a page sized to the image with the image filling it, turned by
    /// `rotation`.
    pub fn append_image(&mut self, image_bytes: &[u8], rotation: Rotation) -> Result<(), PagewerkError> {
        let page_pdf = self.image_writer.create_image_page(image_bytes, rotation)?;
        let reader = PdfReader::from_bytes(&page_pdf)?;

        // The generated page is private to this image; its copier is discarded.
        let page_id = PageCopier::new().copy_page(&reader, 0, &mut self.document, self.pages_id, Rotation::NONE)?;
        self.kids.push(page_id);
        Ok(())
    }

    /// Write the page tree and /Info, optionally compress, and serialise.
    #[instrument(skip(self, info))]
    pub fn finish(mut self, info: &DocumentInfo, compress: bool) -> Result<Vec<u8>, PagewerkError> {
        let kids: Vec<Object> = self.kids.iter().map(|id| Object::Reference(*id)).collect();
        self.document.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => self.kids.len() as i64,
            }),
        );

        let mut info_dict = dictionary! {
            "Producer" => Object::string_literal(info.producer.as_str()),
            "CreationDate" => Object::string_literal(Utc::now().format("D:%Y%m%d%H%M%SZ").to_string()),
        };
        if let Some(title) = &info.title {
            info_dict.set("Title", Object::string_literal(title.as_str()));
        }
        let info_id = self.document.add_object(info_dict);
        self.document.trailer.set("Info", info_id);

        if compress {
            self.document.compress();
        }

        let mut output = Vec::new();
        self.document.save_to(&mut output).map_err(|err| {
            PagewerkError::PdfError(format!("failed to serialise assembled PDF: {}", err))
        })?;

        info!(pages = self.kids.len(), output_bytes = output.len(), "Assembled PDF written");
        debug!(sources = self.copiers.len(), "Source copiers released");
        Ok(output)
    }
}

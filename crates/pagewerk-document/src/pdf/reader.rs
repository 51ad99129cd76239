// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader: open existing PDF documents, inspect page geometry, and copy
// individual pages (with everything they reference) into another document
// using the `lopdf` crate.

use std::collections::HashMap;
use std::sync::Arc;

use lopdf::{Dictionary, Document, Object, ObjectId};
use pagewerk_core::Rotation;
use pagewerk_core::error::PagewerkError;
use tracing::{debug, instrument, warn};

/// US Letter, used when a page tree carries no /MediaBox at all.
const FALLBACK_MEDIA_BOX: (f32, f32) = (612.0, 792.0);

/// Guards the /Parent walk against malformed, cyclic page trees.
const MAX_TREE_DEPTH: usize = 64;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Size and intrinsic rotation of one page, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_pt: f32,
    pub height_pt: f32,
    /// The page's own /Rotate, before any rotation the user adds.
    pub rotation: Rotation,
}

impl PageGeometry {
    /// Size as displayed, i.e. with the intrinsic rotation applied.
    pub fn display_size(&self) -> (f32, f32) {
        if self.rotation.swaps_axes() {
            (self.height_pt, self.width_pt)
        } else {
            (self.width_pt, self.height_pt)
        }
    }
}

/// Reads an existing PDF and hands out its pages.
///
/// Wraps `lopdf::Document`. Pages are addressed by zero-based index
/// throughout; the 1-based page numbers lopdf uses stay inside this module.
pub struct PdfReader {
    document: Document,
    /// The bytes the document was parsed from, kept for renderers that parse
    /// on their own.
    bytes: Arc<[u8]>,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Create a reader from raw PDF bytes already in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self, PagewerkError> {
        Self::from_shared(Arc::from(data))
    }

    /// Like [`PdfReader::from_bytes`], sharing the buffer instead of copying it.
    #[instrument(skip_all, fields(bytes_len = bytes.len()))]
    pub fn from_shared(bytes: Arc<[u8]>) -> Result<Self, PagewerkError> {
        let document = Document::load_mem(&bytes).map_err(|err| {
            PagewerkError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self { document, bytes })
    }

    // -- Inspection -----------------------------------------------------------

    /// The encoded document.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    /// Geometry of the page at zero-based `index`.
    pub fn page_geometry(&self, index: u32) -> Result<PageGeometry, PagewerkError> {
        let page_id = self.page_id(index)?;

        let (width_pt, height_pt) = self
            .inherited(page_id, b"CropBox")
            .or_else(|| self.inherited(page_id, b"MediaBox"))
            .and_then(|object| box_size(&self.document, object))
            .unwrap_or(FALLBACK_MEDIA_BOX);

        let rotation = self.intrinsic_rotation(page_id);

        Ok(PageGeometry {
            width_pt,
            height_pt,
            rotation,
        })
    }

    // -- Helpers --------------------------------------------------------------

    /// Object id of the page at zero-based `index`.
    fn page_id(&self, index: u32) -> Result<ObjectId, PagewerkError> {
        let pages = self.document.get_pages();
        // lopdf pages are keyed by 1-indexed page number.
        pages.get(&(index + 1)).copied().ok_or_else(|| {
            PagewerkError::PdfError(format!(
                "page {} out of range (document has {} pages)",
                index + 1,
                pages.len()
            ))
        })
    }

    /// Look up `key` on the page or, failing that, on its page-tree ancestors.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut current = page_id;
        for _ in 0..MAX_TREE_DEPTH {
            let dict = self.document.get_dictionary(current).ok()?;
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            current = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
        }
        None
    }

    fn intrinsic_rotation(&self, page_id: ObjectId) -> Rotation {
        self.inherited(page_id, b"Rotate")
            .map(|object| resolve(&self.document, object))
            .and_then(|object| object.as_i64().ok())
            .and_then(|degrees| Rotation::from_degrees(degrees as i32).ok())
            .unwrap_or(Rotation::NONE)
    }
}

/// Copies pages out of one source document into a target document.
///
/// Keeps a map from source object ids to target object ids so that objects
/// shared between pages of the same source (fonts, images, colour spaces) are
/// copied once, and so that reference cycles terminate. Use one copier per
/// source document and per target.
#[derive(Default)]
pub struct PageCopier {
    copied: HashMap<ObjectId, ObjectId>,
}

impl PageCopier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of source objects copied so far.
    pub fn copied_objects(&self) -> usize {
        self.copied.len()
    }

    /// Copy page `index` of `source` into `target` as a child of `parent`,
    /// adding `extra_rotation` to whatever /Rotate the page already had.
    ///
    /// Inherited attributes are written onto the copy since the copy's new
    /// parent knows nothing about the source page tree. Returns the new page's
    /// object id; the caller is responsible for listing it in `/Kids`.
    #[instrument(skip(self, source, target), fields(rotation = %extra_rotation))]
    pub fn copy_page(
        &mut self,
        source: &PdfReader,
        index: u32,
        target: &mut Document,
        parent: ObjectId,
        extra_rotation: Rotation,
    ) -> Result<ObjectId, PagewerkError> {
        let page_id = source.page_id(index)?;
        let page_dict = source.document.get_dictionary(page_id).map_err(|err| {
            PagewerkError::PdfError(format!("cannot read page object {:?}: {}", page_id, err))
        })?;

        // Annotations belong to exactly one page, so a repeat placement of
        // this page needs its own copies rather than the memoised ones.
        if self.copied.contains_key(&page_id) {
            for annotation in annotation_ids(&source.document, page_dict) {
                self.copied.remove(&annotation);
            }
        }

        // Reserve the id first: annotations point back at their page via /P.
        let new_page_id = target.new_object_id();
        self.copied.insert(page_id, new_page_id);

        let mut new_dict = Dictionary::new();
        for (key, value) in page_dict.iter() {
            if key == b"Parent" || key == b"Rotate" {
                continue;
            }
            let copied = self.copy_object(&source.document, target, value);
            new_dict.set(key.clone(), copied);
        }

        for key in INHERITABLE_KEYS {
            if key == b"Rotate" || new_dict.has(key) {
                continue;
            }
            if let Some(value) = source.inherited(page_id, key) {
                let copied = self.copy_object(&source.document, target, value);
                new_dict.set(key.to_vec(), copied);
            }
        }

        let rotation = source
            .intrinsic_rotation(page_id)
            .rotated_by(i32::from(extra_rotation.degrees()))?;
        if rotation != Rotation::NONE {
            new_dict.set("Rotate", Object::Integer(i64::from(rotation.degrees())));
        }
        new_dict.set("Parent", Object::Reference(parent));

        target.objects.insert(new_page_id, Object::Dictionary(new_dict));

        debug!(
            page = index + 1,
            rotation = rotation.degrees(),
            shared_objects = self.copied.len(),
            "Page copied"
        );
        Ok(new_page_id)
    }

    /// Deep-copy a single object, following references through
    /// [`PageCopier::copy_reference`].
    fn copy_object(&mut self, source: &Document, target: &mut Document, object: &Object) -> Object {
        match object {
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dictionary(source, target, dict)),
            Object::Array(items) => Object::Array(
                items
                    .iter()
                    .map(|item| self.copy_object(source, target, item))
                    .collect(),
            ),
            Object::Reference(ref_id) => self.copy_reference(source, target, *ref_id),
            Object::Stream(stream) => {
                let dict = self.copy_dictionary(source, target, &stream.dict);
                Object::Stream(lopdf::Stream::new(dict, stream.content.clone()))
            }
            // Boolean, Integer, Real, String, Name, Null
            other => other.clone(),
        }
    }

    fn copy_dictionary(&mut self, source: &Document, target: &mut Document, dict: &Dictionary) -> Dictionary {
        let mut new_dict = Dictionary::new();
        for (key, value) in dict.iter() {
            let copied = self.copy_object(source, target, value);
            new_dict.set(key.clone(), copied);
        }
        new_dict
    }

    fn copy_reference(&mut self, source: &Document, target: &mut Document, ref_id: ObjectId) -> Object {
        if let Some(existing) = self.copied.get(&ref_id) {
            return Object::Reference(*existing);
        }

        let referenced = match source.get_object(ref_id) {
            Ok(object) => object,
            Err(err) => {
                warn!(?ref_id, %err, "Cannot resolve reference, using Null");
                return Object::Null;
            }
        };

        // Other pages (link destinations, thumbnails of the tree) are not
        // dragged along; only pages placed explicitly end up in the output.
        if is_page_tree_node(referenced) {
            debug!(?ref_id, "Dropping reference to page outside the assembly");
            return Object::Null;
        }

        let new_id = target.new_object_id();
        self.copied.insert(ref_id, new_id);
        let copied = self.copy_object(source, target, referenced);
        target.objects.insert(new_id, copied);
        Object::Reference(new_id)
    }
}

fn is_page_tree_node(object: &Object) -> bool {
    match object {
        Object::Dictionary(dict) => matches!(
            dict.get(b"Type").and_then(Object::as_name),
            Ok(b"Page") | Ok(b"Pages")
        ),
        _ => false,
    }
}

/// The /Annots array of `page` and every annotation it lists, as object ids.
fn annotation_ids(document: &Document, page: &Dictionary) -> Vec<ObjectId> {
    let Ok(annots) = page.get(b"Annots") else {
        return Vec::new();
    };
    let mut ids: Vec<ObjectId> = annots.as_reference().into_iter().collect();
    if let Object::Array(items) = resolve(document, annots) {
        ids.extend(items.iter().filter_map(|item| item.as_reference().ok()));
    }
    ids
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => document.get_object(*id).unwrap_or(object),
        other => other,
    }
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value as f32),
        _ => None,
    }
}

/// Width and height of a `[llx lly urx ury]` box.
fn box_size(document: &Document, object: &Object) -> Option<(f32, f32)> {
    let Object::Array(corners) = resolve(document, object) else {
        return None;
    };
    if corners.len() != 4 {
        return None;
    }
    let values: Vec<f32> = corners
        .iter()
        .filter_map(|corner| number(resolve(document, corner)))
        .collect();
    if values.len() != 4 {
        return None;
    }
    let width = (values[2] - values[0]).abs();
    let height = (values[3] - values[1]).abs();
    (width > 0.0 && height > 0.0).then_some((width, height))
}

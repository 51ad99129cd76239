// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Import coordination.
//
// An import moves through three owned values:
//
//   PendingImport  --integrate-->  ImportBatch  --Workspace::commit-->  placed
//
// Dropping (or cancelling) either value before commit leaves the workspace
// untouched. Assets are decoded one after another in the order supplied; a
// failing asset is recorded and skipped, the rest of the batch carries on.

use pagewerk_core::error::{PagewerkError, Result};
use pagewerk_core::range;
use pagewerk_core::{AssemblyConfig, InsertionMode, MediaKind, Node, NodeKind, SourceAsset, SourceId};
use pagewerk_document::decode::open_document;
use pagewerk_document::{DecodedSource, PdfReader, SourceDecoder};
use tracing::{debug, info, instrument, warn};

/// An asset left out of the batch because its media type is not supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedAsset {
    pub name: String,
    pub media_type: String,
}

/// An asset that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeFailure {
    pub name: String,
    pub reason: String,
}

impl DecodeFailure {
    fn from_error(name: &str, err: PagewerkError) -> Self {
        let reason = match err {
            PagewerkError::Decode { reason, .. } => reason,
            other => other.to_string(),
        };
        Self {
            name: name.to_string(),
            reason,
        }
    }
}

/// Progress of an integration pass.
#[derive(Debug, Clone, Copy)]
pub struct ImportProgress<'a> {
    /// Zero-based index of the asset being decoded.
    pub asset_index: usize,
    pub asset_count: usize,
    pub asset_name: &'a str,
    /// Pages of this asset decoded so far.
    pub pages_done: usize,
    /// Pages this asset will yield; 0 until known.
    pub pages_total: usize,
}

/// The single paginated document of a one-document batch, parsed at staging.
struct LeadDocument {
    reader: PdfReader,
    page_count: u32,
}

/// A staged batch: classified, limit-checked, nothing decoded yet.
pub struct PendingImport {
    assets: Vec<SourceAsset>,
    skipped: Vec<SkippedAsset>,
    lead: Option<LeadDocument>,
    /// 1-based pages of the lead document; `None` means all.
    pages: Option<Vec<u32>>,
    mode: InsertionMode,
    max_pages: usize,
}

impl PendingImport {
    /// Classify `assets`, enforce the batch limits, and parse the lead
    /// document's structure when the batch is a single paginated document.
    #[instrument(skip_all, fields(offered = assets.len()))]
    pub fn stage(assets: Vec<SourceAsset>, config: &AssemblyConfig) -> Result<Self> {
        let (supported, unsupported): (Vec<SourceAsset>, Vec<SourceAsset>) = assets
            .into_iter()
            .partition(|asset| asset.media_kind() != MediaKind::Unsupported);

        let skipped: Vec<SkippedAsset> = unsupported
            .into_iter()
            .map(|asset| {
                warn!(name = %asset.name, media_type = %asset.media_type, "Skipping unsupported asset");
                SkippedAsset {
                    name: asset.name,
                    media_type: asset.media_type,
                }
            })
            .collect();

        if supported.is_empty() {
            return Err(PagewerkError::NothingToImport);
        }
        if supported.len() > config.max_import_sources {
            return Err(PagewerkError::BatchTooLarge {
                limit: config.max_import_sources,
                requested: supported.len(),
            });
        }

        let lead = match supported.as_slice() {
            [only] if only.media_kind() == MediaKind::PaginatedDocument => match open_document(only) {
                Ok(reader) => {
                    let page_count = reader.page_count();
                    debug!(name = %only.name, page_count, "Lead document parsed");
                    Some(LeadDocument { reader, page_count })
                }
                Err(err) => {
                    // Integration will record the failure against the asset.
                    warn!(name = %only.name, error = %err, "Lead document unreadable, no range step");
                    None
                }
            },
            _ => None,
        };

        info!(
            sources = supported.len(),
            skipped = skipped.len(),
            range_offered = lead.is_some(),
            "Import staged"
        );

        Ok(Self {
            assets: supported,
            skipped,
            lead,
            pages: None,
            mode: InsertionMode::default(),
            max_pages: config.max_import_pages,
        })
    }

    /// True when the batch is a single readable paginated document, so a
    /// page range may be chosen.
    pub fn offers_range(&self) -> bool {
        self.lead.is_some()
    }

    pub fn lead_page_count(&self) -> Option<u32> {
        self.lead.as_ref().map(|lead| lead.page_count)
    }

    pub fn assets(&self) -> &[SourceAsset] {
        &self.assets
    }

    pub fn skipped(&self) -> &[SkippedAsset] {
        &self.skipped
    }

    /// The chosen 1-based pages of the lead document, if a range was set.
    pub fn selected_pages(&self) -> Option<&[u32]> {
        self.pages.as_deref()
    }

    /// Choose which pages of the lead document to import.
    ///
    /// On error the previously chosen range (or "all") stays in effect.
    pub fn set_range(&mut self, expression: &str) -> Result<usize> {
        let page_count = self
            .lead
            .as_ref()
            .map(|lead| lead.page_count)
            .ok_or(PagewerkError::RangeNotOffered)?;

        let pages = range::parse_required(expression, page_count)?;
        if pages.len() > self.max_pages {
            return Err(PagewerkError::BatchTooLarge {
                limit: self.max_pages,
                requested: pages.len(),
            });
        }

        let count = pages.len();
        debug!(expression, count, "Import range set");
        self.pages = Some(pages);
        Ok(count)
    }

    pub fn mode(&self) -> InsertionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: InsertionMode) {
        self.mode = mode;
    }

    /// Abandon the batch. Nothing has been placed, so there is nothing to undo.
    pub fn cancel(self) {
        info!(sources = self.assets.len(), "Import cancelled before decoding");
    }

    /// Decode every asset in order and build the nodes to place.
    ///
    /// Per-asset failures end up in [`ImportBatch::failures`]. The whole
    /// batch fails only when it would place more than `max_import_pages`.
    #[instrument(skip_all, fields(sources = self.assets.len(), mode = %self.mode))]
    pub fn integrate(
        self,
        decoder: &SourceDecoder<'_>,
        on_progress: &mut dyn FnMut(&ImportProgress<'_>),
    ) -> Result<ImportBatch> {
        let Self {
            assets,
            skipped,
            mut lead,
            pages,
            mode,
            max_pages,
        } = self;

        if let Some(lead) = &lead {
            let requested = pages.as_ref().map_or(lead.page_count as usize, Vec::len);
            if requested > max_pages {
                return Err(PagewerkError::BatchTooLarge {
                    limit: max_pages,
                    requested,
                });
            }
        }

        let asset_count = assets.len();
        let mut sources = Vec::new();
        let mut nodes = Vec::new();
        let mut failures = Vec::new();

        for (asset_index, asset) in assets.iter().enumerate() {
            on_progress(&ImportProgress {
                asset_index,
                asset_count,
                asset_name: &asset.name,
                pages_done: 0,
                pages_total: 0,
            });
            let mut on_page = |done: usize, total: usize| {
                on_progress(&ImportProgress {
                    asset_index,
                    asset_count,
                    asset_name: &asset.name,
                    pages_done: done,
                    pages_total: total,
                })
            };

            let decoded = match (lead.take(), asset.media_kind()) {
                (Some(lead), _) => decoder.decode_document(asset, lead.reader, pages.as_deref(), &mut on_page),
                (None, MediaKind::PaginatedDocument) => match open_document(asset) {
                    Ok(reader) => {
                        let requested = nodes.len() + reader.page_count() as usize;
                        if requested > max_pages {
                            return Err(PagewerkError::BatchTooLarge {
                                limit: max_pages,
                                requested,
                            });
                        }
                        decoder.decode_document(asset, reader, None, &mut on_page)
                    }
                    Err(err) => Err(err),
                },
                (None, _) => {
                    if nodes.len() + 1 > max_pages {
                        return Err(PagewerkError::BatchTooLarge {
                            limit: max_pages,
                            requested: nodes.len() + 1,
                        });
                    }
                    decoder.decode(asset, None, &mut on_page)
                }
            };

            match decoded {
                Ok(decoded) => {
                    let source = SourceId::new();
                    nodes.extend(nodes_for(source, &decoded));
                    sources.push((source, decoded));
                }
                Err(err) => {
                    warn!(name = %asset.name, error = %err, "Asset failed to decode, skipping");
                    failures.push(DecodeFailure::from_error(&asset.name, err));
                }
            }
        }

        info!(
            nodes = nodes.len(),
            sources = sources.len(),
            failures = failures.len(),
            "Import integrated"
        );

        Ok(ImportBatch {
            sources,
            nodes,
            failures,
            skipped,
            mode,
        })
    }
}

/// Nodes in source page order. Previews move into the node; the decoded
/// source keeps only what export needs.
fn nodes_for(source: SourceId, decoded: &DecodedSource) -> Vec<Node> {
    decoded
        .pages
        .iter()
        .map(|page| match page.kind {
            NodeKind::Page => Node::page(source, page.original_index, page.preview.clone()),
            NodeKind::Image => Node::image(source, page.preview.clone()),
        })
        .collect()
}

/// Decoded, not yet placed. Consumed by `Workspace::commit`.
pub struct ImportBatch {
    pub(crate) sources: Vec<(SourceId, DecodedSource)>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) failures: Vec<DecodeFailure>,
    pub(crate) skipped: Vec<SkippedAsset>,
    pub(crate) mode: InsertionMode,
}

impl ImportBatch {
    /// New nodes in source-then-page order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn failures(&self) -> &[DecodeFailure] {
        &self.failures
    }

    pub fn skipped(&self) -> &[SkippedAsset] {
        &self.skipped
    }

    pub fn mode(&self) -> InsertionMode {
        self.mode
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Throw the decoded batch away without placing anything.
    pub fn cancel(self) {
        info!(nodes = self.nodes.len(), "Import batch discarded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagewerk_document::OutlineRenderer;

    use crate::fixtures::{pdf_asset, png_asset};

    fn integrate(pending: PendingImport) -> ImportBatch {
        let renderer = OutlineRenderer::default();
        let decoder = SourceDecoder::new(&renderer, 0.05);
        pending.integrate(&decoder, &mut |_| {}).expect("integrate")
    }

    #[test]
    fn single_document_offers_a_range() {
        let pending = PendingImport::stage(vec![pdf_asset("five.pdf", 5)], &AssemblyConfig::default())
            .expect("stage");
        assert!(pending.offers_range());
        assert_eq!(pending.lead_page_count(), Some(5));
    }

    #[test]
    fn mixed_batch_offers_no_range() {
        let mut pending = PendingImport::stage(
            vec![pdf_asset("a.pdf", 2), png_asset("b.png", 8, 8)],
            &AssemblyConfig::default(),
        )
        .expect("stage");
        assert!(!pending.offers_range());
        assert!(matches!(pending.set_range("1"), Err(PagewerkError::RangeNotOffered)));
    }

    #[test]
    fn ranged_import_keeps_chosen_pages_in_order() {
        let mut pending = PendingImport::stage(vec![pdf_asset("five.pdf", 5)], &AssemblyConfig::default())
            .expect("stage");
        assert_eq!(pending.set_range("2-4").expect("range"), 3);

        let batch = integrate(pending);
        let indices: Vec<u32> = batch.nodes().iter().map(|node| node.original_index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert!(batch.failures().is_empty());
    }

    #[test]
    fn empty_range_keeps_previous_choice() {
        let mut pending = PendingImport::stage(vec![pdf_asset("five.pdf", 5)], &AssemblyConfig::default())
            .expect("stage");
        pending.set_range("4,5").expect("range");

        assert!(matches!(pending.set_range("9-12"), Err(PagewerkError::EmptyRange(_))));
        assert_eq!(pending.selected_pages(), Some(&[4, 5][..]));
    }

    #[test]
    fn unsupported_assets_are_skipped_not_fatal() {
        let pending = PendingImport::stage(
            vec![
                SourceAsset::new("notes.txt", "text/plain", b"hello".to_vec()),
                png_asset("photo.png", 10, 10),
            ],
            &AssemblyConfig::default(),
        )
        .expect("stage");
        assert_eq!(pending.skipped().len(), 1);
        assert_eq!(pending.assets().len(), 1);

        let batch = integrate(pending);
        assert_eq!(batch.skipped()[0].name, "notes.txt");
        assert_eq!(batch.nodes().len(), 1);
        assert_eq!(batch.nodes()[0].kind, NodeKind::Image);
    }

    #[test]
    fn only_unsupported_assets_is_nothing_to_import() {
        let result = PendingImport::stage(
            vec![SourceAsset::new("song.mp3", "audio/mpeg", vec![1, 2, 3])],
            &AssemblyConfig::default(),
        );
        assert!(matches!(result, Err(PagewerkError::NothingToImport)));
    }

    #[test]
    fn too_many_sources_are_rejected_at_staging() {
        let config = AssemblyConfig {
            max_import_sources: 2,
            ..AssemblyConfig::default()
        };
        let assets = (0..3).map(|n| png_asset(&format!("{n}.png"), 4, 4)).collect();
        let result = PendingImport::stage(assets, &config);
        assert!(matches!(result, Err(PagewerkError::BatchTooLarge { limit: 2, requested: 3 })));
    }

    #[test]
    fn page_limit_applies_to_the_chosen_range() {
        let config = AssemblyConfig {
            max_import_pages: 3,
            ..AssemblyConfig::default()
        };
        let mut pending = PendingImport::stage(vec![pdf_asset("five.pdf", 5)], &config).expect("stage");
        assert!(matches!(pending.set_range("all"), Err(PagewerkError::BatchTooLarge { .. })));
        assert_eq!(pending.set_range("1-3").expect("range"), 3);

        let renderer = OutlineRenderer::default();
        let decoder = SourceDecoder::new(&renderer, 0.05);
        assert_eq!(pending.integrate(&decoder, &mut |_| {}).expect("integrate").nodes().len(), 3);
    }

    #[test]
    fn page_limit_without_range_fails_before_decoding() {
        let config = AssemblyConfig {
            max_import_pages: 3,
            ..AssemblyConfig::default()
        };
        let pending = PendingImport::stage(vec![pdf_asset("a.pdf", 2), pdf_asset("b.pdf", 2)], &config)
            .expect("stage");
        let renderer = OutlineRenderer::default();
        let decoder = SourceDecoder::new(&renderer, 0.05);
        let result = pending.integrate(&decoder, &mut |_| {});
        assert!(matches!(result, Err(PagewerkError::BatchTooLarge { limit: 3, requested: 4 })));
    }

    #[test]
    fn corrupt_asset_is_recorded_and_batch_continues() {
        let pending = PendingImport::stage(
            vec![
                pdf_asset("good.pdf", 2),
                SourceAsset::new("bad.pdf", "application/pdf", b"%PDF-1.4 nope".to_vec()),
                png_asset("pic.png", 6, 6),
            ],
            &AssemblyConfig::default(),
        )
        .expect("stage");

        let batch = integrate(pending);
        assert_eq!(batch.nodes().len(), 3);
        assert_eq!(batch.failures().len(), 1);
        assert_eq!(batch.failures()[0].name, "bad.pdf");
    }

    #[test]
    fn nodes_are_in_source_then_page_order() {
        let pending = PendingImport::stage(
            vec![pdf_asset("a.pdf", 2), png_asset("b.png", 4, 4), pdf_asset("c.pdf", 1)],
            &AssemblyConfig::default(),
        )
        .expect("stage");
        let batch = integrate(pending);

        let shape: Vec<(NodeKind, u32)> = batch.nodes().iter().map(|node| (node.kind, node.original_index)).collect();
        assert_eq!(
            shape,
            vec![(NodeKind::Page, 0), (NodeKind::Page, 1), (NodeKind::Image, 0), (NodeKind::Page, 0)]
        );
        assert_eq!(batch.nodes()[0].source, batch.nodes()[1].source);
        assert_ne!(batch.nodes()[1].source, batch.nodes()[3].source);
    }

    #[test]
    fn progress_reports_each_asset_and_page() {
        let pending = PendingImport::stage(
            vec![pdf_asset("a.pdf", 2), png_asset("b.png", 4, 4)],
            &AssemblyConfig::default(),
        )
        .expect("stage");
        let renderer = OutlineRenderer::default();
        let decoder = SourceDecoder::new(&renderer, 0.05);

        let mut seen = Vec::new();
        pending
            .integrate(&decoder, &mut |progress| {
                seen.push((progress.asset_index, progress.pages_done, progress.pages_total))
            })
            .expect("integrate");

        assert_eq!(seen, vec![(0, 0, 0), (0, 1, 2), (0, 2, 2), (1, 0, 0), (1, 1, 1)]);
    }

    #[test]
    fn mode_travels_with_the_batch() {
        let mut pending = PendingImport::stage(vec![png_asset("b.png", 4, 4)], &AssemblyConfig::default())
            .expect("stage");
        pending.set_mode(InsertionMode::Prepend);
        assert_eq!(integrate(pending).mode(), InsertionMode::Prepend);
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Workspace: the node store, its selection, and the source library held
// together so compound edits happen in one step.

use std::collections::HashMap;

use pagewerk_core::error::Result;
use pagewerk_core::range;
use pagewerk_core::{Edge, NodeId, SourceId};
use tracing::{debug, info, instrument};

use crate::import::{DecodeFailure, ImportBatch, SkippedAsset};
use crate::library::{SourceEntry, SourceLibrary};
use crate::selection::Selection;
use crate::store::NodeStore;

/// What a commit placed.
#[derive(Debug, Clone, Default)]
pub struct ImportOutcome {
    pub added: usize,
    /// Sources whose bytes were already registered and were shared instead.
    pub reused_sources: usize,
    pub failures: Vec<DecodeFailure>,
    pub skipped: Vec<SkippedAsset>,
}

#[derive(Default)]
pub struct Workspace {
    store: NodeStore,
    selection: Selection,
    library: SourceLibrary,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn library(&self) -> &SourceLibrary {
        &self.library
    }

    // -- Import ---------------------------------------------------------------

    /// Register the batch's sources and merge its nodes, exactly once.
    ///
    /// A source whose bytes match one already in the library is not stored
    /// twice; its nodes point at the existing source instead.
    #[instrument(skip_all, fields(nodes = batch.nodes.len(), mode = %batch.mode))]
    pub fn commit(&mut self, batch: ImportBatch) -> ImportOutcome {
        let ImportBatch {
            sources,
            mut nodes,
            failures,
            skipped,
            mode,
        } = batch;

        let mut remap: HashMap<SourceId, SourceId> = HashMap::new();
        for (id, decoded) in sources {
            if let Some(existing) = self.library.find_by_fingerprint(&decoded.fingerprint) {
                debug!(name = %decoded.name, %existing, "Source already registered, sharing it");
                remap.insert(id, existing);
                continue;
            }
            self.library.insert(
                id,
                SourceEntry {
                    name: decoded.name,
                    fingerprint: decoded.fingerprint,
                    page_count: decoded.page_count,
                    content: decoded.content,
                },
            );
        }
        for node in &mut nodes {
            if let Some(existing) = remap.get(&node.source) {
                node.source = *existing;
            }
        }

        let added = self.store.merge(nodes, mode);
        info!(added, total = self.store.len(), "Import committed");

        ImportOutcome {
            added,
            reused_sources: remap.len(),
            failures,
            skipped,
        }
    }

    // -- Selection ------------------------------------------------------------

    pub fn click(&mut self, id: NodeId) {
        self.selection.click(&self.store, id);
    }

    pub fn shift_click(&mut self, id: NodeId) {
        self.selection.shift_click(&self.store, id);
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(&self.store);
    }

    pub fn select_none(&mut self) {
        self.selection.clear();
    }

    /// Replace the selection with the positions named by a range expression
    /// over the current sequence. Returns how many nodes are now selected.
    pub fn select_range(&mut self, expression: &str) -> Result<usize> {
        let max = u32::try_from(self.store.len()).unwrap_or(u32::MAX);
        let positions = range::parse_required(expression, max)?;
        self.selection.select_positions(&self.store, &positions);
        Ok(self.selection.len())
    }

    pub fn selected_ids(&self) -> Vec<NodeId> {
        self.selection.selected_in_order(&self.store)
    }

    // -- Editing --------------------------------------------------------------

    /// Remove nodes, prune them from the selection, and drop sources nothing
    /// refers to any more.
    pub fn remove(&mut self, ids: &[NodeId]) -> usize {
        let removed = self.store.remove(ids).len();
        self.selection.retain_present(&self.store);
        self.library.prune_unreferenced(&self.store);
        debug!(removed, remaining = self.store.len(), "Nodes removed");
        removed
    }

    pub fn delete_selected(&mut self) -> usize {
        let ids = self.selected_ids();
        self.remove(&ids)
    }

    pub fn rotate(&mut self, ids: &[NodeId], delta: i32) -> Result<usize> {
        self.store.rotate(ids, delta)
    }

    pub fn rotate_selected(&mut self, delta: i32) -> Result<usize> {
        let ids = self.selected_ids();
        self.store.rotate(&ids, delta)
    }

    pub fn move_to_edge(&mut self, ids: &[NodeId], edge: Edge) {
        self.store.move_to_edge(ids, edge);
    }

    pub fn move_selected_to_edge(&mut self, edge: Edge) {
        let ids = self.selected_ids();
        self.store.move_to_edge(&ids, edge);
    }

    /// Single-node drag between zero-based positions.
    pub fn move_node(&mut self, from: usize, to: usize) -> bool {
        self.store.move_range(from, to)
    }

    /// Drop a source from the library while its nodes stay placed. Export
    /// refuses to run until those nodes are removed.
    pub fn evict_source(&mut self, id: SourceId) -> bool {
        self.library.evict(id).is_some()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pagewerk_core::{AssemblyConfig, InsertionMode, SourceAsset};
    use pagewerk_document::{OutlineRenderer, SourceDecoder};

    use crate::fixtures::{pdf_asset, png_asset};
    use crate::import::PendingImport;

    pub(crate) fn import(workspace: &mut Workspace, assets: Vec<SourceAsset>, mode: InsertionMode) -> ImportOutcome {
        let mut pending = PendingImport::stage(assets, &AssemblyConfig::default()).expect("stage");
        pending.set_mode(mode);
        let renderer = OutlineRenderer::default();
        let decoder = SourceDecoder::new(&renderer, 0.05);
        let batch = pending.integrate(&decoder, &mut |_| {}).expect("integrate");
        workspace.commit(batch)
    }

    #[test]
    fn commit_merges_with_the_batch_mode() {
        // [a, b, c] interleaved with [x, y].
        let mut workspace = Workspace::new();
        import(&mut workspace, vec![pdf_asset("abc.pdf", 3)], InsertionMode::Append);
        let existing = workspace.store().ids();

        let outcome = import(
            &mut workspace,
            vec![png_asset("x.png", 4, 4), png_asset("y.png", 5, 5)],
            InsertionMode::Interleave,
        );
        assert_eq!(outcome.added, 2);

        let ids = workspace.store().ids();
        assert_eq!(ids.len(), 5);
        assert_eq!((ids[0], ids[2], ids[4]), (existing[0], existing[1], existing[2]));
        let nodes = workspace.store().nodes();
        assert_eq!(workspace.library().get(nodes[1].source).expect("x").name, "x.png");
        assert_eq!(workspace.library().get(nodes[3].source).expect("y").name, "y.png");
    }

    #[test]
    fn cancelled_import_changes_nothing() {
        let mut workspace = Workspace::new();
        import(&mut workspace, vec![pdf_asset("a.pdf", 2)], InsertionMode::Append);
        let before = workspace.store().ids();

        let pending = PendingImport::stage(vec![pdf_asset("b.pdf", 3)], &AssemblyConfig::default()).expect("stage");
        pending.cancel();

        let renderer = OutlineRenderer::default();
        let decoder = SourceDecoder::new(&renderer, 0.05);
        let batch = PendingImport::stage(vec![pdf_asset("c.pdf", 3)], &AssemblyConfig::default())
            .expect("stage")
            .integrate(&decoder, &mut |_| {})
            .expect("integrate");
        batch.cancel();

        assert_eq!(workspace.store().ids(), before);
        assert_eq!(workspace.library().len(), 1);
    }

    #[test]
    fn identical_bytes_share_one_source() {
        let mut workspace = Workspace::new();
        import(&mut workspace, vec![pdf_asset("a.pdf", 2)], InsertionMode::Append);
        let outcome = import(&mut workspace, vec![pdf_asset("a-again.pdf", 2)], InsertionMode::Append);

        assert_eq!(outcome.reused_sources, 1);
        assert_eq!(workspace.library().len(), 1);
        let nodes = workspace.store().nodes();
        assert_eq!(nodes.len(), 4);
        assert!(nodes.iter().all(|node| node.source == nodes[0].source));
    }

    #[test]
    fn remove_prunes_selection_and_sources() {
        let mut workspace = Workspace::new();
        import(
            &mut workspace,
            vec![pdf_asset("a.pdf", 2), png_asset("b.png", 3, 3)],
            InsertionMode::Append,
        );
        let ids = workspace.store().ids();
        workspace.select_all();

        assert_eq!(workspace.remove(&[ids[2]]), 1);
        assert_eq!(workspace.selected_ids(), vec![ids[0], ids[1]]);
        assert_eq!(workspace.library().len(), 1);
    }

    #[test]
    fn batch_edits_follow_the_selection() {
        // Select b..d and send them to the end.
        let mut workspace = Workspace::new();
        import(&mut workspace, vec![pdf_asset("five.pdf", 5)], InsertionMode::Append);
        let ids = workspace.store().ids();

        workspace.click(ids[1]);
        workspace.shift_click(ids[3]);
        assert_eq!(workspace.rotate_selected(90).expect("rotate"), 3);
        workspace.move_selected_to_edge(Edge::End);

        assert_eq!(workspace.store().ids(), vec![ids[0], ids[4], ids[1], ids[2], ids[3]]);
        assert_eq!(workspace.store().get(ids[2]).expect("c").rotation.degrees(), 90);
        assert_eq!(workspace.store().get(ids[0]).expect("a").rotation.degrees(), 0);
    }

    #[test]
    fn move_to_end_keeps_relative_order_of_the_rest() {
        let mut workspace = Workspace::new();
        import(&mut workspace, vec![pdf_asset("four.pdf", 4)], InsertionMode::Append);
        let ids = workspace.store().ids();
        let (a, b, c, d) = (ids[0], ids[1], ids[2], ids[3]);

        workspace.move_to_edge(&[b, c], Edge::End);
        assert_eq!(workspace.store().ids(), vec![a, d, b, c]);

        workspace.move_node(2, 0);
        workspace.move_node(3, 1);
        workspace.move_node(0, 2);
        // Now [c, a, b, d].
        workspace.move_to_edge(&[b, c], Edge::End);
        assert_eq!(workspace.store().ids(), vec![a, d, c, b]);
    }

    #[test]
    fn trailing_selection_moved_to_end_is_unchanged() {
        let mut workspace = Workspace::new();
        import(&mut workspace, vec![pdf_asset("four.pdf", 4)], InsertionMode::Append);
        let ids = workspace.store().ids();

        workspace.click(ids[1]);
        workspace.shift_click(ids[3]);
        workspace.move_selected_to_edge(Edge::End);
        assert_eq!(workspace.store().ids(), ids);

        // [a, c, b, d] with the same selection.
        workspace.move_node(2, 1);
        let swapped = workspace.store().ids();
        workspace.move_selected_to_edge(Edge::End);
        assert_eq!(workspace.store().ids(), swapped);
    }

    #[test]
    fn delete_selected_range() {
        let mut workspace = Workspace::new();
        import(&mut workspace, vec![pdf_asset("six.pdf", 6)], InsertionMode::Append);
        let ids = workspace.store().ids();

        assert_eq!(workspace.select_range("1, 3-4, 40").expect("range"), 3);
        assert_eq!(workspace.delete_selected(), 3);
        assert_eq!(workspace.store().ids(), vec![ids[1], ids[4], ids[5]]);
        assert!(workspace.selection().is_empty());
        assert!(workspace.select_range("9").is_err());
    }
}

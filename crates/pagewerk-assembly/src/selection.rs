// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Selection engine: click, shift-click, select all/none, and range
// selection over the store's current order.

use std::collections::HashSet;

use pagewerk_core::NodeId;
use tracing::debug;

use crate::store::NodeStore;

/// The set of selected node ids plus the anchor for shift-click.
///
/// Always a subset of the ids in the store it was last checked against; call
/// [`Selection::retain_present`] after every removal.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    selected: HashSet<NodeId>,
    anchor: Option<NodeId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.selected.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn anchor(&self) -> Option<NodeId> {
        self.anchor
    }

    /// Plain click: toggle `id`. Adding it makes it the anchor; removing the
    /// anchor unsets it. Ids not in `store` are ignored.
    pub fn click(&mut self, store: &NodeStore, id: NodeId) {
        if !store.contains(id) {
            return;
        }
        if self.selected.remove(&id) {
            if self.anchor == Some(id) {
                self.anchor = None;
            }
        } else {
            self.selected.insert(id);
            self.anchor = Some(id);
        }
    }

    /// Shift-click: add every node between the anchor and `id`, inclusive.
    ///
    /// With no anchor, or an anchor that has left the store, this behaves
    /// like adding `id` and anchoring on it. The anchor never moves
    /// otherwise.
    pub fn shift_click(&mut self, store: &NodeStore, id: NodeId) {
        let Some(target) = store.position(id) else {
            return;
        };

        let origin = self.anchor.and_then(|anchor| store.position(anchor));
        let Some(origin) = origin else {
            self.selected.insert(id);
            self.anchor = Some(id);
            return;
        };

        let (low, high) = (origin.min(target), origin.max(target));
        self.selected
            .extend(store.nodes()[low..=high].iter().map(|node| node.id()));
        debug!(low, high, selected = self.selected.len(), "Range added to selection");
    }

    /// Select every node. The anchor is left as it was.
    pub fn select_all(&mut self, store: &NodeStore) {
        self.selected = store.ids().into_iter().collect();
    }

    /// Deselect everything. The anchor is left as it was.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Replace the selection with the nodes at the given 1-based positions.
    /// Positions past the end are ignored.
    pub fn select_positions(&mut self, store: &NodeStore, positions: &[u32]) {
        self.selected = positions
            .iter()
            .filter_map(|&position| position.checked_sub(1))
            .filter_map(|index| store.at_position(index as usize))
            .map(|node| node.id())
            .collect();
    }

    /// Drop ids (and the anchor) that are no longer in `store`.
    pub fn retain_present(&mut self, store: &NodeStore) {
        let present: HashSet<NodeId> = store.ids().into_iter().collect();
        self.selected.retain(|id| present.contains(id));
        if self.anchor.is_some_and(|anchor| !present.contains(&anchor)) {
            self.anchor = None;
        }
    }

    /// Selected ids in store order.
    pub fn selected_in_order(&self, store: &NodeStore) -> Vec<NodeId> {
        store
            .nodes()
            .iter()
            .map(|node| node.id())
            .filter(|id| self.selected.contains(id))
            .collect()
    }
}

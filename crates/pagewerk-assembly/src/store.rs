// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Node store: the ordered sequence of placed nodes. Its order is the output
// page order. Every mutation either applies fully or returns before touching
// the sequence.

use std::collections::HashSet;

use pagewerk_core::error::Result;
use pagewerk_core::{Edge, InsertionMode, Node, NodeId, Rotation};
use tracing::{debug, warn};

use crate::insertion;

/// Ordered collection of nodes with unique ids.
#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    nodes: Vec<Node>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Read access ----------------------------------------------------------

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(Node::id).collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    /// Zero-based index of `id`.
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|node| node.id() == id)
    }

    /// The node at zero-based `index`.
    pub fn at_position(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    // -- Mutation -------------------------------------------------------------

    /// Insert `incoming` as one block at `index` (clamped to the end).
    /// Nodes whose id is already placed are dropped. Returns how many were
    /// inserted.
    pub fn insert_at(&mut self, index: usize, incoming: Vec<Node>) -> usize {
        let fresh = self.fresh_only(incoming);
        let index = index.min(self.nodes.len());
        let count = fresh.len();
        self.nodes.splice(index..index, fresh);
        count
    }

    /// Merge `incoming` into the sequence with an insertion strategy.
    pub fn merge(&mut self, incoming: Vec<Node>, mode: InsertionMode) -> usize {
        let fresh = self.fresh_only(incoming);
        let count = fresh.len();
        let existing = std::mem::take(&mut self.nodes);
        self.nodes = insertion::merge(existing, fresh, mode);
        debug!(count, %mode, total = self.nodes.len(), "Nodes merged");
        count
    }

    /// Drag the node at `from` so that it ends up at `to` (both zero-based).
    /// Returns `false` and leaves the order alone if either index is out of
    /// range.
    pub fn move_range(&mut self, from: usize, to: usize) -> bool {
        let len = self.nodes.len();
        if from >= len || to >= len {
            return false;
        }
        if from != to {
            let node = self.nodes.remove(from);
            self.nodes.insert(to, node);
        }
        true
    }

    /// Remove every node in `ids`. Unknown ids are ignored. The removed nodes
    /// are returned in their former order.
    pub fn remove(&mut self, ids: &[NodeId]) -> Vec<Node> {
        let doomed: HashSet<NodeId> = ids.iter().copied().collect();
        let (removed, kept): (Vec<Node>, Vec<Node>) = std::mem::take(&mut self.nodes)
            .into_iter()
            .partition(|node| doomed.contains(&node.id()));
        self.nodes = kept;
        removed
    }

    /// Add `delta` degrees to the rotation of every node in `ids`.
    ///
    /// `delta` must be a multiple of 90; otherwise no node is touched.
    pub fn rotate(&mut self, ids: &[NodeId], delta: i32) -> Result<usize> {
        Rotation::from_degrees(delta)?;
        let targets: HashSet<NodeId> = ids.iter().copied().collect();

        let mut rotated = 0;
        for node in self.nodes.iter_mut().filter(|node| targets.contains(&node.id())) {
            node.rotation = node.rotation.rotated_by(delta)?;
            rotated += 1;
        }
        Ok(rotated)
    }

    /// Stable partition: the nodes in `ids` move to `edge` as a block, keeping
    /// their relative order, and so do all the others.
    pub fn move_to_edge(&mut self, ids: &[NodeId], edge: Edge) {
        let moving: HashSet<NodeId> = ids.iter().copied().collect();
        let (chosen, rest): (Vec<Node>, Vec<Node>) = std::mem::take(&mut self.nodes)
            .into_iter()
            .partition(|node| moving.contains(&node.id()));

        self.nodes = match edge {
            Edge::Start => chosen.into_iter().chain(rest).collect(),
            Edge::End => rest.into_iter().chain(chosen).collect(),
        };
    }

    /// Keep only nodes whose id is new to the store (and to the batch).
    fn fresh_only(&self, incoming: Vec<Node>) -> Vec<Node> {
        let mut seen: HashSet<NodeId> = self.nodes.iter().map(Node::id).collect();
        let offered = incoming.len();
        let fresh: Vec<Node> = incoming.into_iter().filter(|node| seen.insert(node.id())).collect();
        if fresh.len() != offered {
            warn!(dropped = offered - fresh.len(), "Duplicate node ids dropped");
        }
        fresh
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Source library: decoded source handles keyed by source id. Nodes hold only
// the id; export looks the handle up here.

use std::collections::{HashMap, HashSet};

use pagewerk_core::{MediaKind, SourceId};
use pagewerk_document::DecodedContent;
use tracing::{debug, info};

use crate::store::NodeStore;

/// One registered source.
pub struct SourceEntry {
    pub name: String,
    /// SHA-256 of the asset bytes, lowercase hex.
    pub fingerprint: String,
    pub page_count: u32,
    pub content: DecodedContent,
}

impl SourceEntry {
    pub fn media_kind(&self) -> MediaKind {
        self.content.media_kind()
    }
}

#[derive(Default)]
pub struct SourceLibrary {
    entries: HashMap<SourceId, SourceEntry>,
}

impl SourceLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: SourceId, entry: SourceEntry) {
        debug!(%id, name = %entry.name, "Source registered");
        self.entries.insert(id, entry);
    }

    pub fn get(&self, id: SourceId) -> Option<&SourceEntry> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: SourceId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The id of a source with identical bytes, if one is registered.
    pub fn find_by_fingerprint(&self, fingerprint: &str) -> Option<SourceId> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.fingerprint == fingerprint)
            .map(|(id, _)| *id)
    }

    /// Drop a source. Nodes that still point at it will fail to export.
    pub fn evict(&mut self, id: SourceId) -> Option<SourceEntry> {
        let evicted = self.entries.remove(&id);
        if let Some(entry) = &evicted {
            info!(%id, name = %entry.name, "Source evicted");
        }
        evicted
    }

    /// Drop every source no node in `store` refers to. Returns how many were
    /// dropped.
    pub fn prune_unreferenced(&mut self, store: &NodeStore) -> usize {
        let referenced: HashSet<SourceId> = store.nodes().iter().map(|node| node.source).collect();
        let before = self.entries.len();
        self.entries.retain(|id, _| referenced.contains(id));
        let pruned = before - self.entries.len();
        if pruned > 0 {
            debug!(pruned, remaining = self.entries.len(), "Unreferenced sources pruned");
        }
        pruned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use pagewerk_core::Node;

    use crate::store::tests::preview;

    fn image_entry(name: &str, fingerprint: &str) -> SourceEntry {
        SourceEntry {
            name: name.into(),
            fingerprint: fingerprint.into(),
            page_count: 1,
            content: DecodedContent::Image {
                bytes: Arc::from(vec![0u8; 4]),
                width: 2,
                height: 2,
            },
        }
    }

    #[test]
    fn finds_sources_by_fingerprint() {
        let mut library = SourceLibrary::new();
        let id = SourceId::new();
        library.insert(id, image_entry("a.png", "abc"));

        assert_eq!(library.find_by_fingerprint("abc"), Some(id));
        assert_eq!(library.find_by_fingerprint("def"), None);
        assert_eq!(library.get(id).expect("entry").media_kind(), MediaKind::Image);
    }

    #[test]
    fn evict_removes_once() {
        let mut library = SourceLibrary::new();
        let id = SourceId::new();
        library.insert(id, image_entry("a.png", "abc"));

        assert!(library.evict(id).is_some());
        assert!(library.evict(id).is_none());
        assert!(!library.contains(id));
    }

    #[test]
    fn prune_keeps_only_referenced_sources() {
        let mut library = SourceLibrary::new();
        let (kept, dropped) = (SourceId::new(), SourceId::new());
        library.insert(kept, image_entry("kept.png", "1"));
        library.insert(dropped, image_entry("dropped.png", "2"));

        let mut store = NodeStore::new();
        store.insert_at(0, vec![Node::image(kept, preview())]);

        assert_eq!(library.prune_unreferenced(&store), 1);
        assert!(library.contains(kept));
        assert!(!library.contains(dropped));
    }
}

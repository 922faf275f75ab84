// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The in-memory `path -> (latest_seq, metadata, version_set)` index
//! (spec §3, §4.C). Mutated only by the Sync Engine, under the Session
//! lock; reads outside a session are tolerated as dirty reads.

use std::collections::{BTreeSet, HashMap};

use mailfs_core::{store::Sequence, FileMetadata};

/// One live path's state.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub latest_seq: Sequence,
    pub metadata: FileMetadata,
    pub versions: BTreeSet<Sequence>,
}

/// `path -> IndexEntry`, with O(1) lookup and O(n) prefix scans for
/// directory listings.
#[derive(Default)]
pub struct Index {
    entries: HashMap<String, IndexEntry>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn remove(&mut self, path: &str) -> Option<IndexEntry> {
        self.entries.remove(path)
    }

    pub fn insert(&mut self, path: String, entry: IndexEntry) {
        self.entries.insert(path, entry);
    }

    pub fn paths(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &IndexEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a newly-observed message for `path`, applying the tie-break
    /// rule: the entry with the highest `seq` always wins (spec §4.D).
    /// Returns `true` if this observation actually advanced the entry.
    pub fn observe(&mut self, path: &str, seq: Sequence, metadata: FileMetadata) -> bool {
        let current_latest = self.entries.get(path).map(|e| e.latest_seq);
        if current_latest.is_some_and(|latest| latest >= seq) {
            return false;
        }

        let mut versions = self
            .entries
            .get(path)
            .map(|e| e.versions.clone())
            .unwrap_or_default();
        versions.insert(seq);

        self.entries.insert(
            path.to_string(),
            IndexEntry {
                latest_seq: seq,
                metadata,
                versions,
            },
        );
        true
    }

    /// All live paths directly or transitively under `prefix` (a
    /// directory-style listing derived by prefix match).
    pub fn listing(&self, prefix: &str) -> Vec<String> {
        self.entries
            .keys()
            .filter(|p| mailfs_core::FilePath::new(p.as_str()).starts_with_dir(prefix))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
#[path = "index_tests.rs"]
mod tests;

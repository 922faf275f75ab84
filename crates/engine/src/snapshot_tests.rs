// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::index::IndexEntry;
use mailfs_core::FileMetadata;

fn md(fname: &str, bytes: usize) -> FileMetadata {
    let mut m = FileMetadata::new();
    m.canonicalize(fname, bytes);
    m
}

#[test]
fn round_trips_tree_and_seen() {
    let mut index = Index::new();
    index.insert(
        "a/b".to_string(),
        IndexEntry {
            latest_seq: 7,
            metadata: md("a/b", 5),
            versions: [3, 7].into_iter().collect(),
        },
    );
    let seen: BTreeSet<Sequence> = [3, 5, 7].into_iter().collect();

    let blob = serialize(&index, &seen).unwrap();
    let parsed = deserialize(&blob).unwrap();

    assert_eq!(parsed.tree.len(), 1);
    let (path, seq, metadata, versions) = &parsed.tree[0];
    assert_eq!(path, "a/b");
    assert_eq!(*seq, 7);
    assert_eq!(metadata.fn_path(), Some("a/b"));
    assert_eq!(versions, &vec![3, 7]);

    let mut seen_sorted = parsed.seen.clone();
    seen_sorted.sort_unstable();
    assert_eq!(seen_sorted, vec![3, 5, 7]);
}

#[test]
fn empty_index_round_trips() {
    let index = Index::new();
    let seen = BTreeSet::new();
    let blob = serialize(&index, &seen).unwrap();
    let parsed = deserialize(&blob).unwrap();
    assert!(parsed.tree.is_empty());
    assert!(parsed.seen.is_empty());
}

#[test]
fn corrupt_payload_is_malformed_not_panic() {
    let garbage = b"not a zlib stream".to_vec();
    assert!(deserialize(&garbage).is_err());
}

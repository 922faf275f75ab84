// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Serializes the Index and Seen set as a compressed JSON blob (spec §3,
//! §4.H), so a cold client can populate its Index with one fetch instead
//! of replaying every message.

use std::collections::BTreeSet;
use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use mailfs_core::store::Sequence;
use mailfs_core::FileMetadata;
use serde_json::{json, Value};

use crate::index::Index;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("malformed snapshot payload")]
    Malformed,
    #[error("snapshot json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot compression error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct ParsedSnapshot {
    pub tree: Vec<(String, Sequence, FileMetadata, Vec<Sequence>)>,
    pub seen: Vec<Sequence>,
}

/// Encode `index` and `seen` as a compressed JSON document per spec §3's
/// `{tree: {path: [seq, metadata, [versions...]]}, seen: [...]}` shape.
pub fn serialize(index: &Index, seen: &BTreeSet<Sequence>) -> Result<Vec<u8>, SnapshotError> {
    let mut tree = serde_json::Map::new();
    for (path, entry) in index.iter() {
        let versions: Vec<Sequence> = entry.versions.iter().copied().collect();
        tree.insert(
            path.clone(),
            json!([entry.latest_seq, entry.metadata.clone().into_value(), versions]),
        );
    }
    let seen_vec: Vec<Sequence> = seen.iter().copied().collect();
    let doc = json!({ "tree": Value::Object(tree), "seen": seen_vec });
    let plain = serde_json::to_vec(&doc)?;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&plain)?;
    Ok(encoder.finish()?)
}

/// Decode a snapshot payload previously produced by [`serialize`].
pub fn deserialize(data: &[u8]) -> Result<ParsedSnapshot, SnapshotError> {
    let mut decoder = ZlibDecoder::new(data);
    let mut plain = Vec::new();
    decoder.read_to_end(&mut plain)?;

    let doc: Value = serde_json::from_slice(&plain)?;
    let tree_val = doc
        .get("tree")
        .and_then(Value::as_object)
        .ok_or(SnapshotError::Malformed)?;

    let mut tree = Vec::with_capacity(tree_val.len());
    for (path, entry) in tree_val {
        let arr = entry.as_array().ok_or(SnapshotError::Malformed)?;
        let [seq_v, metadata_v, versions_v] = arr.as_slice() else {
            return Err(SnapshotError::Malformed);
        };
        let seq = seq_v.as_u64().ok_or(SnapshotError::Malformed)?;
        let metadata = FileMetadata::from_value(metadata_v.clone());
        let versions = versions_v
            .as_array()
            .ok_or(SnapshotError::Malformed)?
            .iter()
            .filter_map(Value::as_u64)
            .collect();
        tree.push((path.clone(), seq, metadata, versions));
    }

    let seen = doc
        .get("seen")
        .and_then(Value::as_array)
        .ok_or(SnapshotError::Malformed)?
        .iter()
        .filter_map(Value::as_u64)
        .collect();

    Ok(ParsedSnapshot { tree, seen })
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;

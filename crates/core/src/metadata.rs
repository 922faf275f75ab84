// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Free-form file metadata.
//!
//! Modeled as a `serde_json::Value` object rather than a closed struct:
//! unknown fields must round-trip verbatim (see spec Design Notes), and
//! only `fn`, `bytes`, `versions`, `ts`, `deleted`, `_` are interpreted by
//! name.

use serde_json::{Map, Value};

/// The JSON object stored alongside each file version.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FileMetadata(Map<String, Value>);

impl FileMetadata {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self(Map::new()),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }

    /// The path recorded under `fn`.
    pub fn fn_path(&self) -> Option<&str> {
        self.0.get("fn").and_then(Value::as_str)
    }

    /// The plaintext payload length recorded under `bytes`.
    pub fn bytes_len(&self) -> Option<usize> {
        self.0.get("bytes").and_then(Value::as_u64).map(|n| n as usize)
    }

    /// Retention count, `versions`, defaulting to 1 when absent.
    pub fn versions_wanted(&self) -> usize {
        self.0
            .get("versions")
            .and_then(Value::as_u64)
            .map(|n| n as usize)
            .unwrap_or(1)
            .max(1)
    }

    pub fn set_ts(&mut self, unix_time: i64) {
        self.0.insert("ts".to_string(), Value::from(unix_time));
    }

    pub fn is_deleted(&self) -> bool {
        self.0.get("deleted").and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn set_deleted(&mut self, deleted: bool) {
        if deleted {
            self.0.insert("deleted".to_string(), Value::Bool(true));
        } else {
            self.0.remove("deleted");
        }
    }

    /// Canonicalize for encoding: inject/override `fn` and `bytes`, drop the
    /// caller-visible-only fields a fresh encode always recomputes.
    pub fn canonicalize(&mut self, path: &str, payload_len: usize) {
        self.0.insert("fn".to_string(), Value::from(path));
        self.0.insert("bytes".to_string(), Value::from(payload_len as u64));
    }

    /// Strip `fn` and `_`, as the original's `_clean_metadata` does: `fn` is
    /// redundant with the index key and `_` is encryption padding, neither
    /// of which should reach a caller or live in the in-memory index.
    pub fn strip_internal(&mut self) {
        self.0.remove("fn");
        self.0.remove("_");
    }
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Staged, unflushed writes (spec §4.E). A closed writable handle lands
//! here; flush encodes and appends each pending file, leaving anything
//! that fails to append for the next attempt.

use std::collections::HashMap;

use mailfs_codec::{encode_object, EncodeConfig};
use mailfs_core::store::MailStore;
use mailfs_core::{FileMetadata, MailfsError};
use tracing::warn;

pub struct Pending {
    pub payload: Vec<u8>,
    pub metadata: FileMetadata,
}

#[derive(Default)]
pub struct WriteBuffer {
    pending: HashMap<String, Pending>,
    bytes: usize,
}

impl WriteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(&self) -> usize {
        self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Stage `path` for append on next flush, replacing any prior pending
    /// write to the same path (last writer before flush wins locally).
    pub fn stage(&mut self, path: String, payload: Vec<u8>, metadata: FileMetadata) {
        if let Some(old) = self.pending.remove(&path) {
            self.bytes -= old.payload.len();
        }
        self.bytes += payload.len();
        self.pending.insert(path, Pending { payload, metadata });
    }

    /// Drop any pending write for `path` without flushing it.
    pub fn discard(&mut self, path: &str) -> Option<Pending> {
        let removed = self.pending.remove(path);
        if let Some(p) = &removed {
            self.bytes -= p.payload.len();
        }
        removed
    }

    pub fn peek(&self, path: &str) -> Option<&Pending> {
        self.pending.get(path)
    }

    /// Encode and append every pending file via `store`. Files that
    /// append successfully are removed; files that fail remain buffered
    /// for a future flush. Returns `Ok(true)` iff every pending file was
    /// flushed ("fully happy"); `Ok(false)` means some writes remain
    /// staged for retry.
    pub fn flush(
        &mut self,
        store: &mut dyn MailStore,
        folder: &str,
        cfg: &EncodeConfig,
    ) -> Result<bool, MailfsError> {
        let paths: Vec<String> = self.pending.keys().cloned().collect();
        let mut fully_happy = true;

        for path in paths {
            let Some((payload, metadata)) = self
                .pending
                .get(&path)
                .map(|p| (p.payload.clone(), p.metadata.clone()))
            else {
                continue;
            };
            let fpath = mailfs_core::FilePath::new(path.as_str());
            let encoded = match encode_object(&fpath, &payload, metadata, cfg) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(path = %path, error = %e, "failed to encode buffered write");
                    fully_happy = false;
                    continue;
                }
            };

            match store.append(folder, &encoded) {
                Ok(_seq) => {
                    self.pending.remove(&path);
                    self.bytes -= payload.len();
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "append failed, write remains buffered");
                    fully_happy = false;
                }
            }
        }

        Ok(fully_happy)
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;

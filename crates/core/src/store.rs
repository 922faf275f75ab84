// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `MailStore`: the narrow capability the sync engine consumes.
//!
//! Everything about the backing mailbox transport — connection handling,
//! authentication, transport encryption — lives behind this trait and is
//! explicitly out of scope for the engine. `mailfs-store` provides the one
//! concrete (maildir-backed) implementation this workspace ships; a real
//! IMAP/JMAP/whatever transport is a caller's integration against the same
//! trait.

use thiserror::Error;

/// A sequence number the backing store assigns on append: strictly
/// monotonic, never reused, totally ordering all writes to a folder.
pub type Sequence = u64;

/// An optional byte range for a partial fetch (used by the sync engine to
/// peek at just the header section of a message).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub len: u64,
}

impl ByteRange {
    pub fn new(start: u64, len: u64) -> Self {
        Self { start, len }
    }
}

/// Errors a `MailStore` implementation can surface.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("folder not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("backend rejected the operation: {0}")]
    Rejected(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// The capability `mailfs-engine` needs from a backing append-only mailbox.
///
/// All operations are synchronous from the engine's point of view; the
/// engine holds its session lock across every call it makes here.
pub trait MailStore {
    /// Select (open) a folder, returning the number of messages present.
    fn select(&mut self, folder: &str) -> StoreResult<u64>;

    /// Create a folder that does not yet exist.
    fn create(&mut self, folder: &str) -> StoreResult<()>;

    /// All sequences currently live in the selected folder, any order.
    fn search_all(&mut self) -> StoreResult<Vec<Sequence>>;

    /// Fetch a message's raw bytes, optionally restricted to a byte range.
    /// A `None` range fetches the full message.
    fn fetch(&mut self, seq: Sequence, range: Option<ByteRange>) -> StoreResult<Vec<u8>>;

    /// Append a message to `folder`, returning its assigned sequence. The
    /// assigned sequence is strictly greater than every sequence this
    /// folder has ever returned before.
    fn append(&mut self, folder: &str, message: &[u8]) -> StoreResult<Sequence>;

    /// Mark the given sequences for deletion (not yet reclaimed until
    /// `expunge`).
    fn store_delete(&mut self, seqs: &[Sequence]) -> StoreResult<()>;

    /// Reclaim space for sequences marked deleted.
    fn expunge(&mut self) -> StoreResult<()>;
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

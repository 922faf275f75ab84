// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! mailfs-core: shared domain types for the mailfs log-structured filesystem
//!
//! This crate defines the vocabulary the rest of the workspace builds on:
//! normalized file paths, the `application/x-mailfile` metadata shape, the
//! sequence numbers a backing mailbox assigns, and the `MailStore` port the
//! sync engine consumes. It has no opinion on how messages are encoded
//! (`mailfs-codec`), where they are stored (`mailfs-store`), or how the
//! index is kept in sync (`mailfs-engine`).

pub mod error;
pub mod metadata;
pub mod path;
pub mod store;

pub use error::MailfsError;
pub use metadata::FileMetadata;
pub use path::FilePath;
pub use store::{ByteRange, MailStore, Sequence};

/// The reserved path under which the index snapshot is stored.
///
/// Callers must not write to this path directly; `mailfs-engine`'s sync
/// pass treats any message addressed here as a snapshot object.
pub const SNAPSHOT_PATH: &str = "mailfs/metadata";

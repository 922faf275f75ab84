// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! mailfs-store: a maildir-backed `MailStore`.
//!
//! This is the one concrete backing-mailbox implementation the workspace
//! ships, mirroring the original's `backends.FilesystemIMAP` reference
//! backend: a `<base>/<folder>/{cur,new,tmp}` tree with one file per
//! message, named by its assigned sequence number. A real IMAP/JMAP
//! transport is a caller's own implementation of `mailfs_core::MailStore`
//! — the port exists so one can be swapped in without touching the sync
//! engine.

mod maildir;

pub use maildir::MaildirStore;

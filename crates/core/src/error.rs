// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The error taxonomy the engine surfaces to callers.

use thiserror::Error;

/// Errors surfaced by the mailfs engine.
///
/// Per-message decode/crypto/fetch failures encountered during a reverse
/// scan are *not* represented here — those are swallowed into a "broken;
/// skip" outcome and logged, never propagated (see `mailfs-engine::sync`).
/// This enum covers failures a caller's single operation can observe.
#[derive(Debug, Error)]
pub enum MailfsError {
    /// The backing folder could not be selected or created.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The requested path (or version) is not present.
    #[error("not found: {0}")]
    NotFound(String),

    /// The stored envelope could not be decoded: malformed JSON, missing
    /// MIME part, or other structural defect.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Authenticated decryption failed (bad key, tampered ciphertext, or
    /// expired/invalid token framing).
    #[error("crypto error: {0}")]
    CryptoError(String),

    /// A fetched message's `fn` field disagreed with the path requested.
    #[error("integrity error: expected path {expected:?}, found {found:?}")]
    IntegrityError { expected: String, found: String },

    /// `append` returned a non-OK response; the write remains buffered.
    #[error("write rejected: {0}")]
    WriteRejected(String),

    /// An explicitly requested version is not in the path's version set.
    #[error("version conflict: {path} has no version {version}")]
    VersionConflict { path: String, version: u64 },
}

pub type Result<T> = std::result::Result<T, MailfsError>;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Decode/encode failures, distinguishable from the I/O failures a
/// `MailStore` can raise (see spec §7).
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("missing header: {0}")]
    MissingHeader(&'static str),
    #[error("message has no header/body separator")]
    Malformed,
    #[error("invalid metadata JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("message is encrypted but no key was configured")]
    EncryptedWithoutKey,
    #[error("decryption failed: bad key or tampered ciphertext")]
    DecryptionFailed,
    #[error("could not derive an encryption key from the supplied material")]
    KeyDerivation,
}

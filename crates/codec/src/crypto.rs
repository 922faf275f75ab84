// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authenticated encryption for metadata/payload, equivalent to the
//! original's use of `cryptography.fernet.Fernet` (AES-128-CBC +
//! HMAC-SHA256, 128-bit IV, URL-safe base64 framing). Keyed by the real
//! `fernet` crate rather than hand-rolled AES/HMAC plumbing.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use sha2::{Digest, Sha256};

use crate::error::CodecError;

/// A derived encryption engine for one session's key material.
pub struct Crypto {
    fernet: fernet::Fernet,
}

impl Crypto {
    /// Derive a Fernet key from arbitrary caller-supplied key material, per
    /// spec §6.3: `url_safe_b64encode(SHA-256(user_key)[0..32])`. The
    /// caller is responsible for supplying strong key material; this only
    /// normalizes its length.
    pub fn derive(key_material: &[u8]) -> Result<Self, CodecError> {
        let digest = Sha256::digest(key_material);
        let key = URL_SAFE.encode(digest);
        let fernet = fernet::Fernet::new(&key).ok_or(CodecError::KeyDerivation)?;
        Ok(Self { fernet })
    }

    /// Encrypt `data`, returning a Fernet token (without the `!` framing
    /// prefix the envelope format adds).
    pub fn encrypt(&self, data: &[u8]) -> String {
        self.fernet.encrypt(data)
    }

    /// Decrypt a Fernet token (without the `!` prefix).
    pub fn decrypt(&self, token: &str) -> Result<Vec<u8>, CodecError> {
        self.fernet
            .decrypt(token)
            .map_err(|_| CodecError::DecryptionFailed)
    }
}

#[cfg(test)]
#[path = "crypto_tests.rs"]
mod tests;

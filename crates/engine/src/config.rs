// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session configuration: addressing, buffering policy, and the current
//! encryption key (if any). Pushed/popped on a stack across scoped
//! sessions (§4.F) so a caller can toggle encryption or buffering for a
//! single transaction and have it revert automatically on exit.

use std::sync::Arc;

use mailfs_codec::Crypto;

/// Default subject line used in encoded envelopes.
pub const DEFAULT_SUBJECT: &str = "[mailfs] File Storage";
/// Default flush threshold: 100 KiB of buffered, un-flushed file content.
pub const DEFAULT_BUFFERING_MAX_BYTES: usize = 102_400;

#[derive(Clone)]
pub struct Config {
    pub subject: String,
    pub email_to: String,
    pub email_from: String,
    pub buffering: bool,
    pub buffering_max_bytes: usize,
    pub crypto: Option<Arc<Crypto>>,
}

impl Config {
    pub fn encrypt(&self) -> bool {
        self.crypto.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            subject: DEFAULT_SUBJECT.to_string(),
            email_to: "to@mailfs.example".to_string(),
            email_from: "from@mailfs.example".to_string(),
            buffering: false,
            buffering_max_bytes: DEFAULT_BUFFERING_MAX_BYTES,
            crypto: None,
        }
    }
}

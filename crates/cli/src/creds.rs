// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential persistence (spec §6.5), grounded in `ifaplib/cli.py`'s
//! `~/.ifap-login`: a base64-wrapped JSON document at `~/.mailfs-login`
//! naming the backing store and (optionally) the encryption key,
//! written with `0600` permissions.
//!
//! The original additionally stores an IMAP username/password, since its
//! only real backend is a remote IMAP server. This workspace ships one
//! backend, the local maildir (`mailfs-store`), which needs no such
//! secret — so there is nothing for `logout` to selectively strip, and
//! it simply removes the file.

use std::fs;
use std::io;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredsError {
    #[error("$HOME is not set")]
    NoHome,
    #[error("not logged in; run `mailfs login` first")]
    NotLoggedIn,
    #[error("credentials file is corrupt: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, CredsError>;

/// The backing maildir root, mailbox folder name, and optional
/// encryption key material, as persisted across CLI invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub backend: PathBuf,
    pub mailbox: String,
    pub key: Option<String>,
}

/// `~/.mailfs-login`, mirroring the original's `_loginfile()`.
pub fn login_file() -> Result<PathBuf> {
    let home = std::env::var("HOME").map_err(|_| CredsError::NoHome)?;
    Ok(PathBuf::from(home).join(".mailfs-login"))
}

pub fn load() -> Result<Credentials> {
    let path = login_file()?;
    let encoded = fs::read_to_string(&path).map_err(|_| CredsError::NotLoggedIn)?;
    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|e| CredsError::Corrupt(e.to_string()))?;
    serde_json::from_slice(&decoded).map_err(|e| CredsError::Corrupt(e.to_string()))
}

pub fn save(creds: &Credentials) -> Result<()> {
    let path = login_file()?;
    let json = serde_json::to_vec(creds).map_err(|e| CredsError::Corrupt(e.to_string()))?;
    fs::write(&path, STANDARD.encode(json))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

pub fn logout() -> Result<()> {
    let path = login_file()?;
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(CredsError::NotLoggedIn),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "creds_tests.rs"]
mod tests;

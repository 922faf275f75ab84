// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command implementations (spec §6.5): thin glue from parsed CLI
//! arguments onto the engine's `Mailfs`/`Session` facade. No business
//! logic lives here beyond argument plumbing and output formatting,
//! mirroring how little `ifaplib/cli.py`'s command functions do beyond
//! calling into `IFAP` itself.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{Local, TimeZone};
use tracing::info;

use mailfs_engine::{Mailfs, Mode};
use mailfs_store::MaildirStore;

use crate::creds::{self, Credentials};

fn open_mailfs() -> Result<Mailfs<MaildirStore>> {
    let creds = creds::load()?;
    let store = MaildirStore::new(&creds.backend);
    let mailfs = Mailfs::with_base_folder(store, creds.mailbox);
    if let Some(key) = creds.key {
        mailfs.set_encryption_key(key.as_bytes())?;
    }
    Ok(mailfs)
}

pub fn login(backend: PathBuf, mailbox: String, key: Option<String>) -> Result<()> {
    fs::create_dir_all(&backend)
        .with_context(|| format!("creating backend directory {}", backend.display()))?;

    let store = MaildirStore::new(&backend);
    let mailfs = Mailfs::with_base_folder(store, mailbox.clone());
    if let Some(ref key) = key {
        mailfs.set_encryption_key(key.as_bytes())?;
    }
    // Validate the backend/credentials now, same as the original's
    // `_get_ifap(creds).synchronize()` before it persists them.
    mailfs.session()?;

    creds::save(&Credentials { backend, mailbox, key })?;
    let login_file = creds::login_file()?;
    info!(path = %login_file.display(), "credentials saved");
    eprintln!("OK: credentials saved to {}", login_file.display());
    Ok(())
}

pub fn logout() -> Result<()> {
    creds::logout()?;
    let login_file = creds::login_file()?;
    info!(path = %login_file.display(), "credentials deleted");
    eprintln!("OK: deleted {}", login_file.display());
    Ok(())
}

pub fn put(local: &Path, path: &str) -> Result<()> {
    let data = fs::read(local).with_context(|| format!("reading {}", local.display()))?;
    let mailfs = open_mailfs()?;
    let session = mailfs.session()?;
    let mut handle = session.open(path, Mode::Write, None)?;
    handle.write(&data)?;
    session.close(handle)?;
    Ok(())
}

pub fn get(path: &str, local: &Path, version: Option<u64>) -> Result<()> {
    let mailfs = open_mailfs()?;
    let session = mailfs.session()?;
    let mut handle = session.open(path, Mode::Read, version)?;
    let data = handle.read_to_end()?;
    fs::write(local, data).with_context(|| format!("writing {}", local.display()))?;
    Ok(())
}

pub fn cat(path: &str, version: Option<u64>) -> Result<()> {
    let mailfs = open_mailfs()?;
    let session = mailfs.session()?;
    let mut handle = session.open(path, Mode::Read, version)?;
    let data = handle.read_to_end()?;
    std::io::stdout().write_all(&data)?;
    Ok(())
}

pub fn ls(prefix: &str, long: bool) -> Result<()> {
    let mailfs = open_mailfs()?;
    let session = mailfs.session()?;
    let mut entries = session.ls(prefix);
    entries.sort();

    for path in entries {
        if !long {
            println!("{path}");
            continue;
        }
        let versions = session.versions(&path);
        let handle = session.open(&path, Mode::Read, None)?;
        let ts = handle
            .metadata()
            .as_map()
            .get("ts")
            .and_then(serde_json::Value::as_i64)
            .and_then(|secs| Local.timestamp_opt(secs, 0).single())
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{path:<40} versions={:<4} modified={ts}", versions.len());
    }
    Ok(())
}

pub fn rm(path: &str, all_versions: bool) -> Result<()> {
    let mailfs = open_mailfs()?;
    let session = mailfs.session()?;
    session.remove(path)?;

    // `remove` only leaves a tombstone (with history) behind for paths
    // retained beyond one version; a default-retention path is already
    // fully erased by `remove` itself, with nothing left to re-tombstone.
    if all_versions && !session.versions(path).is_empty() {
        // Forcing `versions` down to 1 means the next cleanup pass keeps
        // only this tombstone, discarding every earlier retained version.
        let mut handle = session.open(path, Mode::ReadWrite, None)?;
        handle
            .metadata_mut()
            .as_map_mut()
            .insert("versions".to_string(), serde_json::Value::from(1));
        handle
            .metadata_mut()
            .as_map_mut()
            .insert("deleted".to_string(), serde_json::Value::from(true));
        session.close(handle)?;
    }

    session.synchronize(true, Some(true), false)?;
    Ok(())
}

pub fn versions(path: &str, set: Option<usize>) -> Result<()> {
    let mailfs = open_mailfs()?;
    let session = mailfs.session()?;

    if let Some(count) = set {
        // Mirrors `_vers_command`: open for read+write, stamp the desired
        // retention count, then synchronize with a fresh snapshot.
        let mut handle = session.open(path, Mode::ReadWrite, None)?;
        handle
            .metadata_mut()
            .as_map_mut()
            .insert("versions".to_string(), serde_json::Value::from(count as u64));
        session.close(handle)?;
        session.synchronize(false, Some(true), false)?;
        return Ok(());
    }

    let versions = session.versions(path);
    if versions.is_empty() {
        bail!("not found: {path}");
    }
    for seq in versions {
        println!("{seq}");
    }
    Ok(())
}

pub fn sync(cleanup: bool, snapshot: bool) -> Result<()> {
    let mailfs = open_mailfs()?;
    let session = mailfs.session()?;
    let snapshot_request = if snapshot { Some(true) } else { None };
    session.synchronize(cleanup, snapshot_request, false)?;
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;

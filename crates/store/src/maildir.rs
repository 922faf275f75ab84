// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use mailfs_core::store::{ByteRange, MailStore, Sequence, StoreError, StoreResult};
use tracing::warn;

const MESSAGE_PREFIX: &str = "eml-";
const HWM_FILE: &str = ".next_seq";

/// A maildir-style `MailStore`: one directory per folder, one file per
/// message, CRLF normalized to bare LF on disk and back on fetch (per the
/// `MailStore` contract in spec §6.1).
pub struct MaildirStore {
    base_dir: PathBuf,
    selected: Option<String>,
}

impl MaildirStore {
    /// Open (without creating) a store rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            selected: None,
        }
    }

    fn folder_path(&self, folder: &str) -> PathBuf {
        self.base_dir.join(folder)
    }

    fn selected_path(&self) -> StoreResult<PathBuf> {
        let folder = self
            .selected
            .as_ref()
            .ok_or_else(|| StoreError::Rejected("no folder selected".to_string()))?;
        Ok(self.folder_path(folder))
    }

    fn message_path(folder: &Path, seq: Sequence) -> PathBuf {
        folder.join("cur").join(format!("{MESSAGE_PREFIX}{seq:08x}"))
    }

    fn list_messages(folder: &Path) -> StoreResult<Vec<Sequence>> {
        let mut seqs = Vec::new();
        for sub in ["cur", "new"] {
            let dir = folder.join(sub);
            if !dir.is_dir() {
                continue;
            }
            for entry in fs::read_dir(&dir).map_err(io_err)? {
                let entry = entry.map_err(io_err)?;
                let name = entry.file_name();
                let name = name.to_string_lossy();
                if let Some(hex) = name.strip_prefix(MESSAGE_PREFIX) {
                    if let Ok(seq) = Sequence::from_str_radix(hex, 16) {
                        seqs.push(seq);
                    }
                }
            }
        }
        Ok(seqs)
    }

    fn read_hwm(folder: &Path) -> Sequence {
        fs::read_to_string(folder.join(HWM_FILE))
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0)
    }

    fn write_hwm(folder: &Path, seq: Sequence) -> StoreResult<()> {
        fs::write(folder.join(HWM_FILE), seq.to_string()).map_err(io_err)
    }
}

impl MailStore for MaildirStore {
    fn select(&mut self, folder: &str) -> StoreResult<u64> {
        let path = self.folder_path(folder);
        if !path.is_dir() {
            return Err(StoreError::NotFound(folder.to_string()));
        }
        let count = Self::list_messages(&path)?.len() as u64;
        self.selected = Some(folder.to_string());
        Ok(count)
    }

    fn create(&mut self, folder: &str) -> StoreResult<()> {
        let path = self.folder_path(folder);
        for sub in ["cur", "new", "tmp"] {
            fs::create_dir_all(path.join(sub)).map_err(io_err)?;
        }
        Ok(())
    }

    fn search_all(&mut self) -> StoreResult<Vec<Sequence>> {
        let path = self.selected_path()?;
        Self::list_messages(&path)
    }

    fn fetch(&mut self, seq: Sequence, range: Option<ByteRange>) -> StoreResult<Vec<u8>> {
        let folder = self.selected_path()?;
        let path = Self::message_path(&folder, seq);
        let stored = fs::read(&path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound(seq.to_string())
            } else {
                io_err(e)
            }
        })?;

        // Stored bytes use bare LF; re-expand to CRLF before handing back
        // to the codec, which expects wire-format line endings.
        let expanded = lf_to_crlf(&stored);

        Ok(match range {
            Some(r) => {
                let start = (r.start as usize).min(expanded.len());
                let end = (start + r.len as usize).min(expanded.len());
                expanded[start..end].to_vec()
            }
            None => expanded,
        })
    }

    fn append(&mut self, folder: &str, message: &[u8]) -> StoreResult<Sequence> {
        let path = self.folder_path(folder);
        if !path.is_dir() {
            return Err(StoreError::NotFound(folder.to_string()));
        }

        let existing_max = Self::list_messages(&path)?.into_iter().max().unwrap_or(0);
        let seq = Self::read_hwm(&path).max(existing_max) + 1;

        let on_disk = crlf_to_lf(message);
        let tmp_path = path.join("tmp").join(format!("{MESSAGE_PREFIX}{seq:08x}"));
        fs::write(&tmp_path, &on_disk).map_err(io_err)?;
        fs::rename(&tmp_path, Self::message_path(&path, seq)).map_err(io_err)?;
        Self::write_hwm(&path, seq)?;

        Ok(seq)
    }

    fn store_delete(&mut self, seqs: &[Sequence]) -> StoreResult<()> {
        let folder = self.selected_path()?;
        for &seq in seqs {
            let path = Self::message_path(&folder, seq);
            if let Err(e) = fs::remove_file(&path) {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!(seq, error = %e, "failed to remove maildir message");
                }
            }
        }
        Ok(())
    }

    fn expunge(&mut self) -> StoreResult<()> {
        // Deletion is immediate in `store_delete`; nothing left to reclaim.
        Ok(())
    }
}

fn io_err(e: io::Error) -> StoreError {
    StoreError::Io(e.to_string())
}

fn crlf_to_lf(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        if data[i] == b'\r' && data.get(i + 1) == Some(&b'\n') {
            out.push(b'\n');
            i += 2;
        } else {
            out.push(data[i]);
            i += 1;
        }
    }
    out
}

fn lf_to_crlf(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    for &byte in data {
        if byte == b'\n' {
            out.push(b'\r');
        }
        out.push(byte);
    }
    out
}

#[cfg(test)]
#[path = "maildir_tests.rs"]
mod tests;

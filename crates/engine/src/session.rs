// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The scoped `Mailfs` handle and its transactional `Session` (spec §4.F).
//!
//! `Mailfs::session` acquires a re-entrant lock, pushes a copy of the
//! current config, enables buffering, and synchronizes. The returned
//! `Session` is the caller's transaction: every file operation goes
//! through it, and dropping it synchronizes again and restores the
//! popped config — mirroring the original's `with ifap:` block.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use tracing::warn;

use mailfs_codec::{decode_object, Crypto};
use mailfs_core::store::{MailStore, Sequence};
use mailfs_core::{FileMetadata, FilePath, MailfsError, SNAPSHOT_PATH};

use crate::buffer::WriteBuffer;
use crate::config::Config;
use crate::handle::{FileHandle, Mode};
use crate::index::Index;
use crate::sync;

/// Default folder name, matching the original's `FILE_STORAGE`.
pub const DEFAULT_BASE_FOLDER: &str = "FILE_STORAGE";

/// The engine's private mutable state: store, config, index, seen set,
/// and write buffer. Lives behind a re-entrant mutex; every field is
/// `pub(crate)` so `sync` and `session` can reach into it directly and
/// let the borrow checker split mutable access field-by-field.
pub(crate) struct EngineState<S: MailStore> {
    pub(crate) store: S,
    pub(crate) base_folder: String,
    pub(crate) config: Config,
    pub(crate) config_stack: Vec<Config>,
    pub(crate) index: Index,
    pub(crate) seen: BTreeSet<Sequence>,
    pub(crate) write_buffer: WriteBuffer,
}

impl<S: MailStore> EngineState<S> {
    pub(crate) fn new(store: S, base_folder: impl Into<String>) -> Self {
        Self {
            store,
            base_folder: base_folder.into(),
            config: Config::default(),
            config_stack: Vec::new(),
            index: Index::new(),
            seen: BTreeSet::new(),
            write_buffer: WriteBuffer::new(),
        }
    }
}

/// A handle to one mailfs store. Cheap to clone (an `Arc` around the
/// re-entrant-mutex-guarded engine state); every clone shares the same
/// index, write buffer, and backing store.
pub struct Mailfs<S: MailStore> {
    inner: Arc<ReentrantMutex<RefCell<EngineState<S>>>>,
}

impl<S: MailStore> Clone for Mailfs<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: MailStore> Mailfs<S> {
    /// Open a store backed by `store`, using the default base folder.
    pub fn new(store: S) -> Self {
        Self::with_base_folder(store, DEFAULT_BASE_FOLDER)
    }

    pub fn with_base_folder(store: S, base_folder: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ReentrantMutex::new(RefCell::new(EngineState::new(
                store,
                base_folder,
            )))),
        }
    }

    /// Enter a transactional scope (spec §4.F): acquire the session lock,
    /// push a copy of the current config, enable buffering, synchronize.
    /// The lock is held for the lifetime of the returned `Session`;
    /// dropping it synchronizes again and restores the popped config.
    pub fn session(&self) -> Result<Session<'_, S>, MailfsError> {
        let guard = self.inner.lock();
        {
            let mut state = guard.borrow_mut();
            let snapshot_cfg = state.config.clone();
            state.config_stack.push(snapshot_cfg);
            state.config.buffering = true;
        }
        let session = Session { guard };
        session.synchronize(false, None, false)?;
        Ok(session)
    }

    /// Enable encryption for all future sessions, deriving a key per spec
    /// §6.3 (`url_safe_b64encode(SHA-256(key)[..32])`).
    pub fn set_encryption_key(&self, key_material: &[u8]) -> Result<(), MailfsError> {
        let crypto =
            Crypto::derive(key_material).map_err(|e| MailfsError::CryptoError(e.to_string()))?;
        self.inner.lock().borrow_mut().config.crypto = Some(Arc::new(crypto));
        Ok(())
    }

    /// Apply an ad hoc mutation to the current config (subject lines,
    /// addressing, buffering thresholds). Mutations made inside a session
    /// still revert on that session's exit, same as any other config
    /// change.
    pub fn configure(&self, f: impl FnOnce(&mut Config)) {
        f(&mut self.inner.lock().borrow_mut().config);
    }
}

/// A transactional scope over a [`Mailfs`] (spec §4.F). Every mutating or
/// reading operation on the store goes through one of these.
pub struct Session<'m, S: MailStore> {
    guard: ReentrantMutexGuard<'m, RefCell<EngineState<S>>>,
}

impl<'m, S: MailStore> Session<'m, S> {
    /// Run the synchronization protocol (spec §4.D) directly.
    pub fn synchronize(
        &self,
        cleanup: bool,
        snapshot: Option<bool>,
        ignore_snapshot: bool,
    ) -> Result<(), MailfsError> {
        let mut state = self.guard.borrow_mut();
        sync::synchronize(&mut state, cleanup, snapshot, ignore_snapshot)
    }

    /// Force a flush of every buffered write regardless of policy.
    pub fn flush(&self) -> Result<bool, MailfsError> {
        let mut state = self.guard.borrow_mut();
        let cfg = sync::encode_config(&state.config);
        state
            .write_buffer
            .flush(&mut state.store, &state.base_folder, &cfg)
    }

    /// Open a file, resolving its initial contents per spec §4.G.
    pub fn open(
        &self,
        path: impl Into<FilePath>,
        mode: Mode,
        version: Option<Sequence>,
    ) -> Result<FileHandle, MailfsError> {
        let path = path.into();
        let mut state = self.guard.borrow_mut();

        if let Some(pending) = state.write_buffer.peek(path.as_str()) {
            return Ok(FileHandle::new(
                path.as_str().to_string(),
                mode,
                pending.metadata.clone(),
                pending.payload.clone(),
            ));
        }

        match fetch_file(&mut state, path.as_str(), version) {
            Ok((mut metadata, _payload)) if metadata.is_deleted() => {
                if mode.is_writable() {
                    metadata.set_deleted(false);
                    Ok(FileHandle::new(
                        path.as_str().to_string(),
                        mode,
                        metadata,
                        Vec::new(),
                    ))
                } else {
                    Err(MailfsError::NotFound(path.to_string()))
                }
            }
            Ok((metadata, payload)) => {
                let contents = if mode.preserves_contents() { payload } else { Vec::new() };
                Ok(FileHandle::new(path.as_str().to_string(), mode, metadata, contents))
            }
            Err(MailfsError::NotFound(_)) if mode.is_writable() => Ok(FileHandle::new(
                path.as_str().to_string(),
                mode,
                FileMetadata::new(),
                Vec::new(),
            )),
            Err(e) => Err(e),
        }
    }

    /// Commit a handle: writable handles stamp `ts` and land in the write
    /// buffer (which then honors flush policy); read-only handles are
    /// simply discarded. Bytes are copied out of the handle here, not
    /// retained as a live reference, so a caller holding a stale handle
    /// past close cannot leak buffer state (spec §9 Design Notes).
    pub fn close(&self, handle: FileHandle) -> Result<(), MailfsError> {
        if !handle.mode().is_writable() {
            return Ok(());
        }
        let path = handle.path().to_string();
        let mut metadata = handle.metadata().clone();
        metadata.set_ts(current_unix_time());
        let payload = handle.into_contents();

        let mut state = self.guard.borrow_mut();
        state.write_buffer.stage(path, payload, metadata);
        maybe_flush(&mut state)
    }

    /// Remove a path (spec §8 scenario 6). Mirrors the original's
    /// `Mailfile.remove()`: a path retained beyond its latest version
    /// (`metadata.versions > 1`) gets a tombstone, preserving history until
    /// a future write clears the flag; a path at the default retention of
    /// one version is erased outright via `store_delete`/`expunge`, since a
    /// tombstone there would just become the sole "latest" version the very
    /// next cleanup keeps forever.
    pub fn remove(&self, path: impl Into<FilePath>) -> Result<(), MailfsError> {
        let path = path.into();
        let metadata = {
            let mut state = self.guard.borrow_mut();
            match fetch_file(&mut state, path.as_str(), None) {
                Ok((m, _)) => m,
                Err(MailfsError::NotFound(_)) => FileMetadata::new(),
                Err(e) => return Err(e),
            }
        };

        if metadata.versions_wanted() > 1 {
            let mut metadata = metadata;
            metadata.set_deleted(true);
            metadata.set_ts(current_unix_time());

            {
                let mut state = self.guard.borrow_mut();
                state.write_buffer.stage(path.as_str().to_string(), Vec::new(), metadata);
                maybe_flush(&mut state)?;
            }
        } else {
            let mut state = self.guard.borrow_mut();
            let to_delete: Vec<Sequence> = state
                .index
                .get(path.as_str())
                .map(|e| e.versions.iter().copied().collect())
                .unwrap_or_default();
            if !to_delete.is_empty() {
                state
                    .store
                    .store_delete(&to_delete)
                    .map_err(|e| sync::store_err_to_mailfs(&state.base_folder, e))?;
                state
                    .store
                    .expunge()
                    .map_err(|e| sync::store_err_to_mailfs(&state.base_folder, e))?;
                for seq in &to_delete {
                    state.seen.remove(seq);
                }
            }
            state.index.remove(path.as_str());
        }

        // The original's `Mailfile.remove()` always ends with a forced
        // `synchronize()`, not just a policy-gated flush: a bare flush only
        // appends the tombstone, it never re-runs the reverse scan that
        // updates the Index, so a read within the same session would still
        // see the pre-delete entry (spec §8 scenario 6).
        self.synchronize(true, Some(true), false)
    }

    /// Sequences retained for `path`, in ascending order.
    pub fn versions(&self, path: &str) -> Vec<Sequence> {
        let state = self.guard.borrow();
        state
            .index
            .get(path)
            .map(|e| e.versions.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Live, non-tombstoned paths directly or transitively under `prefix`
    /// (directory listing derived by prefix, spec §3).
    pub fn ls(&self, prefix: &str) -> Vec<String> {
        let state = self.guard.borrow();
        state
            .index
            .listing(prefix)
            .into_iter()
            .filter(|p| p != SNAPSHOT_PATH)
            .filter(|p| {
                state
                    .index
                    .get(p)
                    .map(|e| !e.metadata.is_deleted())
                    .unwrap_or(false)
            })
            .collect()
    }
}

impl<'m, S: MailStore> Drop for Session<'m, S> {
    fn drop(&mut self) {
        if let Err(e) = self.synchronize(false, None, false) {
            warn!(error = %e, "synchronize on session exit failed");
        }
        let mut state = self.guard.borrow_mut();
        if let Some(cfg) = state.config_stack.pop() {
            state.config = cfg;
        }
    }
}

fn maybe_flush<S: MailStore>(state: &mut EngineState<S>) -> Result<(), MailfsError> {
    if !state.config.buffering || state.write_buffer.bytes() > state.config.buffering_max_bytes {
        let cfg = sync::encode_config(&state.config);
        state.write_buffer.flush(&mut state.store, &state.base_folder, &cfg)?;
    }
    Ok(())
}

/// Fetch a path's current contents from the index + backing store,
/// honoring an explicit version request (spec §4.G step 2, §7
/// VersionConflict).
fn fetch_file<S: MailStore>(
    state: &mut EngineState<S>,
    path: &str,
    version: Option<Sequence>,
) -> Result<(FileMetadata, Vec<u8>), MailfsError> {
    let entry = state
        .index
        .get(path)
        .ok_or_else(|| MailfsError::NotFound(path.to_string()))?;
    let seq = match version {
        Some(v) if entry.versions.contains(&v) => v,
        Some(v) => {
            return Err(MailfsError::VersionConflict {
                path: path.to_string(),
                version: v,
            })
        }
        None => entry.latest_seq,
    };

    let crypto = state.config.crypto.clone();
    let raw = state
        .store
        .fetch(seq, None)
        .map_err(|e| sync::store_err_to_mailfs(&state.base_folder, e))?;
    let (mut metadata, payload) =
        decode_object(&raw, crypto.as_deref()).map_err(|e| MailfsError::DecodeError(e.to_string()))?;

    if let Some(found) = metadata.fn_path() {
        if found != path {
            return Err(MailfsError::IntegrityError {
                expected: path.to_string(),
                found: found.to_string(),
            });
        }
    }
    metadata.strip_internal();
    Ok((metadata, payload))
}

fn current_unix_time() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The reverse-scan synchronization protocol (spec §4.D): brings the
//! Index into agreement with the backing store, optionally garbage
//! collects obsolete versions, and optionally writes a snapshot.

use std::collections::BTreeSet;

use mailfs_codec::{decode_headers, decode_object, encode_object, EncodeConfig};
use mailfs_core::store::{ByteRange, MailStore, Sequence, StoreError};
use mailfs_core::{FilePath, MailfsError, SNAPSHOT_PATH};
use tracing::warn;

use crate::config::Config;
use crate::index::Index;
use crate::session::EngineState;
use crate::snapshot;

/// Distance above which a sync automatically writes a snapshot, absent an
/// explicit override (spec §4.D step 7).
const SNAPSHOT_DISTANCE_THRESHOLD: u64 = 20;
const PEEK_BYTES: u64 = 1024;

pub fn synchronize<S: MailStore>(
    state: &mut EngineState<S>,
    cleanup: bool,
    snapshot_request: Option<bool>,
    ignore_snapshot: bool,
) -> Result<(), MailfsError> {
    flush_pending(state)?;
    select_or_create_folder(state)?;

    let mut existing = state
        .store
        .search_all()
        .map_err(|e| store_err_to_mailfs(&state.base_folder, e))?;
    existing.sort_unstable();
    let existing_set: BTreeSet<Sequence> = existing.iter().copied().collect();

    let distance = reverse_scan(state, &existing, &existing_set, ignore_snapshot);

    if cleanup {
        run_cleanup(state, &existing_set)?;
    }

    state.seen.retain(|s| existing_set.contains(s));

    let should_snapshot =
        snapshot_request == Some(true) || (snapshot_request != Some(false) && distance > SNAPSHOT_DISTANCE_THRESHOLD);
    if should_snapshot {
        save_snapshot(state)?;
    }

    Ok(())
}

fn flush_pending<S: MailStore>(state: &mut EngineState<S>) -> Result<(), MailfsError> {
    let cfg = encode_config(&state.config);
    state
        .write_buffer
        .flush(&mut state.store, &state.base_folder, &cfg)?;
    Ok(())
}

fn select_or_create_folder<S: MailStore>(state: &mut EngineState<S>) -> Result<(), MailfsError> {
    match state.store.select(&state.base_folder) {
        Ok(_) => Ok(()),
        Err(StoreError::NotFound(_)) => {
            state
                .store
                .create(&state.base_folder)
                .map_err(|e| store_err_to_mailfs(&state.base_folder, e))?;
            state
                .store
                .select(&state.base_folder)
                .map(|_| ())
                .map_err(|_| MailfsError::StorageUnavailable(state.base_folder.clone()))
        }
        Err(e) => Err(store_err_to_mailfs(&state.base_folder, e)),
    }
}

/// Reverse scan per spec §4.D step 4. Returns the number of previously
/// unseen messages examined ("distance").
fn reverse_scan<S: MailStore>(
    state: &mut EngineState<S>,
    existing: &[Sequence],
    existing_set: &BTreeSet<Sequence>,
    ignore_snapshot: bool,
) -> u64 {
    let mut distance = 0u64;

    for &seq in existing.iter().rev() {
        if state.seen.contains(&seq) {
            break;
        }

        let peek = match state.store.fetch(seq, Some(ByteRange::new(0, PEEK_BYTES))) {
            Ok(bytes) => bytes,
            Err(_) => continue,
        };

        let crypto = state.config.crypto.as_deref();
        let metadata = match decode_headers(&peek, crypto) {
            Ok(m) => m,
            Err(_) => continue,
        };

        state.seen.insert(seq);
        distance += 1;

        let Some(file_path) = metadata.fn_path().map(str::to_string) else {
            continue;
        };
        let mut metadata = metadata;
        metadata.strip_internal();

        let advanced = state.index.observe(&file_path, seq, metadata);
        if advanced && file_path == SNAPSHOT_PATH && !ignore_snapshot {
            ingest_at(state, seq, existing_set);
        }
    }

    distance
}

fn ingest_at<S: MailStore>(state: &mut EngineState<S>, seq: Sequence, existing_set: &BTreeSet<Sequence>) {
    let crypto = state.config.crypto.as_deref();
    let full = match state.store.fetch(seq, None) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(seq, error = %e, "failed to fetch snapshot body");
            return;
        }
    };
    let (_, payload) = match decode_object(&full, crypto) {
        Ok(v) => v,
        Err(e) => {
            warn!(seq, error = %e, "corrupt snapshot envelope, skipping");
            return;
        }
    };
    let parsed = match snapshot::deserialize(&payload) {
        Ok(p) => p,
        Err(e) => {
            warn!(seq, error = %e, "corrupt snapshot payload, skipping");
            return;
        }
    };

    ingest_snapshot(&mut state.index, &mut state.seen, parsed, existing_set);
}

/// Merge a decoded snapshot into `index`/`seen` per spec §4.D "Snapshot
/// ingest".
fn ingest_snapshot(
    index: &mut Index,
    seen: &mut BTreeSet<Sequence>,
    parsed: snapshot::ParsedSnapshot,
    existing_set: &BTreeSet<Sequence>,
) {
    for (path, seq, mut metadata, versions) in parsed.tree {
        if !existing_set.contains(&seq) {
            continue;
        }
        metadata.strip_internal();
        let mut kept_versions: BTreeSet<Sequence> = versions
            .into_iter()
            .filter(|v| existing_set.contains(v))
            .collect();
        kept_versions.insert(seq);

        let should_replace = match index.get(&path) {
            Some(entry) => {
                kept_versions.extend(entry.versions.iter().filter(|v| existing_set.contains(v)));
                seq > entry.latest_seq
            }
            None => true,
        };

        if should_replace {
            index.insert(
                path,
                crate::index::IndexEntry {
                    latest_seq: seq,
                    metadata,
                    versions: kept_versions,
                },
            );
        } else if let Some(entry) = index.get(&path) {
            let mut merged = entry.versions.clone();
            merged.extend(kept_versions);
            let latest_seq = entry.latest_seq;
            let metadata = entry.metadata.clone();
            index.insert(
                path,
                crate::index::IndexEntry {
                    latest_seq,
                    metadata,
                    versions: merged,
                },
            );
        }
    }

    seen.extend(parsed.seen.into_iter().filter(|s| existing_set.contains(s)));
}

/// Retention/GC pass per spec §4.D step 5.
fn run_cleanup<S: MailStore>(state: &mut EngineState<S>, existing_set: &BTreeSet<Sequence>) -> Result<(), MailfsError> {
    let mut keeping: BTreeSet<Sequence> = BTreeSet::new();
    let paths: Vec<String> = state.index.paths().cloned().collect();

    for path in paths {
        let Some(entry) = state.index.get(&path) else {
            continue;
        };
        let wanted = entry.metadata.versions_wanted();
        let mut versions = entry.versions.clone();
        versions.insert(entry.latest_seq);

        let keeping_versions: BTreeSet<Sequence> = versions
            .iter()
            .rev()
            .take(wanted)
            .copied()
            .filter(|v| existing_set.contains(v))
            .collect();

        if keeping_versions.is_empty() {
            state.index.remove(&path);
            continue;
        }

        keeping.extend(keeping_versions.iter().copied());
        let latest_seq = *keeping_versions
            .iter()
            .max()
            .unwrap_or(&entry.latest_seq);
        let metadata = entry.metadata.clone();
        state.index.insert(
            path,
            crate::index::IndexEntry {
                latest_seq,
                metadata,
                versions: keeping_versions,
            },
        );
    }

    let to_delete: Vec<Sequence> = state.seen.difference(&keeping).copied().collect();
    if !to_delete.is_empty() {
        let deleted = state.store.store_delete(&to_delete);
        match deleted {
            Ok(()) => {
                if let Err(e) = state.store.expunge() {
                    warn!(error = %e, "expunge failed, will retry on next cleanup");
                } else {
                    for seq in &to_delete {
                        state.seen.remove(seq);
                    }
                }
            }
            Err(e) => warn!(error = %e, "store_delete failed, will retry on next cleanup"),
        }
    }

    Ok(())
}

pub fn save_snapshot<S: MailStore>(state: &mut EngineState<S>) -> Result<(), MailfsError> {
    let blob = snapshot::serialize(&state.index, &state.seen)
        .map_err(|e| MailfsError::DecodeError(e.to_string()))?;
    let path = FilePath::new(SNAPSHOT_PATH);
    let mut metadata = mailfs_core::FileMetadata::new();
    metadata.canonicalize(path.as_str(), blob.len());

    let cfg = encode_config(&state.config);
    let encoded = encode_object(&path, &blob, metadata, &cfg)
        .map_err(|e| MailfsError::DecodeError(e.to_string()))?;
    state
        .store
        .append(&state.base_folder, &encoded)
        .map_err(|e| store_err_to_mailfs(&state.base_folder, e))?;
    Ok(())
}

/// Build an [`EncodeConfig`] borrowing only the `config` field, so callers
/// can hold it alongside disjoint `&mut` borrows of other `EngineState`
/// fields (e.g. `write_buffer`, `store`) in the same statement.
pub fn encode_config(config: &Config) -> EncodeConfig<'_> {
    EncodeConfig {
        subject: &config.subject,
        email_to: &config.email_to,
        email_from: &config.email_from,
        crypto: config.crypto.as_deref(),
    }
}

pub fn store_err_to_mailfs(folder: &str, e: StoreError) -> MailfsError {
    match e {
        StoreError::NotFound(_) => MailfsError::StorageUnavailable(folder.to_string()),
        StoreError::Io(msg) => MailfsError::StorageUnavailable(format!("{folder}: {msg}")),
        StoreError::Rejected(msg) => MailfsError::WriteRejected(msg),
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;

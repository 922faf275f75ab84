// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::session::EngineState;
use mailfs_codec::EncodeConfig;
use mailfs_core::store::{ByteRange, StoreError, StoreResult};
use mailfs_core::FileMetadata;
use std::collections::BTreeMap;

/// An in-memory store, enough to exercise reverse-scan/cleanup/snapshot
/// logic without touching disk.
#[derive(Default)]
struct FakeStore {
    messages: BTreeMap<Sequence, Vec<u8>>,
    next_seq: Sequence,
    folder_exists: bool,
}

impl MailStore for FakeStore {
    fn select(&mut self, _folder: &str) -> StoreResult<u64> {
        if self.folder_exists {
            Ok(self.messages.len() as u64)
        } else {
            Err(StoreError::NotFound(_folder.to_string()))
        }
    }
    fn create(&mut self, _folder: &str) -> StoreResult<()> {
        self.folder_exists = true;
        Ok(())
    }
    fn search_all(&mut self) -> StoreResult<Vec<Sequence>> {
        Ok(self.messages.keys().copied().collect())
    }
    fn fetch(&mut self, seq: Sequence, range: Option<ByteRange>) -> StoreResult<Vec<u8>> {
        let data = self
            .messages
            .get(&seq)
            .ok_or_else(|| StoreError::NotFound(seq.to_string()))?;
        Ok(match range {
            Some(r) => {
                let start = (r.start as usize).min(data.len());
                let end = (start + r.len as usize).min(data.len());
                data[start..end].to_vec()
            }
            None => data.clone(),
        })
    }
    fn append(&mut self, _folder: &str, message: &[u8]) -> StoreResult<Sequence> {
        self.next_seq += 1;
        self.messages.insert(self.next_seq, message.to_vec());
        Ok(self.next_seq)
    }
    fn store_delete(&mut self, seqs: &[Sequence]) -> StoreResult<()> {
        for s in seqs {
            self.messages.remove(s);
        }
        Ok(())
    }
    fn expunge(&mut self) -> StoreResult<()> {
        Ok(())
    }
}

fn state_with(store: FakeStore) -> EngineState<FakeStore> {
    EngineState::new(store, "FILE_STORAGE")
}

fn cfg(state: &EngineState<FakeStore>) -> EncodeConfig<'_> {
    encode_config(&state.config)
}

fn write_direct(state: &mut EngineState<FakeStore>, path: &str, payload: &[u8], versions: Option<u64>) -> Sequence {
    let fpath = FilePath::new(path);
    let mut metadata = FileMetadata::new();
    if let Some(v) = versions {
        metadata.as_map_mut().insert("versions".to_string(), v.into());
    }
    let encoded = {
        let c = cfg(state);
        mailfs_codec::encode_object(&fpath, payload, metadata, &c).unwrap()
    };
    state.store.append(&state.base_folder, &encoded).unwrap()
}

#[test]
fn reverse_scan_stops_at_seen_boundary() {
    let mut state = state_with(FakeStore {
        folder_exists: true,
        ..Default::default()
    });
    write_direct(&mut state, "a", b"1", None);
    write_direct(&mut state, "a", b"2", None);

    synchronize(&mut state, false, Some(false), false).unwrap();
    assert_eq!(state.seen.len(), 2);

    // A third write, then re-sync: only the new message should be
    // examined, since the first two are already in `seen`.
    write_direct(&mut state, "a", b"3", None);
    synchronize(&mut state, false, Some(false), false).unwrap();
    assert_eq!(state.seen.len(), 3);
    assert_eq!(state.index.get("a").unwrap().versions.len(), 3);
}

#[test]
fn tie_break_keeps_highest_sequence() {
    let mut state = state_with(FakeStore {
        folder_exists: true,
        ..Default::default()
    });
    write_direct(&mut state, "p", b"first", None);
    let winner = write_direct(&mut state, "p", b"second", None);

    synchronize(&mut state, false, Some(false), false).unwrap();
    let entry = state.index.get("p").unwrap();
    assert_eq!(entry.latest_seq, winner);
    assert_eq!(entry.versions.len(), 2);
}

#[test]
fn cleanup_retains_only_wanted_version_count() {
    let mut state = state_with(FakeStore {
        folder_exists: true,
        ..Default::default()
    });
    write_direct(&mut state, "f", b"v1", Some(2));
    write_direct(&mut state, "f", b"v2", Some(2));
    let v3 = write_direct(&mut state, "f", b"v3", Some(2));

    synchronize(&mut state, true, Some(false), false).unwrap();
    let entry = state.index.get("f").unwrap();
    assert_eq!(entry.versions.len(), 2);
    assert_eq!(entry.latest_seq, v3);
    assert!(entry.versions.contains(&v3));
}

#[test]
fn cleanup_removes_entry_when_no_versions_survive() {
    // metadata.versions = 0 degrades to 1 (min clamp in FileMetadata), so
    // exercise the "entry vanishes" path via an empty existing set
    // instead: simulate a path whose sole version was externally deleted.
    let mut state = state_with(FakeStore {
        folder_exists: true,
        ..Default::default()
    });
    let seq = write_direct(&mut state, "gone", b"x", None);
    synchronize(&mut state, false, Some(false), false).unwrap();
    assert!(state.index.contains("gone"));

    state.store.messages.remove(&seq);
    synchronize(&mut state, true, Some(false), false).unwrap();
    assert!(!state.index.contains("gone"));
}

#[test]
fn snapshot_round_trips_through_store() {
    let mut state = state_with(FakeStore {
        folder_exists: true,
        ..Default::default()
    });
    for i in 0..5 {
        write_direct(&mut state, &format!("f{i}"), b"data", None);
    }
    synchronize(&mut state, false, Some(true), false).unwrap();

    let mut fresh = state_with(FakeStore {
        messages: state.store.messages.clone(),
        next_seq: state.store.next_seq,
        folder_exists: true,
    });
    synchronize(&mut fresh, false, None, false).unwrap();
    assert_eq!(fresh.index.len(), 6); // 5 files + the snapshot object itself
    for i in 0..5 {
        assert!(fresh.index.contains(&format!("f{i}")));
    }
}

#[test]
fn distance_above_threshold_triggers_automatic_snapshot() {
    let mut state = state_with(FakeStore {
        folder_exists: true,
        ..Default::default()
    });
    for i in 0..25 {
        write_direct(&mut state, &format!("f{i}"), b"x", None);
    }
    synchronize(&mut state, false, None, false).unwrap();

    let snapshot_count = state
        .store
        .messages
        .values()
        .filter(|raw| {
            let meta = mailfs_codec::decode_headers(raw, None).unwrap();
            meta.fn_path() == Some(mailfs_core::SNAPSHOT_PATH)
        })
        .count();
    assert_eq!(snapshot_count, 1);
}

#[test]
fn broken_message_is_skipped_not_fatal() {
    let mut state = state_with(FakeStore {
        folder_exists: true,
        ..Default::default()
    });
    write_direct(&mut state, "ok", b"good", None);
    state.store.next_seq += 1;
    state
        .store
        .messages
        .insert(state.store.next_seq, b"not a valid envelope at all".to_vec());

    // Must not error out; the broken message is simply skipped.
    synchronize(&mut state, false, Some(false), false).unwrap();
    assert!(state.index.contains("ok"));
}

#[test]
fn select_missing_folder_is_created_then_selected() {
    let mut state = state_with(FakeStore::default());
    assert!(!state.store.folder_exists);
    synchronize(&mut state, false, Some(false), false).unwrap();
    assert!(state.store.folder_exists);
}

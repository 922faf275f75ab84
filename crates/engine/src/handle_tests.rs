// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn write_mode_starts_empty_and_accumulates() {
    let mut h = FileHandle::new("a".to_string(), Mode::Write, FileMetadata::new(), Vec::new());
    h.write(b"hello").unwrap();
    assert_eq!(h.getvalue(), b"hello");
}

#[test]
fn append_mode_seeks_to_end_of_existing_contents() {
    let mut h = FileHandle::new(
        "a".to_string(),
        Mode::Append,
        FileMetadata::new(),
        b"hello".to_vec(),
    );
    h.write(b" world").unwrap();
    assert_eq!(h.getvalue(), b"hello world");
}

#[test]
fn read_mode_reads_existing_contents_from_start() {
    let mut h = FileHandle::new(
        "a".to_string(),
        Mode::Read,
        FileMetadata::new(),
        b"hello".to_vec(),
    );
    assert_eq!(h.read_to_end().unwrap(), b"hello");
}

#[test]
fn seek_and_tell_roundtrip() {
    let mut h = FileHandle::new(
        "a".to_string(),
        Mode::ReadWrite,
        FileMetadata::new(),
        b"hello".to_vec(),
    );
    h.seek(SeekFrom::Start(2)).unwrap();
    assert_eq!(h.tell(), 2);
    let mut buf = [0u8; 3];
    h.read(&mut buf).unwrap();
    assert_eq!(&buf, b"llo");
}

#[test]
fn truncate_shrinks_contents_and_clamps_position() {
    let mut h = FileHandle::new(
        "a".to_string(),
        Mode::ReadWrite,
        FileMetadata::new(),
        b"hello world".to_vec(),
    );
    h.seek(SeekFrom::Start(10)).unwrap();
    h.truncate(5);
    assert_eq!(h.getvalue(), b"hello");
    assert_eq!(h.tell(), 5);
}

#[test]
fn is_writable_distinguishes_read_from_other_modes() {
    assert!(!Mode::Read.is_writable());
    assert!(Mode::Write.is_writable());
    assert!(Mode::Append.is_writable());
    assert!(Mode::ReadWrite.is_writable());
}

#[yare::parameterized(
    read       = { "r",     Some(Mode::Read) },
    write      = { "w",     Some(Mode::Write) },
    write_plus = { "w+",    Some(Mode::Write) },
    append     = { "a",     Some(Mode::Append) },
    read_plus  = { "r+",    Some(Mode::ReadWrite) },
    unknown    = { "bogus", None },
)]
fn parse_collapses_plus_into_write_only_for_w(raw: &str, want: Option<Mode>) {
    assert_eq!(Mode::parse(raw), want);
}

#[test]
fn preserves_contents_is_false_only_for_write() {
    assert!(Mode::Read.preserves_contents());
    assert!(!Mode::Write.preserves_contents());
    assert!(Mode::Append.preserves_contents());
    assert!(Mode::ReadWrite.preserves_contents());
}

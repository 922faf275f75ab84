// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use tempfile::tempdir;

/// Drives the full `login -> put -> get -> ls -> versions -> rm -> sync ->
/// logout` command sequence against scratch directories. `#[serial]`
/// because `login`/`logout` mutate the process-wide `$HOME`.
#[test]
#[serial]
fn full_command_lifecycle() {
    let home = tempdir().unwrap();
    std::env::set_var("HOME", home.path());
    let backend = tempdir().unwrap();
    let scratch = tempdir().unwrap();

    login(backend.path().to_path_buf(), "FILE_STORAGE".to_string(), None).unwrap();

    let local = scratch.path().join("a.txt");
    fs::write(&local, b"hello from the cli").unwrap();
    put(&local, "notes/a.txt").unwrap();

    let got = scratch.path().join("out.txt");
    get("notes/a.txt", &got, None).unwrap();
    assert_eq!(fs::read(&got).unwrap(), b"hello from the cli");

    {
        let mailfs = open_mailfs().unwrap();
        let session = mailfs.session().unwrap();
        assert_eq!(session.ls(""), vec!["notes/a.txt".to_string()]);
        assert_eq!(session.versions("notes/a.txt").len(), 1);
    }

    rm("notes/a.txt", false).unwrap();
    {
        let mailfs = open_mailfs().unwrap();
        let session = mailfs.session().unwrap();
        assert!(session.ls("").is_empty());
        // Default retention (versions_wanted() == 1) is erased outright by
        // `remove`, not tombstoned: no version history survives.
        assert!(session.versions("notes/a.txt").is_empty());
    }

    sync(true, true).unwrap();

    assert!(versions("does/not/exist", None).is_err());

    logout().unwrap();
    assert!(open_mailfs().is_err());
}

/// `versions --set` is the only CLI path that can raise a file's retention
/// above the default of one; confirm it actually changes `remove`'s
/// behavior from an outright erase to a tombstone that keeps history.
#[test]
#[serial]
fn versions_set_raises_retention_so_remove_tombstones() {
    let home = tempdir().unwrap();
    std::env::set_var("HOME", home.path());
    let backend = tempdir().unwrap();
    let scratch = tempdir().unwrap();

    login(backend.path().to_path_buf(), "FILE_STORAGE".to_string(), None).unwrap();

    let local = scratch.path().join("a.txt");
    fs::write(&local, b"v1").unwrap();
    put(&local, "keep/me.txt").unwrap();

    versions("keep/me.txt", Some(3)).unwrap();

    fs::write(&local, b"v2").unwrap();
    put(&local, "keep/me.txt").unwrap();

    rm("keep/me.txt", false).unwrap();
    {
        let mailfs = open_mailfs().unwrap();
        let session = mailfs.session().unwrap();
        assert!(session.ls("").is_empty());
        assert!(!session.versions("keep/me.txt").is_empty());
    }

    logout().unwrap();
}

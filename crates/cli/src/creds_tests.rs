// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use tempfile::tempdir;

/// Exercises save -> load -> logout -> load against a scratch `$HOME`.
/// `#[serial]` because every test in this module mutates the process-wide
/// `$HOME` environment variable.
#[test]
#[serial]
fn save_load_and_logout_round_trip() {
    let home = tempdir().unwrap();
    std::env::set_var("HOME", home.path());

    assert!(matches!(load(), Err(CredsError::NotLoggedIn)));

    let creds = Credentials {
        backend: PathBuf::from("/var/mailfs/store"),
        mailbox: "FILE_STORAGE".to_string(),
        key: Some("correct horse battery staple".to_string()),
    };
    save(&creds).unwrap();

    let path = login_file().unwrap();
    assert!(path.exists());
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    let loaded = load().unwrap();
    assert_eq!(loaded.backend, creds.backend);
    assert_eq!(loaded.mailbox, creds.mailbox);
    assert_eq!(loaded.key, creds.key);

    logout().unwrap();
    assert!(!path.exists());
    assert!(matches!(load(), Err(CredsError::NotLoggedIn)));
    assert!(matches!(logout(), Err(CredsError::NotLoggedIn)));
}

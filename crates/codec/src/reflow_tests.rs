// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn preserve_mode_just_indents_single_line() {
    let out = reflow("QUJD", " ", 78, true);
    assert_eq!(out, " QUJD");
}

#[test]
fn wrap_mode_breaks_at_effective_width() {
    let data = "a".repeat(10);
    let out = reflow(&data, " ", 5, false);
    // effective width is 5 - 1 = 4
    assert_eq!(out, " aaaa\r\n aaaa\r\n aa");
}

#[test]
fn wrap_mode_strips_whitespace_before_wrapping() {
    let out = reflow("ab cd\nef", "", 4, false);
    assert_eq!(out, "abcd\r\nef");
}

#[test]
fn compact_recovers_wrapped_blob() {
    let original = "abcdefghij";
    let wrapped = reflow(original, " ", 5, false);
    assert_eq!(compact(&wrapped), original);
}

#[test]
fn compact_recovers_preserved_blob() {
    let original = "QUJDREVG";
    let preserved = reflow(original, " ", 78, true);
    assert_eq!(compact(&preserved), original);
}

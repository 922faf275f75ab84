// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn round_trips_through_derived_key() {
    let crypto = Crypto::derive(b"hello world").unwrap();
    let token = crypto.encrypt(b"secret");
    assert_eq!(crypto.decrypt(&token).unwrap(), b"secret");
}

#[test]
fn wrong_key_fails_to_decrypt() {
    let a = Crypto::derive(b"key-a").unwrap();
    let b = Crypto::derive(b"key-b").unwrap();
    let token = a.encrypt(b"secret");
    assert!(b.decrypt(&token).is_err());
}

#[test]
fn different_key_material_derives_different_keys() {
    let a = Crypto::derive(b"one").unwrap();
    let b = Crypto::derive(b"two").unwrap();
    let token = a.encrypt(b"payload");
    assert!(b.decrypt(&token).is_err());
}

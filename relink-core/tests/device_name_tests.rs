// SPDX-FileCopyrightText: 2026 Relink Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Device name codec integration tests: round trips, non-determinism
//! across calls, and tamper sensitivity.

use proptest::prelude::*;

use relink_core::{DeviceNameCodec, DeviceNameRecord, KeyPair, ProvisionError};

/// Record layout offsets in serialized form.
const IV_REGION: std::ops::Range<usize> = 0..16;
const CIPHERTEXT_START: usize = 16 + 33;

#[test]
fn test_scenario_device_name_roundtrip() {
    let identity = KeyPair::generate();

    let record = DeviceNameCodec::encrypt("Sarah's iPhone".as_bytes(), &identity.public).unwrap();
    let decrypted = DeviceNameCodec::decrypt(&record, &identity.private).unwrap();

    assert_eq!(decrypted, "Sarah's iPhone".as_bytes());
}

#[test]
fn test_empty_name_roundtrip() {
    let identity = KeyPair::generate();

    let record = DeviceNameCodec::encrypt(b"", &identity.public).unwrap();
    let decrypted = DeviceNameCodec::decrypt(&record, &identity.private).unwrap();

    assert!(decrypted.is_empty());
}

#[test]
fn test_multibyte_unicode_roundtrip() {
    let identity = KeyPair::generate();
    let name = "übergerät 📱 デバイス";

    let record = DeviceNameCodec::encrypt(name.as_bytes(), &identity.public).unwrap();
    let decrypted = DeviceNameCodec::decrypt(&record, &identity.private).unwrap();

    assert_eq!(String::from_utf8(decrypted).unwrap(), name);
}

#[test]
fn test_encrypting_twice_yields_different_records() {
    let identity = KeyPair::generate();

    let a = DeviceNameCodec::encrypt(b"Family Tablet", &identity.public).unwrap();
    let b = DeviceNameCodec::encrypt(b"Family Tablet", &identity.public).unwrap();

    // Fresh ephemeral per call; the synthetic IV depends on the master
    // secret, so it differs too.
    assert_ne!(a.ephemeral_public(), b.ephemeral_public());
    assert_ne!(a.synthetic_iv(), b.synthetic_iv());
    assert_ne!(a.ciphertext(), b.ciphertext());
}

#[test]
fn test_tampering_any_ciphertext_byte_fails_integrity() {
    let identity = KeyPair::generate();
    let record = DeviceNameCodec::encrypt(b"Office Desktop", &identity.public).unwrap();
    let wire = record.to_bytes();

    for index in CIPHERTEXT_START..wire.len() {
        let mut corrupted = wire.clone();
        corrupted[index] ^= 0x01;

        let tampered = DeviceNameRecord::from_bytes(&corrupted).unwrap();
        assert!(
            matches!(
                DeviceNameCodec::decrypt(&tampered, &identity.private),
                Err(ProvisionError::IntegrityError)
            ),
            "ciphertext byte {index} tampering must fail integrity"
        );
    }
}

#[test]
fn test_tampering_any_synthetic_iv_byte_fails_integrity() {
    let identity = KeyPair::generate();
    let record = DeviceNameCodec::encrypt(b"Office Desktop", &identity.public).unwrap();
    let wire = record.to_bytes();

    for index in IV_REGION {
        let mut corrupted = wire.clone();
        corrupted[index] ^= 0x01;

        let tampered = DeviceNameRecord::from_bytes(&corrupted).unwrap();
        assert!(
            matches!(
                DeviceNameCodec::decrypt(&tampered, &identity.private),
                Err(ProvisionError::IntegrityError)
            ),
            "synthetic IV byte {index} tampering must fail integrity"
        );
    }
}

proptest! {
    #[test]
    fn prop_roundtrip_any_name(name in ".*") {
        let identity = KeyPair::generate();

        let record = DeviceNameCodec::encrypt(name.as_bytes(), &identity.public).unwrap();
        let decrypted = DeviceNameCodec::decrypt(&record, &identity.private).unwrap();

        prop_assert_eq!(decrypted, name.as_bytes());
    }
}

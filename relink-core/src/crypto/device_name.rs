// SPDX-FileCopyrightText: 2026 Relink Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Device Name Codec
//!
//! Deterministic authenticated encryption for a device's display name. The
//! 16-byte synthetic IV is an HMAC over the plaintext under a key derived
//! from the ECDH master secret, so it doubles as the integrity tag: the
//! recipient re-derives it from the decrypted candidate and compares in
//! constant time. No random nonce travels with the record; freshness comes
//! from the per-call ephemeral key pair.

use aes::cipher::{KeyIvInit, StreamCipher};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use super::keys::{KeyPair, PrivateKey, PublicKey, PUBLIC_KEY_SERIALIZED_LEN};
use crate::error::ProvisionError;

type Aes256Ctr = ctr::Ctr128BE<aes::Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// Synthetic IV length in bytes.
const SYNTHETIC_IV_LEN: usize = 16;

/// Derivation label for the authentication key.
const AUTH_LABEL: &[u8] = b"auth";
/// Derivation label for the cipher key root.
const CIPHER_LABEL: &[u8] = b"cipher";

fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// An encrypted device name, stored under a recipient's identity key.
#[derive(Clone, Debug)]
pub struct DeviceNameRecord {
    ciphertext: Vec<u8>,
    ephemeral_public: PublicKey,
    synthetic_iv: [u8; SYNTHETIC_IV_LEN],
}

impl DeviceNameRecord {
    /// Returns the AES-CTR ciphertext.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Returns the ephemeral public key used for this record.
    pub fn ephemeral_public(&self) -> &PublicKey {
        &self.ephemeral_public
    }

    /// Returns the synthetic IV (the integrity tag).
    pub fn synthetic_iv(&self) -> &[u8; SYNTHETIC_IV_LEN] {
        &self.synthetic_iv
    }

    /// Serializes the record for storage.
    ///
    /// Format: `synthetic_iv (16) || ephemeral_public (33) || ciphertext`.
    /// No version tag: single fixed construction.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(
            SYNTHETIC_IV_LEN + PUBLIC_KEY_SERIALIZED_LEN + self.ciphertext.len(),
        );
        data.extend_from_slice(&self.synthetic_iv);
        data.extend_from_slice(&self.ephemeral_public.serialize());
        data.extend_from_slice(&self.ciphertext);
        data
    }

    /// Parses a record from stored bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ProvisionError> {
        if data.len() < SYNTHETIC_IV_LEN + PUBLIC_KEY_SERIALIZED_LEN {
            return Err(ProvisionError::DecodeError);
        }

        let synthetic_iv: [u8; SYNTHETIC_IV_LEN] = data[..SYNTHETIC_IV_LEN]
            .try_into()
            .map_err(|_| ProvisionError::DecodeError)?;

        let key_end = SYNTHETIC_IV_LEN + PUBLIC_KEY_SERIALIZED_LEN;
        let ephemeral_public = PublicKey::from_bytes(&data[SYNTHETIC_IV_LEN..key_end])
            .map_err(|_| ProvisionError::DecodeError)?;

        Ok(DeviceNameRecord {
            ciphertext: data[key_end..].to_vec(),
            ephemeral_public,
            synthetic_iv,
        })
    }
}

/// Synthetic-IV encryption for device display names.
pub struct DeviceNameCodec;

impl DeviceNameCodec {
    /// Encrypts a device name for the given recipient identity key.
    ///
    /// A fresh ephemeral key pair is generated per call, so encrypting the
    /// same name twice yields different records.
    pub fn encrypt(
        plaintext: &[u8],
        recipient_public: &PublicKey,
    ) -> Result<DeviceNameRecord, ProvisionError> {
        let ephemeral = KeyPair::generate();
        let mut master_secret = ephemeral.private.agree(recipient_public)?;

        let mut auth_key = hmac_sha256(&master_secret, AUTH_LABEL);
        let digest = hmac_sha256(&auth_key, plaintext);
        auth_key.zeroize();

        let mut synthetic_iv = [0u8; SYNTHETIC_IV_LEN];
        synthetic_iv.copy_from_slice(&digest[..SYNTHETIC_IV_LEN]);

        let mut cipher_key = Self::derive_cipher_key(&master_secret, &synthetic_iv);
        master_secret.zeroize();

        let mut ciphertext = plaintext.to_vec();
        // The synthetic IV is folded into the key; the counter block is zero.
        Aes256Ctr::new((&cipher_key).into(), &[0u8; 16].into())
            .apply_keystream(&mut ciphertext);
        cipher_key.zeroize();

        Ok(DeviceNameRecord {
            ciphertext,
            ephemeral_public: ephemeral.public,
            synthetic_iv,
        })
    }

    /// Decrypts a device name record with the recipient's identity key.
    ///
    /// Fails with `IntegrityError` when the recomputed synthetic IV does not
    /// match the stored one (tampering, or the wrong identity key).
    pub fn decrypt(
        record: &DeviceNameRecord,
        recipient_private: &PrivateKey,
    ) -> Result<Vec<u8>, ProvisionError> {
        let mut master_secret = recipient_private.agree(record.ephemeral_public())?;

        let mut cipher_key = Self::derive_cipher_key(&master_secret, record.synthetic_iv());
        let mut candidate = record.ciphertext().to_vec();
        Aes256Ctr::new((&cipher_key).into(), &[0u8; 16].into())
            .apply_keystream(&mut candidate);
        cipher_key.zeroize();

        let mut auth_key = hmac_sha256(&master_secret, AUTH_LABEL);
        master_secret.zeroize();
        let digest = hmac_sha256(&auth_key, &candidate);
        auth_key.zeroize();

        let expected = &digest[..SYNTHETIC_IV_LEN];
        if !bool::from(expected.ct_eq(record.synthetic_iv())) {
            return Err(ProvisionError::IntegrityError);
        }

        Ok(candidate)
    }

    fn derive_cipher_key(master_secret: &[u8; 32], synthetic_iv: &[u8; 16]) -> [u8; 32] {
        let mut cipher_key_root = hmac_sha256(master_secret, CIPHER_LABEL);
        let cipher_key = hmac_sha256(&cipher_key_root, synthetic_iv);
        cipher_key_root.zeroize();
        cipher_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_wire_roundtrip() {
        let identity = KeyPair::generate();
        let record = DeviceNameCodec::encrypt(b"Desk Laptop", &identity.public).unwrap();

        let restored = DeviceNameRecord::from_bytes(&record.to_bytes()).unwrap();
        assert_eq!(restored.ciphertext(), record.ciphertext());
        assert_eq!(restored.ephemeral_public(), record.ephemeral_public());
        assert_eq!(restored.synthetic_iv(), record.synthetic_iv());
    }

    #[test]
    fn test_record_from_bytes_truncated() {
        assert!(matches!(
            DeviceNameRecord::from_bytes(&[0u8; 20]),
            Err(ProvisionError::DecodeError)
        ));
    }

    #[test]
    fn test_ciphertext_length_matches_plaintext() {
        // CTR mode: no padding, ciphertext length equals plaintext length.
        let identity = KeyPair::generate();
        let record = DeviceNameCodec::encrypt(b"abc", &identity.public).unwrap();
        assert_eq!(record.ciphertext().len(), 3);
    }

    #[test]
    fn test_wrong_identity_key_fails_integrity() {
        let identity = KeyPair::generate();
        let other = KeyPair::generate();

        let record = DeviceNameCodec::encrypt(b"Kitchen Tablet", &identity.public).unwrap();
        let result = DeviceNameCodec::decrypt(&record, &other.private);

        assert!(matches!(result, Err(ProvisionError::IntegrityError)));
    }
}

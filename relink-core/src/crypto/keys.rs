// SPDX-FileCopyrightText: 2026 Relink Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! X25519 Key Types
//!
//! Wraps `x25519-dalek` key material in the wire conventions of the linking
//! protocol: public keys travel as 33 bytes (a type byte followed by the raw
//! curve point), private keys never travel at all.

use ring::rand::SystemRandom;
use x25519_dalek::StaticSecret;

use crate::error::ProvisionError;

/// Type byte identifying an X25519 public key on the wire.
const KEY_TYPE_DJB: u8 = 0x05;

/// Serialized public key length: type byte plus 32-byte curve point.
pub const PUBLIC_KEY_SERIALIZED_LEN: usize = 33;

/// An X25519 public key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    bytes: [u8; 32],
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicKey")
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

impl PublicKey {
    /// Parses a public key from raw (32-byte) or wire (33-byte, type-prefixed)
    /// form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProvisionError> {
        let raw: [u8; 32] = match bytes.len() {
            32 => bytes.try_into().map_err(|_| ProvisionError::InvalidKey)?,
            PUBLIC_KEY_SERIALIZED_LEN if bytes[0] == KEY_TYPE_DJB => bytes[1..]
                .try_into()
                .map_err(|_| ProvisionError::InvalidKey)?,
            _ => return Err(ProvisionError::InvalidKey),
        };
        Ok(PublicKey { bytes: raw })
    }

    /// Returns the raw 32-byte curve point.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Serializes to the 33-byte wire form.
    pub fn serialize(&self) -> [u8; PUBLIC_KEY_SERIALIZED_LEN] {
        let mut out = [0u8; PUBLIC_KEY_SERIALIZED_LEN];
        out[0] = KEY_TYPE_DJB;
        out[1..].copy_from_slice(&self.bytes);
        out
    }

    /// Returns the hex fingerprint of this key.
    pub fn fingerprint(&self) -> String {
        hex::encode(self.bytes)
    }
}

/// An X25519 private key. Never serialized across the transport boundary.
#[derive(Clone)]
pub struct PrivateKey {
    secret: StaticSecret,
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Don't expose key bytes in debug output
        f.debug_struct("PrivateKey")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl PrivateKey {
    /// Creates a private key from 32 raw bytes (clamped per X25519).
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        PrivateKey {
            secret: StaticSecret::from(bytes),
        }
    }

    /// Returns the raw scalar bytes (for local persistence only).
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.secret.as_bytes()
    }

    /// Returns the corresponding public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            bytes: *x25519_dalek::PublicKey::from(&self.secret).as_bytes(),
        }
    }

    /// Computes the X25519 shared secret with the given public key.
    ///
    /// Fails with `InvalidKey` when the agreement is non-contributory
    /// (all-zero output, e.g. a low-order peer point).
    pub fn agree(&self, their_public: &PublicKey) -> Result<[u8; 32], ProvisionError> {
        let their = x25519_dalek::PublicKey::from(*their_public.as_bytes());
        let shared = self.secret.diffie_hellman(&their);
        if !shared.was_contributory() {
            return Err(ProvisionError::InvalidKey);
        }
        Ok(*shared.as_bytes())
    }
}

/// A public/private X25519 key pair.
#[derive(Clone)]
pub struct KeyPair {
    /// Public half.
    pub public: PublicKey,
    /// Private half.
    pub private: PrivateKey,
}

impl KeyPair {
    /// Generates a fresh random key pair.
    pub fn generate() -> Self {
        let rng = SystemRandom::new();
        let seed = ring::rand::generate::<[u8; 32]>(&rng)
            .expect("System RNG should not fail")
            .expose();

        Self::from_private(PrivateKey::from_bytes(seed))
    }

    /// Builds a key pair from an existing private key.
    pub fn from_private(private: PrivateKey) -> Self {
        let public = private.public_key();
        KeyPair { public, private }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_key_wire_roundtrip() {
        let pair = KeyPair::generate();
        let wire = pair.public.serialize();

        assert_eq!(wire.len(), PUBLIC_KEY_SERIALIZED_LEN);
        assert_eq!(wire[0], KEY_TYPE_DJB);

        let restored = PublicKey::from_bytes(&wire).unwrap();
        assert_eq!(restored, pair.public);
    }

    #[test]
    fn test_public_key_accepts_raw_form() {
        let pair = KeyPair::generate();
        let restored = PublicKey::from_bytes(pair.public.as_bytes()).unwrap();
        assert_eq!(restored, pair.public);
    }

    #[test]
    fn test_public_key_rejects_bad_type_byte() {
        let pair = KeyPair::generate();
        let mut wire = pair.public.serialize();
        wire[0] = 0x04;

        assert!(matches!(
            PublicKey::from_bytes(&wire),
            Err(ProvisionError::InvalidKey)
        ));
    }

    #[test]
    fn test_public_key_rejects_bad_length() {
        assert!(matches!(
            PublicKey::from_bytes(&[0u8; 31]),
            Err(ProvisionError::InvalidKey)
        ));
        assert!(matches!(
            PublicKey::from_bytes(&[]),
            Err(ProvisionError::InvalidKey)
        ));
    }

    #[test]
    fn test_agreement_is_symmetric() {
        let alice = KeyPair::generate();
        let bob = KeyPair::generate();

        let ab = alice.private.agree(&bob.public).unwrap();
        let ba = bob.private.agree(&alice.public).unwrap();

        assert_eq!(ab, ba);
    }

    #[test]
    fn test_agreement_rejects_low_order_point() {
        let pair = KeyPair::generate();
        let zero = PublicKey::from_bytes(&[0u8; 32]).unwrap();

        assert!(matches!(
            pair.private.agree(&zero),
            Err(ProvisionError::InvalidKey)
        ));
    }

    #[test]
    fn test_private_key_debug_redacted() {
        let pair = KeyPair::generate();
        let debug = format!("{:?}", pair.private);

        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains(&hex::encode(pair.private.as_bytes())));
    }
}

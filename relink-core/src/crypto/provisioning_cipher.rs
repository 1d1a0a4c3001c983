// SPDX-FileCopyrightText: 2026 Relink Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Provisioning Cipher
//!
//! Non-interactive authenticated encryption for the provisioning payload,
//! built from primitives (ECDH + HKDF + AES-CBC + HMAC) rather than a
//! library AEAD: the payload must be self-contained in a single envelope
//! exchanged over a channel with no prior session state.
//!
//! Envelope wire format:
//! `ephemeral_public (33 bytes) || version (1 byte) || iv (16 bytes) || ciphertext || mac (32 bytes)`

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use ring::rand::SystemRandom;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::agreement::derive_provisioning_keys;
use super::keys::{KeyPair, PrivateKey, PublicKey, PUBLIC_KEY_SERIALIZED_LEN};
use crate::error::ProvisionError;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// Envelope IV length in bytes.
const IV_LEN: usize = 16;
/// Envelope MAC length in bytes.
const MAC_LEN: usize = 32;

/// Version tag selecting the downstream schema of the plaintext.
///
/// The cryptographic construction is identical for both variants; both
/// tags are first-class on the decrypt path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionVersion {
    /// Registration provisioning message (tag `0x00`).
    Registration,
    /// Primary-device provisioning message (tag `0x01`).
    Primary,
}

impl ProvisionVersion {
    /// Parses a wire tag.
    pub fn from_tag(tag: u8) -> Result<Self, ProvisionError> {
        match tag {
            0x00 => Ok(ProvisionVersion::Registration),
            0x01 => Ok(ProvisionVersion::Primary),
            other => Err(ProvisionError::VersionMismatch(other)),
        }
    }

    /// Returns the wire tag.
    pub fn tag(self) -> u8 {
        match self {
            ProvisionVersion::Registration => 0x00,
            ProvisionVersion::Primary => 0x01,
        }
    }
}

/// An encrypted provisioning envelope. Immutable once constructed.
#[derive(Clone, Debug)]
pub struct ProvisionEnvelope {
    ephemeral_public: PublicKey,
    body: Vec<u8>,
}

impl ProvisionEnvelope {
    /// Returns the sender's ephemeral public key.
    pub fn ephemeral_public(&self) -> &PublicKey {
        &self.ephemeral_public
    }

    /// Returns the authenticated body: `version || iv || ciphertext || mac`.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Serializes the envelope for transmission.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(PUBLIC_KEY_SERIALIZED_LEN + self.body.len());
        data.extend_from_slice(&self.ephemeral_public.serialize());
        data.extend_from_slice(&self.body);
        data
    }

    /// Parses an envelope from wire bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ProvisionError> {
        // Key (33) plus the minimum body: version + iv + one block + mac
        if data.len() < PUBLIC_KEY_SERIALIZED_LEN + 1 + IV_LEN + 16 + MAC_LEN {
            return Err(ProvisionError::DecodeError);
        }

        let ephemeral_public = PublicKey::from_bytes(&data[..PUBLIC_KEY_SERIALIZED_LEN])
            .map_err(|_| ProvisionError::DecodeError)?;

        Ok(ProvisionEnvelope {
            ephemeral_public,
            body: data[PUBLIC_KEY_SERIALIZED_LEN..].to_vec(),
        })
    }
}

/// Encrypt-then-MAC cipher for provisioning envelopes.
pub struct ProvisioningCipher;

impl ProvisioningCipher {
    /// Encrypts a plaintext message for the given identity key.
    ///
    /// Generates a fresh ephemeral key pair per call; the ephemeral private
    /// key never outlives this function.
    pub fn encrypt(
        plaintext: &[u8],
        their_identity: &PublicKey,
        version: ProvisionVersion,
    ) -> Result<ProvisionEnvelope, ProvisionError> {
        let ephemeral = KeyPair::generate();
        let keys = derive_provisioning_keys(&ephemeral.private, their_identity)?;

        let rng = SystemRandom::new();
        let iv = ring::rand::generate::<[u8; IV_LEN]>(&rng)
            .expect("System RNG should not fail")
            .expose();

        let ciphertext = Aes256CbcEnc::new(keys.enc_key().into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        let mut mac = HmacSha256::new_from_slice(keys.mac_key())
            .expect("HMAC accepts keys of any length");
        mac.update(&[version.tag()]);
        mac.update(&iv);
        mac.update(&ciphertext);
        let tag = mac.finalize().into_bytes();

        let mut body = Vec::with_capacity(1 + IV_LEN + ciphertext.len() + MAC_LEN);
        body.push(version.tag());
        body.extend_from_slice(&iv);
        body.extend_from_slice(&ciphertext);
        body.extend_from_slice(&tag);

        Ok(ProvisionEnvelope {
            ephemeral_public: ephemeral.public,
            body,
        })
    }

    /// Decrypts a provisioning envelope with our identity private key.
    ///
    /// The version tag is validated before any key derivation, and the MAC
    /// is verified in constant time before any decryption is attempted.
    pub fn decrypt(
        envelope: &ProvisionEnvelope,
        our_private: &PrivateKey,
    ) -> Result<(ProvisionVersion, Vec<u8>), ProvisionError> {
        let body = envelope.body();
        if body.len() < 1 + IV_LEN + MAC_LEN {
            return Err(ProvisionError::DecodeError);
        }

        let version = ProvisionVersion::from_tag(body[0])?;

        let mac_offset = body.len() - MAC_LEN;
        let iv: [u8; IV_LEN] = body[1..1 + IV_LEN]
            .try_into()
            .map_err(|_| ProvisionError::DecodeError)?;
        let ciphertext = &body[1 + IV_LEN..mac_offset];
        let their_mac = &body[mac_offset..];

        let keys = derive_provisioning_keys(our_private, envelope.ephemeral_public())?;

        let mut mac = HmacSha256::new_from_slice(keys.mac_key())
            .expect("HMAC accepts keys of any length");
        mac.update(&body[..mac_offset]);
        let expected = mac.finalize().into_bytes();

        if !bool::from(expected.as_slice().ct_eq(their_mac)) {
            return Err(ProvisionError::AuthenticationFailure);
        }

        Aes256CbcDec::new(keys.enc_key().into(), &iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map(|plaintext| (version, plaintext))
            .map_err(|_| ProvisionError::DecodeError)
    }
}

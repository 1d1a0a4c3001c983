// SPDX-FileCopyrightText: 2026 Relink Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Provisioning Message Schema
//!
//! The plaintext account payload transferred from the primary device to the
//! newly linked device, plus the linking-identifier payload that precedes it
//! on the channel. Wire framing uses u32-LE length prefixes and one-byte
//! presence flags.

use uuid::Uuid;
use zeroize::Zeroize;

use crate::crypto::keys::{PrivateKey, PublicKey, PUBLIC_KEY_SERIALIZED_LEN};
use crate::error::ProvisionError;

/// An identity key pair carried inside the provisioning payload.
///
/// Serialized as the 33-byte public wire form followed by the 32-byte
/// private scalar. This is the one place private key bytes appear in a
/// serialized structure; the structure itself only ever travels inside an
/// authenticated-encrypted envelope.
#[derive(Clone)]
pub struct IdentityKeyPair {
    /// Public half.
    pub public: PublicKey,
    /// Private half.
    pub private: PrivateKey,
}

impl IdentityKeyPair {
    const SERIALIZED_LEN: usize = PUBLIC_KEY_SERIALIZED_LEN + 32;

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.public.serialize());
        out.extend_from_slice(self.private.as_bytes());
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, ProvisionError> {
        let bytes = reader.bytes(Self::SERIALIZED_LEN)?;
        let public = PublicKey::from_bytes(&bytes[..PUBLIC_KEY_SERIALIZED_LEN])
            .map_err(|_| ProvisionError::DecodeError)?;
        let private: [u8; 32] = bytes[PUBLIC_KEY_SERIALIZED_LEN..]
            .try_into()
            .map_err(|_| ProvisionError::DecodeError)?;
        Ok(IdentityKeyPair {
            public,
            private: PrivateKey::from_bytes(private),
        })
    }
}

impl PartialEq for IdentityKeyPair {
    fn eq(&self, other: &Self) -> bool {
        self.public == other.public && self.private.as_bytes() == other.private.as_bytes()
    }
}

impl std::fmt::Debug for IdentityKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityKeyPair")
            .field("public", &self.public)
            .field("private", &"[REDACTED]")
            .finish()
    }
}

/// The plaintext provisioning payload (primary-device schema, tag `0x01`).
///
/// Created by the primary device, consumed exactly once by the linking
/// device.
#[derive(Clone, PartialEq)]
pub struct ProvisionMessage {
    /// Account identifier.
    pub aci: Uuid,
    /// Phone-number identity identifier, when the account has one.
    pub pni: Option<Uuid>,
    /// Phone number in E.164 form.
    pub number: String,
    /// ACI identity key pair.
    pub aci_identity: IdentityKeyPair,
    /// PNI identity key pair, when the account has one.
    pub pni_identity: Option<IdentityKeyPair>,
    /// Provisioning authorization code for the registration request.
    pub provisioning_code: String,
    /// Profile key (32 bytes).
    pub profile_key: [u8; 32],
    /// Whether read receipts are enabled on the account.
    pub read_receipts: bool,
    /// Master key (32 bytes).
    pub master_key: [u8; 32],
    /// Optional peer-supplied extra public key (33-byte wire form).
    pub peer_extra_public_key: Option<[u8; 33]>,
}

impl Drop for ProvisionMessage {
    fn drop(&mut self) {
        self.profile_key.zeroize();
        self.master_key.zeroize();
    }
}

impl std::fmt::Debug for ProvisionMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisionMessage")
            .field("aci", &self.aci)
            .field("pni", &self.pni)
            .field("number", &self.number)
            .field("read_receipts", &self.read_receipts)
            .field("profile_key", &"[REDACTED]")
            .field("master_key", &"[REDACTED]")
            .finish()
    }
}

impl ProvisionMessage {
    /// Serializes the message for encryption.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(self.aci.as_bytes());
        write_option(&mut data, self.pni.is_some());
        if let Some(pni) = &self.pni {
            data.extend_from_slice(pni.as_bytes());
        }
        write_string(&mut data, &self.number);
        self.aci_identity.write(&mut data);
        write_option(&mut data, self.pni_identity.is_some());
        if let Some(pair) = &self.pni_identity {
            pair.write(&mut data);
        }
        write_string(&mut data, &self.provisioning_code);
        data.extend_from_slice(&self.profile_key);
        data.push(u8::from(self.read_receipts));
        data.extend_from_slice(&self.master_key);
        write_option(&mut data, self.peer_extra_public_key.is_some());
        if let Some(extra) = &self.peer_extra_public_key {
            data.extend_from_slice(extra);
        }
        data
    }

    /// Deserializes a message from decrypted plaintext bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ProvisionError> {
        let mut reader = Reader::new(data);

        let aci = read_uuid(&mut reader)?;
        let pni = if reader.flag()? {
            Some(read_uuid(&mut reader)?)
        } else {
            None
        };
        let number = read_string(&mut reader)?;
        let aci_identity = IdentityKeyPair::read(&mut reader)?;
        let pni_identity = if reader.flag()? {
            Some(IdentityKeyPair::read(&mut reader)?)
        } else {
            None
        };
        let provisioning_code = read_string(&mut reader)?;
        let profile_key: [u8; 32] = reader
            .bytes(32)?
            .try_into()
            .map_err(|_| ProvisionError::DecodeError)?;
        let read_receipts = reader.flag()?;
        let master_key: [u8; 32] = reader
            .bytes(32)?
            .try_into()
            .map_err(|_| ProvisionError::DecodeError)?;
        let peer_extra_public_key = if reader.flag()? {
            Some(
                reader
                    .bytes(PUBLIC_KEY_SERIALIZED_LEN)?
                    .try_into()
                    .map_err(|_| ProvisionError::DecodeError)?,
            )
        } else {
            None
        };

        if !reader.is_empty() {
            return Err(ProvisionError::DecodeError);
        }

        Ok(ProvisionMessage {
            aci,
            pni,
            number,
            aci_identity,
            pni_identity,
            provisioning_code,
            profile_key,
            read_receipts,
            master_key,
            peer_extra_public_key,
        })
    }
}

/// Decodes the linking-identifier payload: a UTF-8 UUID string.
pub fn decode_linking_uuid(data: &[u8]) -> Result<Uuid, ProvisionError> {
    let text = std::str::from_utf8(data).map_err(|_| ProvisionError::DecodeError)?;
    Uuid::parse_str(text.trim()).map_err(|_| ProvisionError::DecodeError)
}

fn write_string(out: &mut Vec<u8>, value: &str) {
    let bytes = value.as_bytes();
    out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(bytes);
}

fn write_option(out: &mut Vec<u8>, present: bool) {
    out.push(u8::from(present));
}

fn read_string(reader: &mut Reader<'_>) -> Result<String, ProvisionError> {
    let len = reader.u32_le()? as usize;
    let bytes = reader.bytes(len)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| ProvisionError::DecodeError)
}

fn read_uuid(reader: &mut Reader<'_>) -> Result<Uuid, ProvisionError> {
    let bytes: [u8; 16] = reader
        .bytes(16)?
        .try_into()
        .map_err(|_| ProvisionError::DecodeError)?;
    Ok(Uuid::from_bytes(bytes))
}

/// Bounds-checked cursor over wire bytes.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Reader { data, pos: 0 }
    }

    fn bytes(&mut self, len: usize) -> Result<&'a [u8], ProvisionError> {
        let end = self
            .pos
            .checked_add(len)
            .ok_or(ProvisionError::DecodeError)?;
        if end > self.data.len() {
            return Err(ProvisionError::DecodeError);
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u32_le(&mut self) -> Result<u32, ProvisionError> {
        let bytes: [u8; 4] = self
            .bytes(4)?
            .try_into()
            .map_err(|_| ProvisionError::DecodeError)?;
        Ok(u32::from_le_bytes(bytes))
    }

    fn flag(&mut self) -> Result<bool, ProvisionError> {
        match self.bytes(1)?[0] {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(ProvisionError::DecodeError),
        }
    }

    fn is_empty(&self) -> bool {
        self.pos == self.data.len()
    }
}

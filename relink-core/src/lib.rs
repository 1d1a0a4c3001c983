// SPDX-FileCopyrightText: 2026 Relink Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Relink Core Library
//!
//! Secondary-device linking: a new device obtains a copy of an account's
//! cryptographic identity from an already-registered device over an
//! untrusted transport. The crate provides the provisioning cipher (an
//! encrypt-then-MAC envelope over ECDH + HKDF + AES-CBC + HMAC), the
//! single-use session state machine that drives one linking attempt, a
//! synthetic-IV codec for encrypted device names, and the scannable
//! linking URI.
//!
//! No private key ever crosses the transport boundary in cleartext; only
//! public keys and authenticated-encrypted payloads do.

pub mod crypto;
pub mod error;
pub mod link_uri;
pub mod message;
pub mod session;

pub use crypto::{
    derive_provisioning_keys, DerivedKeys, DeviceNameCodec, DeviceNameRecord, KeyPair, PrivateKey,
    ProvisionEnvelope, ProvisionVersion, ProvisioningCipher, PublicKey,
};
pub use error::ProvisionError;
pub use link_uri::LinkingUri;
pub use message::{decode_linking_uuid, IdentityKeyPair, ProvisionMessage};
pub use session::{
    ChannelError, MockChannel, ProvisionPayload, ProvisioningChannel, ProvisioningSession,
    SessionState, PROVISIONING_TIMEOUT,
};

// SPDX-FileCopyrightText: 2026 Relink Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Provisioning Session State Machine
//!
//! Drives exactly one linking attempt over an abstract duplex channel: the
//! first inbound message carries the linking identifier (rendered as a
//! scannable code by the caller), the second carries the encrypted
//! provisioning envelope. A session is single-use; after the envelope read
//! the channel is closed on every exit path and the session is `Closed`.

pub mod channel;
pub mod mock;

pub use channel::{ChannelError, ProvisioningChannel};
pub use mock::MockChannel;

use std::time::Duration;

use uuid::Uuid;

use crate::crypto::keys::PrivateKey;
use crate::crypto::provisioning_cipher::{ProvisionEnvelope, ProvisionVersion, ProvisioningCipher};
use crate::error::ProvisionError;
use crate::message::{decode_linking_uuid, ProvisionMessage};

/// How long each blocking read waits for the primary device.
pub const PROVISIONING_TIMEOUT: Duration = Duration::from_secs(100);

/// State of a linking attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No traffic yet; the linking identifier has not been obtained.
    Disconnected,
    /// Linking identifier obtained; awaiting the provisioning envelope.
    AwaitingUuid,
    /// Blocking read for the provisioning envelope in progress.
    AwaitingMessage,
    /// Terminal: the channel has been closed.
    Closed,
}

/// Decrypted result of a linking attempt, keyed by envelope version.
#[derive(Debug)]
pub enum ProvisionPayload {
    /// Primary-device provisioning message (tag `0x01`), fully decoded.
    Primary(ProvisionMessage),
    /// Registration provisioning message (tag `0x00`), raw plaintext bytes
    /// for the caller's registration schema.
    Registration(Vec<u8>),
}

/// A single linking attempt over one channel.
///
/// The session owns its channel; both operations take `&mut self`, so use
/// is serialized by ownership. It never reconnects or repeats a cycle — a
/// caller retrying after `Timeout` on the identifier re-issues that same
/// call; any later failure requires a fresh session.
pub struct ProvisioningSession<C: ProvisioningChannel> {
    channel: C,
    state: SessionState,
    timeout: Duration,
}

impl<C: ProvisioningChannel> ProvisioningSession<C> {
    /// Creates a session over the given channel with the default timeout.
    pub fn new(channel: C) -> Self {
        Self::with_timeout(channel, PROVISIONING_TIMEOUT)
    }

    /// Creates a session with a custom read timeout (shortened in tests).
    pub fn with_timeout(channel: C, timeout: Duration) -> Self {
        ProvisioningSession {
            channel,
            state: SessionState::Disconnected,
            timeout,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the underlying channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Returns the underlying channel mutably (e.g. to force-close it when
    /// a caller abandons the attempt).
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Obtains the linking identifier from the first inbound message.
    ///
    /// Valid only from `Disconnected`. Opens the channel if needed, then
    /// blocks for one message. On `Timeout` the channel is left open and the
    /// state unchanged, so this same call may be retried once; on success
    /// the session advances to `AwaitingUuid`.
    pub fn request_linking_identifier(&mut self) -> Result<Uuid, ProvisionError> {
        if self.state != SessionState::Disconnected {
            return Err(ProvisionError::ProtocolState(
                "linking identifier may only be requested on a fresh session",
            ));
        }

        self.channel.connect()?;
        let raw = self.channel.read_next_message(self.timeout)?;
        let uuid = decode_linking_uuid(&raw)?;

        self.state = SessionState::AwaitingUuid;
        Ok(uuid)
    }

    /// Receives and decrypts the provisioning envelope.
    ///
    /// Valid only from `AwaitingUuid`; called out of sequence it fails with
    /// `ProtocolState` without touching the transport. Otherwise the channel
    /// is closed exactly once before returning, on every exit path, and the
    /// session ends `Closed` — success or failure.
    pub fn request_provisioning_message(
        &mut self,
        our_private: &PrivateKey,
    ) -> Result<ProvisionPayload, ProvisionError> {
        if self.state != SessionState::AwaitingUuid {
            return Err(ProvisionError::ProtocolState(
                "provisioning message requires an obtained linking identifier",
            ));
        }

        self.state = SessionState::AwaitingMessage;
        let result = self.read_and_decrypt(our_private);

        // Single-use: close regardless of outcome. A close failure does not
        // change the attempt's result.
        let _ = self.channel.disconnect();
        self.state = SessionState::Closed;

        result
    }

    fn read_and_decrypt(
        &mut self,
        our_private: &PrivateKey,
    ) -> Result<ProvisionPayload, ProvisionError> {
        let raw = self.channel.read_next_message(self.timeout)?;
        let envelope = ProvisionEnvelope::from_bytes(&raw)?;
        let (version, plaintext) = ProvisioningCipher::decrypt(&envelope, our_private)?;

        match version {
            ProvisionVersion::Primary => Ok(ProvisionPayload::Primary(
                ProvisionMessage::from_bytes(&plaintext)?,
            )),
            ProvisionVersion::Registration => Ok(ProvisionPayload::Registration(plaintext)),
        }
    }
}

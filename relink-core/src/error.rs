// SPDX-FileCopyrightText: 2026 Relink Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Provisioning Error Types

use thiserror::Error;

/// Errors that can occur while linking a secondary device.
///
/// Cryptographic and decode failures are terminal for the envelope that
/// produced them and are never retried internally. `Timeout` and
/// `Transport` are the only kinds a caller is expected to retry.
#[derive(Error, Debug, Clone)]
pub enum ProvisionError {
    #[error("Malformed or out-of-range key bytes")]
    InvalidKey,

    #[error("Unrecognized envelope version tag: {0:#04x}")]
    VersionMismatch(u8),

    #[error("Envelope MAC verification failed")]
    AuthenticationFailure,

    #[error("Device name integrity check failed")]
    IntegrityError,

    #[error("Malformed envelope, message, or padding")]
    DecodeError,

    #[error("No inbound message within the timeout window")]
    Timeout,

    #[error("Invalid session state: {0}")]
    ProtocolState(&'static str),

    #[error("Channel I/O failure: {0}")]
    Transport(String),
}

// SPDX-FileCopyrightText: 2026 Relink Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Provisioning Channel Trait
//!
//! Platform-agnostic abstraction over the duplex channel a linking attempt
//! runs on (in practice a provisioning websocket). The core library only
//! ever reads from it: the primary device pushes the linking identifier and
//! the encrypted envelope through the server-mediated channel.

use std::time::Duration;

use thiserror::Error;

use crate::error::ProvisionError;

/// Errors surfaced by a channel implementation.
#[derive(Error, Debug, Clone)]
pub enum ChannelError {
    #[error("No message arrived before the timeout")]
    Timeout,

    #[error("Channel I/O failure: {0}")]
    Io(String),
}

impl From<ChannelError> for ProvisionError {
    fn from(err: ChannelError) -> Self {
        match err {
            ChannelError::Timeout => ProvisionError::Timeout,
            ChannelError::Io(detail) => ProvisionError::Transport(detail),
        }
    }
}

/// Duplex channel carrying provisioning traffic.
///
/// # Synchronous Interface
///
/// Methods block; platform implementations may internally use async
/// runtimes but expose a blocking interface here. The blocking read is the
/// only suspension point in a linking attempt and must honor its timeout so
/// an abandoning caller is released promptly.
pub trait ProvisioningChannel: Send {
    /// Opens the channel. Idempotent: connecting an open channel is a no-op.
    fn connect(&mut self) -> Result<(), ChannelError>;

    /// Closes the channel. Safe to call even if not connected.
    fn disconnect(&mut self) -> Result<(), ChannelError>;

    /// Blocks until the next inbound message arrives or the timeout elapses.
    fn read_next_message(&mut self, timeout: Duration) -> Result<Vec<u8>, ChannelError>;
}

// SPDX-FileCopyrightText: 2026 Relink Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mock Channel
//!
//! In-memory [`ProvisioningChannel`] with scripted inbound traffic, used by
//! the session tests. Reads pop the front of the script; an exhausted script
//! behaves like a quiet channel and times out.

use std::collections::VecDeque;
use std::time::Duration;

use super::channel::{ChannelError, ProvisioningChannel};

/// Scripted in-memory channel.
#[derive(Default)]
pub struct MockChannel {
    script: VecDeque<Result<Vec<u8>, ChannelError>>,
    connected: bool,
    connect_calls: u32,
    disconnect_calls: u32,
    read_calls: u32,
    fail_connect: bool,
}

impl MockChannel {
    /// Creates a channel with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an inbound message.
    pub fn push_message(&mut self, message: Vec<u8>) {
        self.script.push_back(Ok(message));
    }

    /// Queues a read that fails with an I/O error.
    pub fn push_io_error(&mut self, detail: &str) {
        self.script.push_back(Err(ChannelError::Io(detail.to_string())));
    }

    /// Makes the next `connect` call fail.
    pub fn fail_next_connect(&mut self) {
        self.fail_connect = true;
    }

    /// Whether the channel is currently open.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Number of `connect` calls observed.
    pub fn connect_calls(&self) -> u32 {
        self.connect_calls
    }

    /// Number of `disconnect` calls observed.
    pub fn disconnect_calls(&self) -> u32 {
        self.disconnect_calls
    }

    /// Number of `read_next_message` calls observed.
    pub fn read_calls(&self) -> u32 {
        self.read_calls
    }
}

impl ProvisioningChannel for MockChannel {
    fn connect(&mut self) -> Result<(), ChannelError> {
        self.connect_calls += 1;
        if self.fail_connect {
            self.fail_connect = false;
            return Err(ChannelError::Io("connect refused".to_string()));
        }
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), ChannelError> {
        self.disconnect_calls += 1;
        self.connected = false;
        Ok(())
    }

    fn read_next_message(&mut self, _timeout: Duration) -> Result<Vec<u8>, ChannelError> {
        self.read_calls += 1;
        if !self.connected {
            return Err(ChannelError::Io("channel not connected".to_string()));
        }
        self.script.pop_front().unwrap_or(Err(ChannelError::Timeout))
    }
}

// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Lifecycle state and statistics of a data channel.

use std::path::PathBuf;

/// Lifecycle state of a [`DataChannel`](super::DataChannel).
///
/// ```text
/// Unset --configure--> Set --open--> Open --close--> Closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelState {
    /// Created, not configured
    #[default]
    Unset,
    /// Configured, not yet opened
    Set,
    /// Accepting records
    Open,
    /// Closed; no further writes
    Closed,
}

impl ChannelState {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelState::Unset => "unset",
            ChannelState::Set => "set",
            ChannelState::Open => "open",
            ChannelState::Closed => "closed",
        }
    }
}

/// Counters of what a channel has written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelStats {
    /// l-records accepted
    pub l_records: u64,
    /// o-records accepted
    pub o_records: u64,
    /// Distinct epochs started (file mode)
    pub epochs: u64,
    /// Chunk files opened (file mode)
    pub chunks_opened: u64,
    /// Chunk file currently written (file mode)
    pub current_chunk: Option<PathBuf>,
}

impl ChannelStats {
    /// Total records accepted.
    pub fn records(&self) -> u64 {
        self.l_records + self.o_records
    }
}

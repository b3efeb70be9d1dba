// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! The data channel orchestrator.
//!
//! A [`DataChannel`] is configured once, opened once and then receives
//! l-records and o-records until it is closed.
//!
//! In file mode the channel groups records into epochs by their time tag
//! and rotates to a new chunk file whenever a new epoch would exceed
//! `max_epochs_per_chunk`. The triggering epoch becomes the first epoch of
//! the new chunk. o-records never trigger a rotation.
//!
//! In socket mode records are handed straight to the [`SocketTransport`]
//! with no epoch or chunk bookkeeping.
//!
//! # Example
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use astrolabe::{DataChannel, FileConfig, LRecord, Lineage, ORecord};
//!
//! let mut channel = DataChannel::new();
//! channel.set_file_channel(
//!     FileConfig::new("out/obs.hdr", "out/obs", Lineage::new("example"))
//!         .max_epochs_per_chunk(2)
//!         .suffix_width(3),
//! )?;
//! channel.open()?;
//! channel.write_l(&LRecord::new("LR01", 1, 5.0).with_expectations(vec![1.0]))?;
//! channel.write_o(&ORecord::new("OR01", 5.0, vec![10], vec![20, 21]))?;
//! channel.close()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod state;

pub use config::{ChannelConfig, FileConfig, SocketConfig};
pub use state::{ChannelState, ChannelStats};

use std::path::Path;

use uuid::Uuid;

use crate::core::{ChannelError, IoStage, LRecord, ORecord, Result};
use crate::io::chunk_name::ChunkNameGenerator;
use crate::io::encoder::{create_encoder, RecordEncoder};
use crate::io::header::{ChannelHeader, HeaderWriter, HEADER_VERSION};
use crate::io::socket::SocketTransport;

/// Transport held by an open channel, chosen once at `open`.
enum Transport {
    /// Encoder of the current chunk
    File(Box<dyn RecordEncoder>),
    /// Connection to the peer
    Socket(SocketTransport),
}

/// Epoch and chunk bookkeeping of a file channel.
#[derive(Debug, Clone, Copy, Default)]
struct EpochState {
    last_time_tag: f64,
    first_write_done: bool,
    epochs_in_current_chunk: u32,
}

impl EpochState {
    /// Register the time tag of an l-record; returns whether it starts a new epoch.
    fn observe(&mut self, time: f64) -> bool {
        let changed = !self.first_write_done || time != self.last_time_tag;
        self.last_time_tag = time;
        self.first_write_done = true;
        changed
    }
}

/// Logical output stream of l-records and o-records.
///
/// Not safe for concurrent use; every operation runs to completion on the
/// caller's thread.
pub struct DataChannel {
    config: Option<ChannelConfig>,
    state: ChannelState,
    names: Option<ChunkNameGenerator>,
    transport: Option<Transport>,
    epochs: EpochState,
    stats: ChannelStats,
    channel_id: Uuid,
}

impl Default for DataChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl DataChannel {
    /// Create an unconfigured channel.
    pub fn new() -> Self {
        Self {
            config: None,
            state: ChannelState::Unset,
            names: None,
            transport: None,
            epochs: EpochState::default(),
            stats: ChannelStats::default(),
            channel_id: Uuid::new_v4(),
        }
    }

    /// Create a channel and apply `config`.
    pub fn with_config(config: impl Into<ChannelConfig>) -> Result<Self> {
        let mut channel = Self::new();
        channel.configure(config.into())?;
        Ok(channel)
    }

    /// Configure the channel for rotating chunk files.
    ///
    /// Fails if the channel was already configured (status 1) or if an
    /// argument is invalid (status 2-5).
    pub fn set_file_channel(&mut self, config: FileConfig) -> Result<()> {
        self.configure(ChannelConfig::File(config))
    }

    /// Configure the channel for a socket stream.
    ///
    /// Fails if the channel was already configured (status 1), the host is
    /// missing in client mode (status 2) or the port is 0 (status 3).
    pub fn set_socket_channel(&mut self, config: SocketConfig) -> Result<()> {
        self.configure(ChannelConfig::Socket(config))
    }

    /// Configure the channel with either configuration. Callable once.
    pub fn configure(&mut self, config: ChannelConfig) -> Result<()> {
        if self.config.is_some() {
            return Err(ChannelError::AlreadyConfigured);
        }
        config.validate()?;

        if let ChannelConfig::File(file) = &config {
            self.names = Some(ChunkNameGenerator::new(
                &file.base_path,
                file.suffix_width,
                file.separator,
            )?);
        }
        self.config = Some(config);
        self.state = ChannelState::Set;
        Ok(())
    }

    /// Open the configured transport.
    ///
    /// File mode writes the header and creates the first chunk; socket mode
    /// connects or waits for a peer.
    pub fn open(&mut self) -> Result<()> {
        match self.state {
            ChannelState::Unset => return Err(ChannelError::NotConfigured),
            ChannelState::Open | ChannelState::Closed => return Err(ChannelError::AlreadyOpen),
            ChannelState::Set => {}
        }

        let transport = match self.config.as_ref() {
            Some(ChannelConfig::File(config)) => {
                HeaderWriter::write(&config.header_path, &self.header(config))?;

                // The first chunk keeps index 1 until it actually exists.
                let names = self.names.as_mut().ok_or(ChannelError::NotConfigured)?;
                let path = names.peek_name()?;
                let encoder = create_encoder(
                    config.encoding(),
                    &path,
                    config.kind,
                    config.buffer_capacity,
                )
                .map_err(|e| e.at_stage(IoStage::ChunkOpen))?;
                names.commit();

                tracing::info!(
                    channel_id = %self.channel_id,
                    header = %config.header_path.display(),
                    chunk = %path.display(),
                    encoding = config.encoding().as_str(),
                    kind = config.kind.as_str(),
                    "file data channel open"
                );
                self.stats.chunks_opened = 1;
                self.stats.current_chunk = Some(path);
                Transport::File(encoder)
            }
            Some(ChannelConfig::Socket(config)) => {
                Transport::Socket(SocketTransport::open(config)?)
            }
            None => return Err(ChannelError::NotConfigured),
        };

        self.transport = Some(transport);
        self.epochs = EpochState::default();
        self.state = ChannelState::Open;
        Ok(())
    }

    /// Write one l-record.
    ///
    /// In file mode a new time tag starts a new epoch; if the current chunk
    /// already holds `max_epochs_per_chunk` epochs the chunk is rotated
    /// first.
    pub fn write_l(&mut self, record: &LRecord) -> Result<()> {
        if self.state != ChannelState::Open {
            return Err(ChannelError::NotOpen);
        }

        let max_epochs = match (&mut self.transport, &self.config) {
            (Some(Transport::Socket(socket)), _) => {
                socket.write_l(record)?;
                self.stats.l_records += 1;
                return Ok(());
            }
            (Some(Transport::File(encoder)), Some(ChannelConfig::File(config))) => {
                // Rejected records must not advance the epoch bookkeeping.
                encoder.check_l(record)?;
                config.max_epochs_per_chunk
            }
            _ => return Err(ChannelError::NotOpen),
        };

        if self.epochs.observe(record.time) {
            if self.epochs.epochs_in_current_chunk == max_epochs {
                self.rotate()?;
            }
            self.epochs.epochs_in_current_chunk += 1;
            self.stats.epochs += 1;
            debug_assert!(self.epochs.epochs_in_current_chunk <= max_epochs);
        }

        match self.transport.as_mut() {
            Some(Transport::File(encoder)) => encoder.write_l(record)?,
            _ => return Err(ChannelError::NotOpen),
        }
        self.stats.l_records += 1;
        Ok(())
    }

    /// Write one o-record.
    ///
    /// Never rotates the chunk. In file mode an active o-record must follow
    /// an l-record of the same epoch.
    pub fn write_o(&mut self, record: &ORecord) -> Result<()> {
        if self.state != ChannelState::Open {
            return Err(ChannelError::NotOpen);
        }

        match self.transport.as_mut() {
            Some(Transport::Socket(socket)) => socket.write_o(record)?,
            Some(Transport::File(encoder)) => encoder.write_o(record)?,
            None => return Err(ChannelError::NotOpen),
        }
        self.stats.o_records += 1;
        Ok(())
    }

    /// Close the active transport.
    ///
    /// Closing a channel that is not open succeeds without effect.
    pub fn close(&mut self) -> Result<()> {
        if self.state != ChannelState::Open {
            return Ok(());
        }
        self.state = ChannelState::Closed;

        let result = match self.transport.take() {
            Some(Transport::File(mut encoder)) => encoder.close(),
            Some(Transport::Socket(mut socket)) => socket.close(),
            None => Ok(()),
        };

        match &result {
            Ok(()) => tracing::info!(
                channel_id = %self.channel_id,
                l_records = self.stats.l_records,
                o_records = self.stats.o_records,
                epochs = self.stats.epochs,
                chunks = self.stats.chunks_opened,
                "data channel closed"
            ),
            Err(e) => tracing::warn!(
                channel_id = %self.channel_id,
                error = %e,
                "data channel close failed"
            ),
        }
        result
    }

    /// Close the current chunk and open the next one.
    ///
    /// The old encoder is closed and dropped before the new one is created.
    fn rotate(&mut self) -> Result<()> {
        let Some(ChannelConfig::File(config)) = self.config.as_ref() else {
            return Err(ChannelError::NotConfigured);
        };

        if let Some(Transport::File(mut old)) = self.transport.take() {
            old.close().map_err(|e| e.at_stage(IoStage::ChunkRotate))?;
        }

        let names = self.names.as_mut().ok_or(ChannelError::NotConfigured)?;
        let path = names.peek_name()?;
        let encoder = create_encoder(
            config.encoding(),
            &path,
            config.kind,
            config.buffer_capacity,
        )
        .map_err(|e| e.at_stage(IoStage::NextChunkOpen))?;
        names.commit();

        tracing::info!(
            channel_id = %self.channel_id,
            chunk = %path.display(),
            index = names.current_index(),
            epochs = self.epochs.epochs_in_current_chunk,
            "chunk rotated"
        );

        self.transport = Some(Transport::File(encoder));
        self.epochs.epochs_in_current_chunk = 0;
        self.stats.chunks_opened += 1;
        self.stats.current_chunk = Some(path);
        Ok(())
    }

    fn header(&self, config: &FileConfig) -> ChannelHeader {
        ChannelHeader {
            version: HEADER_VERSION,
            channel_id: self.channel_id,
            kind: config.kind,
            encoding: config.encoding(),
            base_path: config.base_path.display().to_string(),
            separator: config.separator,
            suffix_width: config.suffix_width,
            max_epochs_per_chunk: config.max_epochs_per_chunk,
            created: chrono::Utc::now().to_rfc3339(),
            lineage: config.lineage.clone(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Whether the channel accepts records.
    pub fn is_open(&self) -> bool {
        self.state == ChannelState::Open
    }

    /// Configuration, if set.
    pub fn config(&self) -> Option<&ChannelConfig> {
        self.config.as_ref()
    }

    /// Unique id of this channel instance, written into the header.
    pub fn channel_id(&self) -> Uuid {
        self.channel_id
    }

    /// Write counters.
    pub fn stats(&self) -> &ChannelStats {
        &self.stats
    }

    /// Path of the chunk currently written (file mode).
    pub fn current_chunk(&self) -> Option<&Path> {
        self.stats.current_chunk.as_deref()
    }

    /// Time tag of the last l-record (file mode).
    pub fn last_time_tag(&self) -> Option<f64> {
        self.epochs
            .first_write_done
            .then_some(self.epochs.last_time_tag)
    }

    /// Distinct epochs in the current chunk (file mode).
    pub fn epochs_in_current_chunk(&self) -> u32 {
        self.epochs.epochs_in_current_chunk
    }
}

impl Drop for DataChannel {
    fn drop(&mut self) {
        if self.state == ChannelState::Open {
            tracing::warn!(
                channel_id = %self.channel_id,
                "data channel dropped while open, closing"
            );
            let _ = self.close();
        }
    }
}

// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Astrolabe
//!
//! Epoch-chunked data channel for astrometric calibration records.
//!
//! A [`DataChannel`] accepts two kinds of records:
//! - **l-records** ([`LRecord`]): parameter estimates with expectations and
//!   an optional packed covariance
//! - **o-records** ([`ORecord`]): observation links referencing parameter,
//!   observation and instrument instance ids
//!
//! Records are written either to a sequence of chunk files, rotated by the
//! number of distinct epochs (time tags) they contain, or to a TCP peer.
//!
//! ## Architecture
//!
//! - `core/` - Record types, channel kinds, encodings and the error taxonomy
//! - `io/` - Encoders, record buffer, chunk naming, header, socket, readers
//! - `channel/` - Configuration, lifecycle and the rotation policy
//!
//! ## Example: Writing a file channel
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use astrolabe::{DataChannel, FileConfig, LRecord, Lineage};
//!
//! let mut channel = DataChannel::new();
//! channel.set_file_channel(
//!     FileConfig::new("run/params.hdr", "run/params", Lineage::new("solver"))
//!         .binary(true)
//!         .max_epochs_per_chunk(10),
//! )?;
//! channel.open()?;
//! for epoch in 0..25 {
//!     let record = LRecord::new("ATT", 1, epoch as f64).with_expectations(vec![0.5, 0.25]);
//!     channel.write_l(&record)?;
//! }
//! channel.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Example: Reading a chunk back
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use astrolabe::ChunkReader;
//!
//! let reader = ChunkReader::open("run/params_0001")?;
//! for record in reader.iter()? {
//!     let record = record?;
//!     println!("{} @ {}", record.identifier(), record.time());
//! }
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use core::{
    Argument, ChannelError, ChannelKind, Encoding, ErrorKind, IoStage, LRecord, ORecord, Record,
    Result,
};

// Transport layer (encoders, buffer, naming, header, socket, readers)
pub mod io;

// Re-export key I/O types
pub use io::{
    ChannelHeader, ChunkNameGenerator, ChunkReader, ChunkSummary, HeaderWriter, Lineage,
    RecordEncoder, SocketTransport,
};

// Channel orchestration
pub mod channel;

pub use channel::{
    ChannelConfig, ChannelState, ChannelStats, DataChannel, FileConfig, SocketConfig,
};

// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Transport layer of the data channel.
//!
//! This module provides the record encoders, their bounded buffer, the
//! collaborators used when opening a file channel (chunk naming, header
//! metadata), the socket transport and the chunk readers.

pub mod buffer;
pub mod chunk_name;
pub mod detection;
pub mod encoder;
pub mod header;
pub mod reader;
pub mod socket;

// Re-exports
pub use buffer::{RecordBuffer, DEFAULT_BUFFER_CAPACITY};
pub use chunk_name::ChunkNameGenerator;
pub use detection::{detect_chunk_encoding, detect_encoding};
pub use encoder::{create_encoder, BinaryEncoder, RecordEncoder, TextEncoder};
pub use header::{ChannelHeader, HeaderWriter, Lineage};
pub use reader::{decode_stream, ChunkReader, ChunkSummary};
pub use socket::SocketTransport;

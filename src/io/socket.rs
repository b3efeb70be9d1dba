// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Socket transport for streaming records to a peer.
//!
//! The socket transport bypasses chunking and epoch bookkeeping: every
//! record is validated for shape, framed with the binary record layout and
//! written to the connection. The stream starts with the binary chunk
//! preamble so a peer can persist it verbatim as a binary chunk.
//!
//! Client mode connects to `host:port`; server mode listens on `port` and
//! blocks in `accept` until one peer connects. There is no timeout.

use std::io::{BufWriter, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};

use crate::channel::config::SocketConfig;
use crate::core::{ChannelError, IoStage, LRecord, ORecord, Result};
use crate::io::encoder::binary::{BinaryFormat, PREAMBLE};
use crate::io::encoder::{validate_l, validate_o, RecordFormat};

/// Record stream over one TCP connection.
pub struct SocketTransport {
    writer: Option<BufWriter<TcpStream>>,
    peer: SocketAddr,
    scratch: Vec<u8>,
    records: u64,
}

impl SocketTransport {
    /// Establish the connection described by `config`.
    ///
    /// Blocks until connected (client mode) or until a peer is accepted
    /// (server mode).
    pub fn open(config: &SocketConfig) -> Result<Self> {
        let stream = if config.server_mode {
            let listener = TcpListener::bind(("0.0.0.0", config.port)).map_err(|e| {
                ChannelError::io(
                    IoStage::Connection,
                    format!("Failed to listen on port {}: {e}", config.port),
                )
            })?;
            tracing::info!(port = config.port, "waiting for data channel peer");
            let (stream, _) = listener.accept().map_err(|e| {
                ChannelError::io(IoStage::Connection, format!("Failed to accept peer: {e}"))
            })?;
            stream
        } else {
            let host = config.host.as_deref().unwrap_or_default();
            TcpStream::connect((host, config.port)).map_err(|e| {
                ChannelError::io(
                    IoStage::Connection,
                    format!("Failed to connect to {host}:{}: {e}", config.port),
                )
            })?
        };

        let peer = stream
            .peer_addr()
            .map_err(|e| ChannelError::io(IoStage::Connection, e.to_string()))?;
        stream
            .set_nodelay(true)
            .map_err(|e| ChannelError::io(IoStage::Connection, e.to_string()))?;

        let mut writer = BufWriter::new(stream);
        writer
            .write_all(&PREAMBLE)
            .map_err(|e| ChannelError::io(IoStage::Connection, e.to_string()))?;

        tracing::info!(peer = %peer, server_mode = config.server_mode, "socket transport open");
        Ok(Self {
            writer: Some(writer),
            peer,
            scratch: Vec::with_capacity(256),
            records: 0,
        })
    }

    /// Address of the connected peer.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Number of records sent so far.
    pub fn records_written(&self) -> u64 {
        self.records
    }

    /// Whether the connection is still open.
    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Send one l-record.
    pub fn write_l(&mut self, record: &LRecord) -> Result<()> {
        validate_l(record)?;
        self.scratch.clear();
        BinaryFormat.encode_l(record, &mut self.scratch);
        self.send()
    }

    /// Send one o-record. No epoch ordering is enforced on sockets.
    pub fn write_o(&mut self, record: &ORecord) -> Result<()> {
        validate_o(record)?;
        self.scratch.clear();
        BinaryFormat.encode_o(record, &mut self.scratch);
        self.send()
    }

    /// Flush pending bytes and shut the connection down.
    pub fn close(&mut self) -> Result<()> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };
        writer
            .flush()
            .map_err(|e| ChannelError::io(IoStage::Connection, e.to_string()))?;
        let stream = writer
            .into_inner()
            .map_err(|e| ChannelError::io(IoStage::Connection, e.to_string()))?;
        // The peer may already be gone; closing still succeeds.
        let _ = stream.shutdown(Shutdown::Both);
        tracing::info!(peer = %self.peer, records = self.records, "socket transport closed");
        Ok(())
    }

    fn send(&mut self) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(ChannelError::NotOpen)?;
        writer
            .write_all(&self.scratch)
            .map_err(|e| ChannelError::io(IoStage::Connection, e.to_string()))?;
        self.records += 1;
        Ok(())
    }
}

impl Drop for SocketTransport {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(peer = %self.peer, error = %e, "socket close failed on drop");
        }
    }
}

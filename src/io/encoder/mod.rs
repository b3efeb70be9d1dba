// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Record encoders bound to a single chunk file.
//!
//! A [`RecordEncoder`] owns one chunk file and one [`RecordBuffer`]. It
//! validates each record, serializes it with its wire format, appends the
//! bytes to the buffer (flushing to disk on overflow) and flushes the
//! remainder on close.
//!
//! Both encodings share the same contract:
//! - o-records are refused outright on channel kinds that exclude them
//! - identifiers must be non-empty
//! - o-records need non-empty parameter and observation lists
//! - an active o-record must follow an l-record with the same time tag
//!
//! Only the byte layout differs, see [`text`] and [`binary`].

pub mod binary;
pub mod text;

pub use binary::{BinaryEncoder, BinaryFormat};
pub use text::{TextEncoder, TextFormat};

use std::any::Any;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::record::packed_covariance_len;
use crate::core::{
    Argument, ChannelError, ChannelKind, Encoding, IoStage, LRecord, ORecord, Result,
};
use crate::io::buffer::RecordBuffer;

/// Interface shared by the binary and text chunk encoders.
pub trait RecordEncoder: Send {
    /// Encoding produced by this encoder.
    fn encoding(&self) -> Encoding;

    /// Path of the chunk file this encoder is bound to.
    fn path(&self) -> &Path;

    /// Check an l-record against the shared rules and this encoding's
    /// identifier rules without writing it.
    fn check_l(&self, record: &LRecord) -> Result<()>;

    /// Validate and encode one l-record.
    fn write_l(&mut self, record: &LRecord) -> Result<()>;

    /// Validate and encode one o-record.
    fn write_o(&mut self, record: &ORecord) -> Result<()>;

    /// Flush buffered records and close the chunk file.
    ///
    /// Closing an already closed encoder succeeds without effect.
    fn close(&mut self) -> Result<()>;

    /// Whether the chunk file is still open.
    fn is_open(&self) -> bool;

    /// Number of records encoded so far.
    fn records_written(&self) -> u64;

    /// Bytes currently held in the buffer.
    fn bytes_buffered(&self) -> usize;

    /// Downcast to `Any` for accessing encoding-specific functionality.
    fn as_any(&self) -> &dyn Any;
}

/// Wire layout of one chunk encoding.
pub trait RecordFormat: Send + Default + 'static {
    /// Encoding identifier.
    const ENCODING: Encoding;

    /// Bytes written once at the start of every chunk file.
    fn preamble(&self) -> &'static [u8];

    /// Reject identifiers this layout cannot represent.
    fn check_identifier(&self, _identifier: &str) -> Result<()> {
        Ok(())
    }

    /// Serialize an l-record, appending to `out`.
    fn encode_l(&self, record: &LRecord, out: &mut Vec<u8>);

    /// Serialize an o-record, appending to `out`.
    fn encode_o(&self, record: &ORecord, out: &mut Vec<u8>);
}

/// Create the encoder for `encoding` on a fresh chunk file.
pub fn create_encoder(
    encoding: Encoding,
    path: &Path,
    kind: ChannelKind,
    buffer_capacity: usize,
) -> Result<Box<dyn RecordEncoder>> {
    Ok(match encoding {
        Encoding::Binary => Box::new(BinaryEncoder::create(path, kind, buffer_capacity)?),
        Encoding::Text => Box::new(TextEncoder::create(path, kind, buffer_capacity)?),
    })
}

/// Epoch ordering state of one chunk.
#[derive(Debug, Clone, Copy, Default)]
struct EpochTracker {
    /// Time tag of the last l-record, `None` until one is written
    last_l_time: Option<f64>,
}

impl EpochTracker {
    fn record_l(&mut self, time: f64) {
        self.last_l_time = Some(time);
    }

    fn check_o(&self, time: f64) -> Result<()> {
        match self.last_l_time {
            None => Err(ChannelError::ordering(
                "active o-record written before any l-record of its epoch",
            )),
            Some(last) if last != time => Err(ChannelError::ordering(format!(
                "active o-record time {time:?} differs from the current epoch {last:?}"
            ))),
            Some(_) => Ok(()),
        }
    }
}

/// Chunk encoder generic over the wire layout.
pub struct ChunkEncoder<F: RecordFormat> {
    format: F,
    path: PathBuf,
    file: Option<File>,
    buffer: RecordBuffer,
    kind: ChannelKind,
    epochs: EpochTracker,
    scratch: Vec<u8>,
    records: u64,
}

impl<F: RecordFormat> ChunkEncoder<F> {
    /// Create the chunk file and write its preamble.
    pub fn create<P: AsRef<Path>>(
        path: P,
        kind: ChannelKind,
        buffer_capacity: usize,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::create(&path).map_err(|e| {
            ChannelError::io(
                IoStage::ChunkOpen,
                format!("Failed to create chunk {}: {e}", path.display()),
            )
        })?;

        let format = F::default();
        let preamble = format.preamble();
        if !preamble.is_empty() {
            file.write_all(preamble).map_err(|e| {
                ChannelError::io(
                    IoStage::ChunkOpen,
                    format!("Failed to write chunk preamble {}: {e}", path.display()),
                )
            })?;
        }

        Ok(Self {
            format,
            path,
            file: Some(file),
            buffer: RecordBuffer::with_capacity(buffer_capacity),
            kind,
            epochs: EpochTracker::default(),
            scratch: Vec::with_capacity(256),
            records: 0,
        })
    }

    /// Channel kind this encoder was created for.
    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    /// The record buffer.
    pub fn buffer(&self) -> &RecordBuffer {
        &self.buffer
    }

    fn append_scratch(&mut self) -> Result<()> {
        let file = self.file.as_mut().ok_or(ChannelError::NotOpen)?;
        self.buffer.append(&self.scratch, file)?;
        self.records += 1;
        Ok(())
    }
}

impl<F: RecordFormat> RecordEncoder for ChunkEncoder<F> {
    fn encoding(&self) -> Encoding {
        F::ENCODING
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn check_l(&self, record: &LRecord) -> Result<()> {
        validate_l(record)?;
        self.format.check_identifier(&record.identifier)
    }

    fn write_l(&mut self, record: &LRecord) -> Result<()> {
        if self.file.is_none() {
            return Err(ChannelError::NotOpen);
        }
        self.check_l(record)?;

        self.scratch.clear();
        self.format.encode_l(record, &mut self.scratch);
        self.append_scratch()?;
        self.epochs.record_l(record.time);
        Ok(())
    }

    fn write_o(&mut self, record: &ORecord) -> Result<()> {
        if !self.kind.accepts_o_records() {
            return Err(ChannelError::unsupported("o", self.kind.as_str()));
        }
        if self.file.is_none() {
            return Err(ChannelError::NotOpen);
        }
        validate_o(record)?;
        self.format.check_identifier(&record.identifier)?;
        if record.active {
            self.epochs.check_o(record.time)?;
        }

        self.scratch.clear();
        self.format.encode_o(record, &mut self.scratch);
        self.append_scratch()
    }

    fn close(&mut self) -> Result<()> {
        let Some(mut file) = self.file.take() else {
            return Ok(());
        };

        self.buffer
            .flush_to(&mut file)
            .map_err(|e| e.at_stage(IoStage::ChunkClose))?;
        file.flush().map_err(|e| {
            ChannelError::io(
                IoStage::ChunkClose,
                format!("Failed to close chunk {}: {e}", self.path.display()),
            )
        })?;

        tracing::debug!(
            path = %self.path.display(),
            encoding = F::ENCODING.as_str(),
            records = self.records,
            bytes = self.buffer.bytes_flushed(),
            "chunk encoder closed"
        );
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn records_written(&self) -> u64 {
        self.records
    }

    fn bytes_buffered(&self) -> usize {
        self.buffer.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<F: RecordFormat> Drop for ChunkEncoder<F> {
    fn drop(&mut self) {
        if self.file.is_some() {
            if let Err(e) = self.close() {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "chunk encoder close failed on drop"
                );
            }
        }
    }
}

/// Validate a record identifier.
///
/// Applies to every transport: identifiers are non-empty and fit the `u16`
/// length prefix of binary frames. Text chunks add their own rules, see
/// [`text::validate_text_identifier`].
pub fn validate_identifier(identifier: &str) -> Result<()> {
    if identifier.is_empty() {
        return Err(ChannelError::invalid(
            Argument::Identifier,
            "identifier must not be empty",
        ));
    }
    if identifier.len() > u16::MAX as usize {
        return Err(ChannelError::invalid(
            Argument::Identifier,
            format!("identifier is {} bytes long", identifier.len()),
        ));
    }
    Ok(())
}

/// Validate the fields of an l-record.
pub fn validate_l(record: &LRecord) -> Result<()> {
    validate_identifier(&record.identifier)?;
    if record.expectations.is_empty() {
        return Err(ChannelError::invalid(
            Argument::Expectations,
            "at least one expectation value is required",
        ));
    }
    let expected = packed_covariance_len(record.expectations.len());
    if record.has_covariance() && record.covariance.len() != expected {
        return Err(ChannelError::invalid(
            Argument::Covariance,
            format!(
                "covariance has {} entries, expected {expected} for {} expectations",
                record.covariance.len(),
                record.expectations.len()
            ),
        ));
    }
    Ok(())
}

/// Validate the fields of an o-record (ordering excluded).
pub fn validate_o(record: &ORecord) -> Result<()> {
    validate_identifier(&record.identifier)?;
    if record.parameter_iids.is_empty() || record.observation_iids.is_empty() {
        return Err(ChannelError::invalid(
            Argument::IdentifierLists,
            format!(
                "parameter ({}) and observation ({}) lists must not be empty",
                record.parameter_iids.len(),
                record.observation_iids.len()
            ),
        ));
    }
    Ok(())
}

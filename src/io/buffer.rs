// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Bounded record buffer with flush-on-overflow.
//!
//! A [`RecordBuffer`] holds encoded records in a fixed-capacity byte region.
//! Appending a record that does not fit in the remaining capacity first
//! flushes the buffered bytes to the sink and resets the cursor to zero.
//! A single record larger than the whole capacity is written straight
//! through to the sink, so memory use never exceeds the capacity.

use std::io::Write;

use crate::core::{ChannelError, IoStage, Result};

/// Default buffer capacity (64KB)
pub const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

/// Smallest accepted buffer capacity
pub const MIN_BUFFER_CAPACITY: usize = 64;

/// Fixed-capacity byte buffer owned by one chunk encoder.
#[derive(Debug)]
pub struct RecordBuffer {
    /// Buffered bytes; `data.len()` is the write cursor
    data: Vec<u8>,
    /// Capacity fixed at construction
    capacity: usize,
    /// Number of flushes that reached the sink
    flushes: u64,
    /// Total bytes handed to the sink
    bytes_flushed: u64,
}

impl RecordBuffer {
    /// Create a buffer with the given fixed capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity >= MIN_BUFFER_CAPACITY);
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
            flushes: 0,
            bytes_flushed: 0,
        }
    }

    /// Fixed capacity in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current cursor position (bytes buffered).
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes that can still be appended without a flush.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity - self.data.len()
    }

    /// Number of flushes performed so far.
    pub fn flush_count(&self) -> u64 {
        self.flushes
    }

    /// Total bytes written to the sink so far.
    pub fn bytes_flushed(&self) -> u64 {
        self.bytes_flushed
    }

    /// Buffered bytes not yet flushed.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Append one encoded record, flushing first if it does not fit.
    pub fn append<W: Write>(&mut self, bytes: &[u8], sink: &mut W) -> Result<()> {
        if bytes.len() > self.remaining() {
            self.flush_to(sink)?;
        }

        if bytes.len() > self.capacity {
            // Oversized record: write through, the buffer stays empty.
            sink.write_all(bytes)
                .map_err(|e| ChannelError::io(IoStage::Write, e.to_string()))?;
            self.flushes += 1;
            self.bytes_flushed += bytes.len() as u64;
            return Ok(());
        }

        self.data.extend_from_slice(bytes);
        debug_assert!(self.data.len() <= self.capacity);
        Ok(())
    }

    /// Write all buffered bytes to the sink and reset the cursor.
    pub fn flush_to<W: Write>(&mut self, sink: &mut W) -> Result<()> {
        if self.data.is_empty() {
            return Ok(());
        }

        sink.write_all(&self.data)
            .map_err(|e| ChannelError::io(IoStage::Write, e.to_string()))?;
        tracing::debug!(
            bytes = self.data.len(),
            flushes = self.flushes + 1,
            "record buffer flushed"
        );
        self.flushes += 1;
        self.bytes_flushed += self.data.len() as u64;
        self.data.clear();
        Ok(())
    }

    /// Drop buffered bytes without writing them.
    pub fn reset(&mut self) {
        self.data.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_append_within_capacity_stays_buffered() {
        let mut buffer = RecordBuffer::with_capacity(64);
        let mut sink = Vec::new();
        buffer.append(&[1u8; 40], &mut sink).unwrap();
        assert_eq!(buffer.len(), 40);
        assert_eq!(buffer.remaining(), 24);
        assert!(sink.is_empty());
        assert_eq!(buffer.flush_count(), 0);
    }

    #[test]
    fn test_append_overflow_flushes_first() {
        let mut buffer = RecordBuffer::with_capacity(64);
        let mut sink = Vec::new();
        buffer.append(&[1u8; 40], &mut sink).unwrap();
        buffer.append(&[2u8; 30], &mut sink).unwrap();

        assert_eq!(sink, vec![1u8; 40]);
        assert_eq!(buffer.as_bytes(), &[2u8; 30][..]);
        assert_eq!(buffer.flush_count(), 1);
    }

    #[test]
    fn test_exact_fit_does_not_flush() {
        let mut buffer = RecordBuffer::with_capacity(64);
        let mut sink = Vec::new();
        buffer.append(&[1u8; 64], &mut sink).unwrap();
        assert_eq!(buffer.remaining(), 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_oversized_record_writes_through() {
        let mut buffer = RecordBuffer::with_capacity(64);
        let mut sink = Vec::new();
        buffer.append(&[1u8; 10], &mut sink).unwrap();
        buffer.append(&[2u8; 100], &mut sink).unwrap();

        assert!(buffer.is_empty());
        assert_eq!(sink.len(), 110);
        assert_eq!(&sink[..10], &[1u8; 10]);
        assert_eq!(buffer.bytes_flushed(), 110);
    }

    #[test]
    fn test_flush_empty_is_noop() {
        let mut buffer = RecordBuffer::with_capacity(64);
        let mut sink = Vec::new();
        buffer.flush_to(&mut sink).unwrap();
        assert_eq!(buffer.flush_count(), 0);
    }

    #[test]
    fn test_flush_failure_reports_write_stage() {
        let mut buffer = RecordBuffer::with_capacity(64);
        buffer.append(&[1u8; 60], &mut Vec::new()).unwrap();
        let err = buffer.append(&[1u8; 10], &mut FailingSink).unwrap_err();
        assert!(matches!(
            err,
            ChannelError::Io {
                stage: IoStage::Write,
                ..
            }
        ));
        assert_eq!(err.status(), 2);
    }

    #[test]
    fn test_reset_discards() {
        let mut buffer = RecordBuffer::with_capacity(64);
        buffer.append(&[1u8; 8], &mut Vec::new()).unwrap();
        buffer.reset();
        assert!(buffer.is_empty());
    }
}

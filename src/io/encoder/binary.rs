// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Fixed-width binary chunk encoding.
//!
//! # Layout
//!
//! A binary chunk starts with the 8-byte magic `ASTROCHK` followed by a
//! `u16` format version. Records follow as frames:
//!
//! | Field   | Type       |
//! |---------|------------|
//! | opcode  | u8         |
//! | length  | u32        |
//! | payload | `length` B |
//! | crc     | u32 (CRC32 of payload) |
//!
//! l-record payload: active (u8), identifier (u16 length + bytes),
//! instance id (i32), time (f64), then three `u32`-counted arrays:
//! tags (i32), expectations (f64), covariance (f64).
//!
//! o-record payload: active (u8), identifier (u16 length + bytes),
//! time (f64), then three `u32`-counted i32 arrays: parameter,
//! observation and instrument instance identifiers.
//!
//! All integers and floats are little-endian.

use crate::core::{Encoding, LRecord, ORecord};

use super::{ChunkEncoder, RecordFormat};

/// Magic bytes at the start of every binary chunk
pub const CHUNK_MAGIC: [u8; 8] = *b"ASTROCHK";

/// Binary chunk format version
pub const FORMAT_VERSION: u16 = 1;

/// Magic followed by the format version
pub const PREAMBLE: [u8; 10] = [b'A', b'S', b'T', b'R', b'O', b'C', b'H', b'K', 1, 0];

/// Opcode of l-record frames
pub const OP_L_RECORD: u8 = 0x01;

/// Opcode of o-record frames
pub const OP_O_RECORD: u8 = 0x02;

/// Bytes of frame overhead around the payload (opcode + length + crc)
pub const FRAME_OVERHEAD: usize = 1 + 4 + 4;

/// Binary chunk encoder.
pub type BinaryEncoder = ChunkEncoder<BinaryFormat>;

/// Little-endian framed record layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryFormat;

impl BinaryFormat {
    /// Serialize the payload of an l-record.
    pub fn l_payload(record: &LRecord, out: &mut Vec<u8>) {
        out.reserve(
            1 + 2
                + record.identifier.len()
                + 4
                + 8
                + 12
                + 4 * record.tags.len()
                + 8 * (record.expectations.len() + record.covariance.len()),
        );
        out.push(record.active as u8);
        write_identifier(out, &record.identifier);
        out.extend_from_slice(&record.instance_id.to_le_bytes());
        out.extend_from_slice(&record.time.to_le_bytes());
        write_i32s(out, &record.tags);
        write_f64s(out, &record.expectations);
        write_f64s(out, &record.covariance);
    }

    /// Serialize the payload of an o-record.
    pub fn o_payload(record: &ORecord, out: &mut Vec<u8>) {
        out.reserve(1 + 2 + record.identifier.len() + 8 + 12 + 4 * record.iid_count());
        out.push(record.active as u8);
        write_identifier(out, &record.identifier);
        out.extend_from_slice(&record.time.to_le_bytes());
        write_i32s(out, &record.parameter_iids);
        write_i32s(out, &record.observation_iids);
        write_i32s(out, &record.instrument_iids);
    }

    /// Wrap an already serialized payload into a frame.
    pub fn frame(opcode: u8, payload: &[u8], out: &mut Vec<u8>) {
        out.reserve(FRAME_OVERHEAD + payload.len());
        out.push(opcode);
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(payload);
        out.extend_from_slice(&crc32fast::hash(payload).to_le_bytes());
    }
}

impl RecordFormat for BinaryFormat {
    const ENCODING: Encoding = Encoding::Binary;

    fn preamble(&self) -> &'static [u8] {
        &PREAMBLE
    }

    fn encode_l(&self, record: &LRecord, out: &mut Vec<u8>) {
        let mut payload = Vec::new();
        Self::l_payload(record, &mut payload);
        Self::frame(OP_L_RECORD, &payload, out);
    }

    fn encode_o(&self, record: &ORecord, out: &mut Vec<u8>) {
        let mut payload = Vec::new();
        Self::o_payload(record, &mut payload);
        Self::frame(OP_O_RECORD, &payload, out);
    }
}

fn write_identifier(out: &mut Vec<u8>, identifier: &str) {
    debug_assert!(identifier.len() <= u16::MAX as usize);
    out.extend_from_slice(&(identifier.len() as u16).to_le_bytes());
    out.extend_from_slice(identifier.as_bytes());
}

fn write_i32s(out: &mut Vec<u8>, values: &[i32]) {
    out.extend_from_slice(&(values.len() as u32).to_le_bytes());
    for &v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

fn write_f64s(out: &mut Vec<u8>, values: &[f64]) {
    out.extend_from_slice(&(values.len() as u32).to_le_bytes());
    for &v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preamble_matches_magic_and_version() {
        assert_eq!(&PREAMBLE[..8], &CHUNK_MAGIC);
        assert_eq!(u16::from_le_bytes([PREAMBLE[8], PREAMBLE[9]]), FORMAT_VERSION);
    }

    #[test]
    fn test_orecord_frame_layout() {
        let rec = ORecord::new("OR01", 5.0, vec![10], vec![20, 21]);
        let mut out = Vec::new();
        BinaryFormat.encode_o(&rec, &mut out);

        // active + id + time + 3 counts + 3 iids
        let payload_len = 1 + (2 + 4) + 8 + 3 * 4 + 3 * 4;
        assert_eq!(out.len(), FRAME_OVERHEAD + payload_len);
        assert_eq!(out[0], OP_O_RECORD);
        assert_eq!(
            u32::from_le_bytes([out[1], out[2], out[3], out[4]]) as usize,
            payload_len
        );
        assert_eq!(out[5], 1);
        assert_eq!(&out[6..8], &4u16.to_le_bytes());
        assert_eq!(&out[8..12], b"OR01");
        assert_eq!(&out[12..20], &5.0f64.to_le_bytes());

        let crc = u32::from_le_bytes(out[out.len() - 4..].try_into().unwrap());
        assert_eq!(crc, crc32fast::hash(&out[5..out.len() - 4]));
    }

    #[test]
    fn test_lrecord_frame_layout() {
        let rec = LRecord::new("L", -3, 1.5)
            .with_active(false)
            .with_tags(vec![9])
            .with_expectations(vec![2.0]);
        let mut out = Vec::new();
        BinaryFormat.encode_l(&rec, &mut out);

        let payload_len = 1 + (2 + 1) + 4 + 8 + (4 + 4) + (4 + 8) + 4;
        assert_eq!(out.len(), FRAME_OVERHEAD + payload_len);
        assert_eq!(out[0], OP_L_RECORD);
        assert_eq!(out[5], 0);
        assert_eq!(&out[9..13], &(-3i32).to_le_bytes());
    }
}

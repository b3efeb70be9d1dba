// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decoder for binary chunks and socket captures.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::core::{ChannelError, LRecord, ORecord, Record, Result};
use crate::io::encoder::binary::{CHUNK_MAGIC, FORMAT_VERSION, OP_L_RECORD, OP_O_RECORD};

/// Iterator over the records of a binary chunk.
pub struct BinaryRecordIter<'a> {
    data: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> BinaryRecordIter<'a> {
    /// Start decoding `data`, which must begin with the chunk preamble.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        if !data.starts_with(&CHUNK_MAGIC) || data.len() < CHUNK_MAGIC.len() + 2 {
            return Err(ChannelError::corrupt("binary chunk", "missing chunk magic"));
        }
        let version = u16::from_le_bytes([data[8], data[9]]);
        if version != FORMAT_VERSION {
            return Err(ChannelError::corrupt(
                "binary chunk",
                format!("unsupported format version {version}"),
            ));
        }
        Ok(Self {
            data,
            pos: CHUNK_MAGIC.len() + 2,
            failed: false,
        })
    }

    /// Byte offset of the next frame.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn next_frame(&mut self) -> Result<Record> {
        let rest = &self.data[self.pos..];
        if rest.len() < 5 {
            return Err(self.truncated("frame header"));
        }
        let opcode = rest[0];
        let len = u32::from_le_bytes([rest[1], rest[2], rest[3], rest[4]]) as usize;
        if rest.len() < 5 + len + 4 {
            return Err(self.truncated("frame payload"));
        }
        let payload = &rest[5..5 + len];
        let crc = u32::from_le_bytes([
            rest[5 + len],
            rest[6 + len],
            rest[7 + len],
            rest[8 + len],
        ]);
        if crc != crc32fast::hash(payload) {
            return Err(ChannelError::corrupt(
                "binary chunk",
                format!("CRC mismatch in frame at offset {}", self.pos),
            ));
        }

        let record = match opcode {
            OP_L_RECORD => Record::L(decode_l(payload)?),
            OP_O_RECORD => Record::O(decode_o(payload)?),
            other => {
                return Err(ChannelError::corrupt(
                    "binary chunk",
                    format!("unknown opcode 0x{other:02x} at offset {}", self.pos),
                ))
            }
        };
        self.pos += 5 + len + 4;
        Ok(record)
    }

    fn truncated(&self, what: &str) -> ChannelError {
        ChannelError::corrupt(
            "binary chunk",
            format!("truncated {what} at offset {}", self.pos),
        )
    }
}

impl Iterator for BinaryRecordIter<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.data.len() {
            return None;
        }
        let result = self.next_frame();
        self.failed = result.is_err();
        Some(result)
    }
}

fn decode_l(payload: &[u8]) -> Result<LRecord> {
    read_l(&mut Cursor::new(payload)).map_err(|e| ChannelError::corrupt("l-record", e.to_string()))
}

fn decode_o(payload: &[u8]) -> Result<ORecord> {
    read_o(&mut Cursor::new(payload)).map_err(|e| ChannelError::corrupt("o-record", e.to_string()))
}

fn read_l(cur: &mut Cursor<&[u8]>) -> std::io::Result<LRecord> {
    let active = cur.read_u8()? != 0;
    let identifier = read_identifier(cur)?;
    let instance_id = cur.read_i32::<LittleEndian>()?;
    let time = cur.read_f64::<LittleEndian>()?;
    Ok(LRecord {
        active,
        identifier,
        instance_id,
        time,
        tags: read_i32s(cur)?,
        expectations: read_f64s(cur)?,
        covariance: read_f64s(cur)?,
    })
}

fn read_o(cur: &mut Cursor<&[u8]>) -> std::io::Result<ORecord> {
    let active = cur.read_u8()? != 0;
    let identifier = read_identifier(cur)?;
    let time = cur.read_f64::<LittleEndian>()?;
    Ok(ORecord {
        active,
        identifier,
        time,
        parameter_iids: read_i32s(cur)?,
        observation_iids: read_i32s(cur)?,
        instrument_iids: read_i32s(cur)?,
    })
}

fn read_identifier(cur: &mut Cursor<&[u8]>) -> std::io::Result<String> {
    let len = cur.read_u16::<LittleEndian>()? as usize;
    let mut bytes = vec![0u8; len];
    cur.read_exact(&mut bytes)?;
    String::from_utf8(bytes)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

fn read_count(cur: &mut Cursor<&[u8]>, elem_size: usize) -> std::io::Result<usize> {
    let count = cur.read_u32::<LittleEndian>()? as usize;
    let remaining = cur.get_ref().len() - cur.position() as usize;
    if count.saturating_mul(elem_size) > remaining {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("array of {count} elements exceeds payload"),
        ));
    }
    Ok(count)
}

fn read_i32s(cur: &mut Cursor<&[u8]>) -> std::io::Result<Vec<i32>> {
    let count = read_count(cur, 4)?;
    (0..count).map(|_| cur.read_i32::<LittleEndian>()).collect()
}

fn read_f64s(cur: &mut Cursor<&[u8]>) -> std::io::Result<Vec<f64>> {
    let count = read_count(cur, 8)?;
    (0..count).map(|_| cur.read_f64::<LittleEndian>()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::encoder::binary::{BinaryFormat, PREAMBLE};
    use crate::io::encoder::RecordFormat;

    fn chunk(records: &[Record]) -> Vec<u8> {
        let mut out = PREAMBLE.to_vec();
        for r in records {
            match r {
                Record::L(l) => BinaryFormat.encode_l(l, &mut out),
                Record::O(o) => BinaryFormat.encode_o(o, &mut out),
            }
        }
        out
    }

    #[test]
    fn test_decode_mixed_chunk() {
        let records = vec![
            Record::L(
                LRecord::new("LR01", 3, 5.0)
                    .with_tags(vec![1, -1])
                    .with_expectations(vec![0.5, 1.5])
                    .with_covariance(vec![0.1, 0.0, 0.2]),
            ),
            Record::O(ORecord::new("OR01", 5.0, vec![10], vec![20, 21]).with_instruments(vec![7])),
        ];
        let data = chunk(&records);
        let decoded: Vec<Record> = BinaryRecordIter::new(&data)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(decoded, records);
    }

    #[test]
    fn test_empty_chunk_has_no_records() {
        assert_eq!(BinaryRecordIter::new(&PREAMBLE).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_magic() {
        assert!(BinaryRecordIter::new(b"<l a X").is_err());
    }

    #[test]
    fn test_crc_mismatch_stops_iteration() {
        let mut data = chunk(&[Record::O(ORecord::new("OR", 1.0, vec![1], vec![2]))]);
        let last = data.len() - 6;
        data[last] ^= 0xff;
        let mut iter = BinaryRecordIter::new(&data).unwrap();
        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_truncated_frame() {
        let data = chunk(&[Record::O(ORecord::new("OR", 1.0, vec![1], vec![2]))]);
        let truncated = &data[..data.len() - 2];
        let err = BinaryRecordIter::new(truncated)
            .unwrap()
            .next()
            .unwrap()
            .unwrap_err();
        assert!(err.to_string().contains("truncated"));
    }
}

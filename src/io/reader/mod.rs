// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Chunk readers.
//!
//! [`ChunkReader`] memory-maps a chunk file, detects its encoding and
//! decodes the records back. It is used by the CLI and by tests to check
//! what the encoders produced.

pub mod binary;
pub mod text;

pub use binary::BinaryRecordIter;
pub use text::TextRecordIter;

use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::core::{ChannelError, Encoding, IoStage, Record, Result};
use crate::io::detection::detect_encoding;

/// Summary of the contents of one chunk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkSummary {
    /// Number of l-records
    pub l_records: u64,
    /// Number of o-records
    pub o_records: u64,
    /// Distinct epoch time tags, in order of first appearance
    pub epochs: Vec<f64>,
}

impl ChunkSummary {
    /// Total number of records.
    pub fn records(&self) -> u64 {
        self.l_records + self.o_records
    }
}

/// Read-only view of one chunk file.
pub struct ChunkReader {
    path: PathBuf,
    mmap: Option<Mmap>,
    encoding: Encoding,
}

impl ChunkReader {
    /// Open and memory-map a chunk file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| {
            ChannelError::io(
                IoStage::Read,
                format!("Failed to open chunk {}: {e}", path.display()),
            )
        })?;
        let len = file
            .metadata()
            .map_err(|e| ChannelError::io(IoStage::Read, e.to_string()))?
            .len();

        // Zero-length files cannot be mapped on every platform.
        let mmap = if len == 0 {
            None
        } else {
            // SAFETY: chunk files are not modified while a reader holds them.
            Some(unsafe { Mmap::map(&file) }.map_err(|e| {
                ChannelError::io(
                    IoStage::Read,
                    format!("Failed to map chunk {}: {e}", path.display()),
                )
            })?)
        };

        let bytes: &[u8] = mmap.as_deref().unwrap_or(&[]);
        let encoding = detect_encoding(bytes).ok_or_else(|| {
            ChannelError::corrupt(
                "chunk",
                format!("{} is neither a binary nor a text chunk", path.display()),
            )
        })?;

        Ok(Self {
            path,
            mmap,
            encoding,
        })
    }

    /// Path of the chunk file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Detected encoding.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Raw chunk bytes.
    pub fn bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    /// Iterate over the decoded records.
    pub fn iter(&self) -> Result<Box<dyn Iterator<Item = Result<Record>> + '_>> {
        match self.encoding {
            Encoding::Binary => Ok(Box::new(BinaryRecordIter::new(self.bytes())?)),
            Encoding::Text => {
                let text = std::str::from_utf8(self.bytes())
                    .map_err(|e| ChannelError::corrupt("text chunk", e.to_string()))?;
                Ok(Box::new(TextRecordIter::new(text)))
            }
        }
    }

    /// Decode every record of the chunk.
    pub fn records(&self) -> Result<Vec<Record>> {
        self.iter()?.collect()
    }

    /// Count records and epochs.
    pub fn summary(&self) -> Result<ChunkSummary> {
        let mut summary = ChunkSummary::default();
        for record in self.iter()? {
            let record = record?;
            match record {
                Record::L(_) => summary.l_records += 1,
                Record::O(_) => summary.o_records += 1,
            }
            if summary.epochs.last() != Some(&record.time()) {
                summary.epochs.push(record.time());
            }
        }
        Ok(summary)
    }
}

/// Decode a captured socket stream (binary preamble followed by frames).
pub fn decode_stream(bytes: &[u8]) -> Result<Vec<Record>> {
    BinaryRecordIter::new(bytes)?.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LRecord, ORecord};

    #[test]
    fn test_open_text_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("obs_1");
        std::fs::write(
            &path,
            "<l a LR 1 1.0>T E 1.0</l>\n<o a OR 1.0>P 1 O 2</o>\n<l a LR 1 2.0>T E 1.0</l>\n",
        )
        .unwrap();

        let reader = ChunkReader::open(&path).unwrap();
        assert_eq!(reader.encoding(), Encoding::Text);
        let records = reader.records().unwrap();
        assert_eq!(
            records[1],
            Record::O(ORecord::new("OR", 1.0, vec![1], vec![2]))
        );

        let summary = reader.summary().unwrap();
        assert_eq!(summary.l_records, 2);
        assert_eq!(summary.o_records, 1);
        assert_eq!(summary.epochs, vec![1.0, 2.0]);
    }

    #[test]
    fn test_open_empty_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("obs_1");
        std::fs::write(&path, b"").unwrap();
        let reader = ChunkReader::open(&path).unwrap();
        assert!(reader.records().unwrap().is_empty());
    }

    #[test]
    fn test_decode_stream() {
        use crate::io::encoder::binary::{BinaryFormat, PREAMBLE};
        use crate::io::encoder::RecordFormat;

        let rec = LRecord::new("LR", 4, 3.0).with_expectations(vec![1.0]);
        let mut bytes = PREAMBLE.to_vec();
        BinaryFormat.encode_l(&rec, &mut bytes);
        assert_eq!(decode_stream(&bytes).unwrap(), vec![Record::L(rec)]);
    }
}

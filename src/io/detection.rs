// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Chunk encoding detection.
//!
//! Binary chunks start with the `ASTROCHK` magic. Text chunks are either
//! empty or start with the opening `<` of a record tag.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::core::{ChannelError, Encoding, IoStage, Result};
use crate::io::encoder::binary::CHUNK_MAGIC;

/// Detect the encoding of chunk content from its first bytes.
///
/// Returns `None` if the bytes match neither encoding.
pub fn detect_encoding(bytes: &[u8]) -> Option<Encoding> {
    if bytes.starts_with(&CHUNK_MAGIC) {
        Some(Encoding::Binary)
    } else if bytes.is_empty() || bytes[0] == b'<' {
        Some(Encoding::Text)
    } else {
        None
    }
}

/// Detect the encoding of a chunk file.
pub fn detect_chunk_encoding<P: AsRef<Path>>(path: P) -> Result<Encoding> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| {
        ChannelError::io(
            IoStage::Read,
            format!("Failed to open {}: {e}", path.display()),
        )
    })?;

    let mut head = [0u8; CHUNK_MAGIC.len()];
    let mut filled = 0;
    while filled < head.len() {
        let n = file
            .read(&mut head[filled..])
            .map_err(|e| ChannelError::io(IoStage::Read, e.to_string()))?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    detect_encoding(&head[..filled]).ok_or_else(|| {
        ChannelError::corrupt(
            "chunk",
            format!("{} is neither a binary nor a text chunk", path.display()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_encoding() {
        assert_eq!(detect_encoding(b"ASTROCHK\x01\x00"), Some(Encoding::Binary));
        assert_eq!(detect_encoding(b"<l a X 1 1.0>"), Some(Encoding::Text));
        assert_eq!(detect_encoding(b""), Some(Encoding::Text));
        assert_eq!(detect_encoding(b"ASTRO"), None);
        assert_eq!(detect_encoding(b"{\"json\":1}"), None);
    }

    #[test]
    fn test_detect_chunk_encoding_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("c_1");
        std::fs::write(&bin, b"ASTROCHK\x01\x00").unwrap();
        assert_eq!(detect_chunk_encoding(&bin).unwrap(), Encoding::Binary);

        let empty = dir.path().join("c_2");
        std::fs::write(&empty, b"").unwrap();
        assert_eq!(detect_chunk_encoding(&empty).unwrap(), Encoding::Text);

        let junk = dir.path().join("c_3");
        std::fs::write(&junk, b"garbage").unwrap();
        assert!(detect_chunk_encoding(&junk).is_err());
    }
}

// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Channel header metadata file.
//!
//! The header is written once when a file channel is opened. It records
//! what the chunk sequence contains (channel kind, encoding, naming
//! scheme, rotation limit) together with the lineage of the data, as
//! pretty-printed JSON.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{ChannelError, ChannelKind, Encoding, IoStage, Result};

/// Header format version
pub const HEADER_VERSION: u32 = 1;

/// Provenance metadata attached to a channel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Lineage {
    /// Producer of the data (tool or pipeline name)
    pub creator: String,
    /// Producer version
    #[serde(default)]
    pub version: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Identifiers of the inputs this data was derived from
    #[serde(default)]
    pub parents: Vec<String>,
    /// Additional key/value provenance
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Lineage {
    /// Create a lineage for the given creator.
    pub fn new(creator: impl Into<String>) -> Self {
        Self {
            creator: creator.into(),
            ..Default::default()
        }
    }

    /// Set the producer version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a parent input.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parents.push(parent.into());
        self
    }

    /// Add a provenance attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Contents of a channel header file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelHeader {
    /// Header format version
    pub version: u32,
    /// Unique id of this channel instance
    pub channel_id: Uuid,
    /// Channel kind
    pub kind: ChannelKind,
    /// Chunk encoding
    pub encoding: Encoding,
    /// Base path of the chunk sequence
    pub base_path: String,
    /// Separator between base path and chunk index
    pub separator: char,
    /// Zero-padded width of the chunk index
    pub suffix_width: u32,
    /// Maximum distinct epochs per chunk
    pub max_epochs_per_chunk: u32,
    /// Creation time (RFC 3339)
    pub created: String,
    /// Provenance
    pub lineage: Lineage,
}

/// Writes and reads channel header files.
pub struct HeaderWriter;

impl HeaderWriter {
    /// Write `header` to `path`, replacing any existing file.
    pub fn write<P: AsRef<Path>>(path: P, header: &ChannelHeader) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(header).map_err(|e| {
            ChannelError::io(IoStage::Header, format!("Failed to serialize header: {e}"))
        })?;
        fs::write(path, json).map_err(|e| {
            ChannelError::io(
                IoStage::Header,
                format!("Failed to write header {}: {e}", path.display()),
            )
        })?;
        tracing::debug!(path = %path.display(), channel_id = %header.channel_id, "header written");
        Ok(())
    }

    /// Read a header file back.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<ChannelHeader> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|e| {
            ChannelError::io(
                IoStage::Read,
                format!("Failed to read header {}: {e}", path.display()),
            )
        })?;
        serde_json::from_slice(&data)
            .map_err(|e| ChannelError::corrupt("header", format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> ChannelHeader {
        ChannelHeader {
            version: HEADER_VERSION,
            channel_id: Uuid::new_v4(),
            kind: ChannelKind::Parameter,
            encoding: Encoding::Binary,
            base_path: "obs".to_string(),
            separator: '_',
            suffix_width: 3,
            max_epochs_per_chunk: 10,
            created: "2026-01-01T00:00:00+00:00".to_string(),
            lineage: Lineage::new("pipeline")
                .with_version("1.2")
                .with_parent("run-41")
                .with_attribute("site", "north"),
        }
    }

    #[test]
    fn test_write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("channel.hdr");
        let header = sample_header();

        HeaderWriter::write(&path, &header).unwrap();
        let back = HeaderWriter::read(&path).unwrap();
        assert_eq!(back, header);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"kind\": \"parameter\""));
        assert!(text.contains("\"encoding\": \"binary\""));
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("channel.hdr");
        let err = HeaderWriter::write(&path, &sample_header()).unwrap_err();
        assert!(matches!(
            err,
            ChannelError::Io {
                stage: IoStage::Header,
                ..
            }
        ));
    }

    #[test]
    fn test_lineage_defaults_on_read() {
        let lineage: Lineage = serde_json::from_str(r#"{"creator":"x"}"#).unwrap();
        assert_eq!(lineage, Lineage::new("x"));
    }
}

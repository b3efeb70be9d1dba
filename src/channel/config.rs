// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Data channel configuration.
//!
//! A channel is configured with exactly one of [`FileConfig`] (rotating
//! chunk files) or [`SocketConfig`] (record stream to a peer). Both can be
//! built in code with fluent setters or loaded from TOML through
//! [`ChannelConfig`]:
//!
//! ```toml
//! transport = "file"
//! header_path = "out/obs.hdr"
//! base_path = "out/obs"
//! binary = true
//! max_epochs_per_chunk = 100
//! suffix_width = 4
//!
//! [lineage]
//! creator = "cu3-pipeline"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{Argument, ChannelError, ChannelKind, Encoding, IoStage, Result};
use crate::io::buffer::{DEFAULT_BUFFER_CAPACITY, MIN_BUFFER_CAPACITY};
use crate::io::chunk_name::{DEFAULT_SEPARATOR, MAX_SUFFIX_WIDTH};
use crate::io::header::Lineage;

/// Default maximum number of distinct epochs per chunk
pub const DEFAULT_MAX_EPOCHS_PER_CHUNK: u32 = 100;

/// Default chunk suffix width
pub const DEFAULT_SUFFIX_WIDTH: u32 = 4;

fn default_max_epochs() -> u32 {
    DEFAULT_MAX_EPOCHS_PER_CHUNK
}

fn default_suffix_width() -> u32 {
    DEFAULT_SUFFIX_WIDTH
}

fn default_buffer_capacity() -> usize {
    DEFAULT_BUFFER_CAPACITY
}

fn default_separator() -> char {
    DEFAULT_SEPARATOR
}

/// Configuration of a rotating chunk-file channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    /// Path of the header metadata file
    pub header_path: PathBuf,
    /// Base path of the chunk files
    pub base_path: PathBuf,
    /// Binary (`true`) or text (`false`) chunk encoding
    #[serde(default)]
    pub binary: bool,
    /// Maximum distinct epochs per chunk (> 0)
    #[serde(default = "default_max_epochs")]
    pub max_epochs_per_chunk: u32,
    /// Zero-padded width of the chunk index (1..=9)
    #[serde(default = "default_suffix_width")]
    pub suffix_width: u32,
    /// Provenance written into the header
    pub lineage: Lineage,
    /// Record types carried by the channel
    #[serde(default)]
    pub kind: ChannelKind,
    /// Capacity of the per-chunk record buffer in bytes
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
    /// Separator between base path and chunk index
    #[serde(default = "default_separator")]
    pub separator: char,
}

impl FileConfig {
    /// Create a text channel configuration with default limits.
    pub fn new(
        header_path: impl Into<PathBuf>,
        base_path: impl Into<PathBuf>,
        lineage: Lineage,
    ) -> Self {
        Self {
            header_path: header_path.into(),
            base_path: base_path.into(),
            binary: false,
            max_epochs_per_chunk: DEFAULT_MAX_EPOCHS_PER_CHUNK,
            suffix_width: DEFAULT_SUFFIX_WIDTH,
            lineage,
            kind: ChannelKind::default(),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            separator: DEFAULT_SEPARATOR,
        }
    }

    /// Select binary or text encoding.
    pub fn binary(mut self, binary: bool) -> Self {
        self.binary = binary;
        self
    }

    /// Set the maximum number of distinct epochs per chunk.
    pub fn max_epochs_per_chunk(mut self, max: u32) -> Self {
        self.max_epochs_per_chunk = max;
        self
    }

    /// Set the chunk suffix width.
    pub fn suffix_width(mut self, width: u32) -> Self {
        self.suffix_width = width;
        self
    }

    /// Set the channel kind.
    pub fn kind(mut self, kind: ChannelKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the record buffer capacity.
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Set the chunk name separator.
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Chunk encoding selected by the binary flag.
    pub fn encoding(&self) -> Encoding {
        Encoding::from_binary_flag(self.binary)
    }

    /// Check the configuration, reporting the first invalid argument.
    pub fn validate(&self) -> Result<()> {
        if self.header_path.as_os_str().is_empty() {
            return Err(ChannelError::invalid(
                Argument::HeaderPath,
                "header path is not set",
            ));
        }
        if self.base_path.as_os_str().is_empty() {
            return Err(ChannelError::invalid(
                Argument::BasePath,
                "base path is not set",
            ));
        }
        if self.max_epochs_per_chunk == 0 {
            return Err(ChannelError::invalid(
                Argument::MaxEpochs,
                "max epochs per chunk must be positive",
            ));
        }
        if !(1..=MAX_SUFFIX_WIDTH).contains(&self.suffix_width) {
            return Err(ChannelError::invalid(
                Argument::SuffixWidth,
                format!(
                    "suffix width {} is outside 1..={MAX_SUFFIX_WIDTH}",
                    self.suffix_width
                ),
            ));
        }
        if self.buffer_capacity < MIN_BUFFER_CAPACITY {
            return Err(ChannelError::invalid(
                Argument::BufferCapacity,
                format!(
                    "buffer capacity {} is below {MIN_BUFFER_CAPACITY} bytes",
                    self.buffer_capacity
                ),
            ));
        }
        Ok(())
    }
}

/// Configuration of a socket channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketConfig {
    /// Peer host, required in client mode
    #[serde(default)]
    pub host: Option<String>,
    /// Port to connect to or listen on (1..=65535)
    pub port: u16,
    /// Listen and accept one peer instead of connecting
    #[serde(default)]
    pub server_mode: bool,
}

impl SocketConfig {
    /// Client configuration connecting to `host:port`.
    pub fn client(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: Some(host.into()),
            port,
            server_mode: false,
        }
    }

    /// Server configuration listening on `port`.
    pub fn server(port: u16) -> Self {
        Self {
            host: None,
            port,
            server_mode: true,
        }
    }

    /// Check the configuration, reporting the first invalid argument.
    pub fn validate(&self) -> Result<()> {
        if !self.server_mode && self.host.as_deref().is_none_or(str::is_empty) {
            return Err(ChannelError::invalid(
                Argument::Host,
                "host is required in client mode",
            ));
        }
        if self.port == 0 {
            return Err(ChannelError::invalid(
                Argument::Port,
                "port must be in 1..=65535",
            ));
        }
        Ok(())
    }
}

/// Either channel configuration, as loaded from a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "transport", rename_all = "lowercase")]
pub enum ChannelConfig {
    /// Rotating chunk files
    File(FileConfig),
    /// Record stream over TCP
    Socket(SocketConfig),
}

impl ChannelConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ChannelError::corrupt("channel config", e.to_string()))
    }

    /// Load a configuration from a TOML file.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            ChannelError::io(
                IoStage::Read,
                format!("Failed to read config {}: {e}", path.display()),
            )
        })?;
        Self::from_toml_str(&text)
    }

    /// Check the configuration, reporting the first invalid argument.
    pub fn validate(&self) -> Result<()> {
        match self {
            ChannelConfig::File(c) => c.validate(),
            ChannelConfig::Socket(c) => c.validate(),
        }
    }
}

impl From<FileConfig> for ChannelConfig {
    fn from(config: FileConfig) -> Self {
        ChannelConfig::File(config)
    }
}

impl From<SocketConfig> for ChannelConfig {
    fn from(config: SocketConfig) -> Self {
        ChannelConfig::Socket(config)
    }
}

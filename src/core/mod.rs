// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout astrolabe.
//!
//! This module provides the foundational types for the library:
//! - [`ChannelError`] - Error taxonomy with status codes
//! - [`LRecord`] / [`ORecord`] - The two record types of a channel
//! - [`ChannelKind`] - Which record types a channel accepts
//! - [`Encoding`] - Chunk encoding identifier

pub mod error;
pub mod record;

pub use error::{Argument, ChannelError, ErrorKind, IoStage, Result};
pub use record::{LRecord, ORecord, Record};

use serde::{Deserialize, Serialize};

/// Chunk encoding identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Fixed-width little-endian frames
    Binary,
    /// Tagged ASCII lines
    #[default]
    Text,
}

/// Error returned when parsing an `Encoding` from string fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseEncodingError {
    _private: (),
}

impl std::fmt::Display for ParseEncodingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid encoding name, expected 'binary' or 'text'")
    }
}

impl std::error::Error for ParseEncodingError {}

impl std::str::FromStr for Encoding {
    type Err = ParseEncodingError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "binary" | "bin" => Ok(Encoding::Binary),
            "text" | "txt" => Ok(Encoding::Text),
            _ => Err(ParseEncodingError { _private: () }),
        }
    }
}

impl Encoding {
    /// Select the encoding from a binary flag.
    pub fn from_binary_flag(binary: bool) -> Self {
        if binary {
            Encoding::Binary
        } else {
            Encoding::Text
        }
    }

    /// Check if this encoding is binary.
    pub fn is_binary(&self) -> bool {
        matches!(self, Encoding::Binary)
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Binary => "binary",
            Encoding::Text => "text",
        }
    }
}

/// Kind of data carried by a channel.
///
/// Pure parameter and pure instrument channels carry l-records only and
/// structurally reject o-records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Parameter expectations annotated by o-records
    #[default]
    ParameterObservation,
    /// Parameter expectations only
    Parameter,
    /// Instrument expectations only
    Instrument,
}

impl ChannelKind {
    /// Whether o-records may be written to this kind of channel.
    pub fn accepts_o_records(&self) -> bool {
        matches!(self, ChannelKind::ParameterObservation)
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::ParameterObservation => "parameter_observation",
            ChannelKind::Parameter => "parameter",
            ChannelKind::Instrument => "instrument",
        }
    }
}

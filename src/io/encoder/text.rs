// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Tagged ASCII chunk encoding.
//!
//! One record per line:
//!
//! ```text
//! <l a LR01 7 5.0>T 1 2 E 0.5 1.5 C 0.1 0.0 0.2</l>
//! <o a OR01 5.0>P 10 O 20 21 I 30</o>
//! ```
//!
//! The marker after the record letter is `a` for active records and `r`
//! for removed ones. The `C` block of l-records and the `I` list of
//! o-records are omitted when empty. Floats use the shortest
//! representation that parses back to the same value.

use std::fmt::Write as _;

use crate::core::{Argument, ChannelError, Encoding, LRecord, ORecord, Result};

use super::{ChunkEncoder, RecordFormat};

/// Line terminator of text chunks
pub const NEWLINE: &str = "\n";

/// Marker for active records
pub const ACTIVE_MARKER: char = 'a';

/// Marker for removed records
pub const REMOVED_MARKER: char = 'r';

/// Opening tag letter of l-records
pub const L_TAG: &str = "l";

/// Opening tag letter of o-records
pub const O_TAG: &str = "o";

/// Text chunk encoder.
pub type TextEncoder = ChunkEncoder<TextFormat>;

/// Tagged ASCII record layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormat;

impl RecordFormat for TextFormat {
    const ENCODING: Encoding = Encoding::Text;

    fn preamble(&self) -> &'static [u8] {
        b""
    }

    fn check_identifier(&self, identifier: &str) -> Result<()> {
        validate_text_identifier(identifier)
    }

    fn encode_l(&self, record: &LRecord, out: &mut Vec<u8>) {
        let mut line = String::with_capacity(
            32 + record.identifier.len()
                + 12 * record.tags.len()
                + 24 * (record.expectations.len() + record.covariance.len()),
        );
        let _ = write!(
            line,
            "<{L_TAG} {} {} {} {:?}>T",
            marker(record.active),
            record.identifier,
            record.instance_id,
            record.time
        );
        push_ints(&mut line, &record.tags);
        line.push_str(" E");
        push_floats(&mut line, &record.expectations);
        if record.has_covariance() {
            line.push_str(" C");
            push_floats(&mut line, &record.covariance);
        }
        let _ = write!(line, "</{L_TAG}>{NEWLINE}");
        out.extend_from_slice(line.as_bytes());
    }

    fn encode_o(&self, record: &ORecord, out: &mut Vec<u8>) {
        let mut line =
            String::with_capacity(32 + record.identifier.len() + 12 * record.iid_count());
        let _ = write!(
            line,
            "<{O_TAG} {} {} {:?}>P",
            marker(record.active),
            record.identifier,
            record.time
        );
        push_ints(&mut line, &record.parameter_iids);
        line.push_str(" O");
        push_ints(&mut line, &record.observation_iids);
        if !record.instrument_iids.is_empty() {
            line.push_str(" I");
            push_ints(&mut line, &record.instrument_iids);
        }
        let _ = write!(line, "</{O_TAG}>{NEWLINE}");
        out.extend_from_slice(line.as_bytes());
    }
}

/// Validate an identifier for text chunks.
///
/// Identifiers are written unquoted inside the opening tag, so they cannot
/// contain whitespace or angle brackets.
pub fn validate_text_identifier(identifier: &str) -> Result<()> {
    if identifier
        .chars()
        .any(|c| c.is_whitespace() || c == '<' || c == '>')
    {
        return Err(ChannelError::invalid(
            Argument::Identifier,
            format!("identifier '{identifier}' contains whitespace or angle brackets"),
        ));
    }
    Ok(())
}

fn marker(active: bool) -> char {
    if active {
        ACTIVE_MARKER
    } else {
        REMOVED_MARKER
    }
}

fn push_ints(line: &mut String, values: &[i32]) {
    for v in values {
        let _ = write!(line, " {v}");
    }
}

fn push_floats(line: &mut String, values: &[f64]) {
    for v in values {
        let _ = write!(line, " {v:?}");
    }
}

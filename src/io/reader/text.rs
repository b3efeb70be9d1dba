// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Parser for tagged ASCII chunks.

use std::str::FromStr;

use crate::core::{ChannelError, LRecord, ORecord, Record, Result};
use crate::io::encoder::text::{ACTIVE_MARKER, L_TAG, O_TAG, REMOVED_MARKER};

/// Iterator over the records of a text chunk, one per non-empty line.
pub struct TextRecordIter<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> TextRecordIter<'a> {
    /// Start parsing `text`.
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
        }
    }
}

impl Iterator for TextRecordIter<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        for (index, line) in self.lines.by_ref() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            return Some(
                parse_line(line).map_err(|message| {
                    ChannelError::corrupt("text chunk", format!("line {}: {message}", index + 1))
                }),
            );
        }
        None
    }
}

/// Parse one record line.
pub fn parse_line(line: &str) -> std::result::Result<Record, String> {
    let rest = line
        .strip_prefix('<')
        .ok_or_else(|| "record does not start with '<'".to_string())?;
    let (head, rest) = rest
        .split_once('>')
        .ok_or_else(|| "unterminated opening tag".to_string())?;

    let mut fields = head.split_whitespace();
    let tag = fields.next().ok_or_else(|| "empty opening tag".to_string())?;
    let closing = format!("</{tag}>");
    let body = rest
        .strip_suffix(closing.as_str())
        .ok_or_else(|| format!("missing closing tag {closing}"))?;

    let active = match fields.next() {
        Some(m) if m.len() == 1 && m.starts_with(ACTIVE_MARKER) => true,
        Some(m) if m.len() == 1 && m.starts_with(REMOVED_MARKER) => false,
        other => return Err(format!("invalid active marker {other:?}")),
    };
    let identifier = fields
        .next()
        .ok_or_else(|| "missing identifier".to_string())?
        .to_string();

    if tag == L_TAG {
        let instance_id = parse_value::<i32>(fields.next(), "instance id")?;
        let time = parse_value::<f64>(fields.next(), "time")?;
        let sections = split_sections(body, &["T", "E", "C"])?;
        Ok(Record::L(LRecord {
            active,
            identifier,
            instance_id,
            time,
            tags: parse_list(&sections[0])?,
            expectations: parse_list(&sections[1])?,
            covariance: parse_list(&sections[2])?,
        }))
    } else if tag == O_TAG {
        let time = parse_value::<f64>(fields.next(), "time")?;
        let sections = split_sections(body, &["P", "O", "I"])?;
        Ok(Record::O(ORecord {
            active,
            identifier,
            time,
            parameter_iids: parse_list(&sections[0])?,
            observation_iids: parse_list(&sections[1])?,
            instrument_iids: parse_list(&sections[2])?,
        }))
    } else {
        Err(format!("unknown record tag '{tag}'"))
    }
}

fn parse_value<T: FromStr>(token: Option<&str>, what: &str) -> std::result::Result<T, String> {
    let token = token.ok_or_else(|| format!("missing {what}"))?;
    token
        .parse()
        .map_err(|_| format!("invalid {what} '{token}'"))
}

fn parse_list<T: FromStr>(tokens: &[&str]) -> std::result::Result<Vec<T>, String> {
    tokens
        .iter()
        .map(|t| t.parse().map_err(|_| format!("invalid value '{t}'")))
        .collect()
}

/// Split a record body on its section markers, which must appear in order.
///
/// The first marker is mandatory; later ones may be absent.
fn split_sections<'a>(
    body: &'a str,
    markers: &[&str],
) -> std::result::Result<Vec<Vec<&'a str>>, String> {
    let mut sections: Vec<Vec<&str>> = vec![Vec::new(); markers.len()];
    let mut current: Option<usize> = None;

    for token in body.split_whitespace() {
        if let Some(pos) = markers.iter().position(|m| *m == token) {
            if current.is_some_and(|c| pos <= c) || (current.is_none() && pos != 0) {
                return Err(format!("section marker '{token}' out of order"));
            }
            current = Some(pos);
        } else {
            match current {
                Some(c) => sections[c].push(token),
                None => return Err(format!("value '{token}' before first section")),
            }
        }
    }

    if current.is_none() {
        return Err(format!("missing section '{}'", markers[0]));
    }
    Ok(sections)
}

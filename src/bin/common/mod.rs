// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for CLI commands.

use std::path::Path;

use anyhow::Context as _;
use astrolabe::io::encoder::{RecordFormat, TextFormat};
use astrolabe::{ChunkReader, Record};

pub use anyhow::Result as CliResult;
pub type Result<T = ()> = CliResult<T>;

/// Open a chunk file, attaching the path to any error.
pub fn open_chunk(path: &Path) -> Result<ChunkReader> {
    ChunkReader::open(path).with_context(|| format!("Cannot read chunk {}", path.display()))
}

/// Render one record as its text chunk line, without the trailing newline.
pub fn record_line(record: &Record) -> String {
    let mut out = Vec::new();
    match record {
        Record::L(l) => TextFormat.encode_l(l, &mut out),
        Record::O(o) => TextFormat.encode_o(o, &mut out),
    }
    let mut line = String::from_utf8_lossy(&out).into_owned();
    if line.ends_with('\n') {
        line.pop();
    }
    line
}

/// Format a byte count.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GiB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MiB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KiB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Format an epoch list, eliding the middle of long lists.
pub fn format_epochs(epochs: &[f64]) -> String {
    const SHOWN: usize = 4;
    let fmt = |e: &[f64]| {
        e.iter()
            .map(|t| format!("{t:?}"))
            .collect::<Vec<_>>()
            .join(", ")
    };

    if epochs.len() <= SHOWN * 2 {
        format!("[{}]", fmt(epochs))
    } else {
        format!(
            "[{}, ... {}]",
            fmt(&epochs[..SHOWN]),
            fmt(&epochs[epochs.len() - SHOWN..])
        )
    }
}

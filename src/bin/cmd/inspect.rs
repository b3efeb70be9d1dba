// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Inspect command - show header metadata and chunk summaries.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Subcommand;

use crate::common::{format_bytes, format_epochs, open_chunk, Result};
use astrolabe::HeaderWriter;

/// Inspect header or chunk files.
#[derive(Subcommand, Clone, Debug)]
pub enum InspectCmd {
    /// Show the metadata of a channel header file
    Header {
        /// Header file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show record and epoch counts of one chunk
    Chunk {
        /// Chunk file (binary or text)
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
}

impl InspectCmd {
    pub fn run(self) -> Result<()> {
        match self {
            InspectCmd::Header { input } => cmd_header(input),
            InspectCmd::Chunk { input } => cmd_chunk(input),
        }
    }
}

/// Cmd: Show header metadata
fn cmd_header(input: PathBuf) -> Result<()> {
    let header = HeaderWriter::read(&input)
        .with_context(|| format!("Cannot read header {}", input.display()))?;

    println!("=== {} ===", input.display());
    println!("Version: {}", header.version);
    println!("Channel id: {}", header.channel_id);
    println!("Kind: {}", header.kind.as_str());
    println!("Encoding: {}", header.encoding.as_str());
    println!(
        "Chunks: {}{}{}",
        header.base_path,
        header.separator,
        "N".repeat(header.suffix_width as usize)
    );
    println!("Max epochs per chunk: {}", header.max_epochs_per_chunk);
    println!("Created: {}", header.created);

    let lineage = &header.lineage;
    println!();
    println!("Lineage:");
    println!("  Creator: {}", lineage.creator);
    if !lineage.version.is_empty() {
        println!("  Version: {}", lineage.version);
    }
    if !lineage.description.is_empty() {
        println!("  Description: {}", lineage.description);
    }
    for parent in &lineage.parents {
        println!("  Parent: {parent}");
    }
    for (key, value) in &lineage.attributes {
        println!("  {key} = {value}");
    }

    Ok(())
}

/// Cmd: Summarize a chunk
fn cmd_chunk(input: PathBuf) -> Result<()> {
    let reader = open_chunk(&input)?;
    let summary = reader.summary()?;

    println!("=== {} ===", input.display());
    println!("Encoding: {}", reader.encoding().as_str());
    println!("Size: {}", format_bytes(reader.bytes().len() as u64));
    println!("Records: {}", summary.records());
    println!("  l-records: {}", summary.l_records);
    println!("  o-records: {}", summary.o_records);
    println!("Epochs: {}", summary.epochs.len());
    if !summary.epochs.is_empty() {
        println!("  {}", format_epochs(&summary.epochs));
    }

    Ok(())
}

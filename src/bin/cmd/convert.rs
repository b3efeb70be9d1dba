// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Convert command - re-encode a chunk as text or binary.

use std::path::PathBuf;

use anyhow::bail;
use clap::Args;

use crate::common::{format_bytes, open_chunk, Result};
use astrolabe::io::buffer::DEFAULT_BUFFER_CAPACITY;
use astrolabe::io::create_encoder;
use astrolabe::{ChannelKind, Encoding, Record};

/// Re-encode a chunk.
#[derive(Args, Clone, Debug)]
pub struct ConvertCmd {
    /// Input chunk file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output chunk file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Target encoding (text or binary)
    #[arg(long, value_name = "ENCODING")]
    to: Encoding,

    /// Overwrite the output file if it exists
    #[arg(short, long)]
    force: bool,
}

impl ConvertCmd {
    pub fn run(self) -> Result<()> {
        if self.input == self.output {
            bail!("Input and output must be different files");
        }
        if self.output.exists() && !self.force {
            bail!(
                "Output {} already exists (use --force to overwrite)",
                self.output.display()
            );
        }

        let reader = open_chunk(&self.input)?;
        println!("Converting chunk:");
        println!("  Input:  {} ({})", self.input.display(), reader.encoding().as_str());
        println!("  Output: {} ({})", self.output.display(), self.to.as_str());

        let mut encoder = create_encoder(
            self.to,
            &self.output,
            ChannelKind::ParameterObservation,
            DEFAULT_BUFFER_CAPACITY,
        )?;

        for record in reader.iter()? {
            match record? {
                Record::L(l) => encoder.write_l(&l)?,
                Record::O(o) => encoder.write_o(&o)?,
            }
        }
        let records = encoder.records_written();
        encoder.close()?;

        let size = std::fs::metadata(&self.output)?.len();
        println!("  Records: {records}");
        println!("  Size:    {}", format_bytes(size));
        Ok(())
    }
}

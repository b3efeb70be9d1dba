// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Cat command - print the records of a chunk.

use std::path::PathBuf;

use clap::Args;

use crate::common::{open_chunk, record_line, Result};

/// Print every record of a chunk in text form.
#[derive(Args, Clone, Debug)]
pub struct CatCmd {
    /// Chunk file (binary or text)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Print only the first N records
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    /// Skip removed records
    #[arg(long)]
    active_only: bool,
}

impl CatCmd {
    pub fn run(self) -> Result<()> {
        let reader = open_chunk(&self.input)?;
        let limit = self.limit.unwrap_or(usize::MAX);

        let mut printed = 0;
        for record in reader.iter()? {
            if printed >= limit {
                break;
            }
            let record = record?;
            if self.active_only && !record.is_active() {
                continue;
            }
            println!("{}", record_line(&record));
            printed += 1;
        }

        Ok(())
    }
}

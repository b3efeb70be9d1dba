// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Demo command - drive a configured channel with synthetic records.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;

use crate::common::Result;
use astrolabe::{ChannelConfig, DataChannel, LRecord, ORecord};

/// Write synthetic records through a channel loaded from a TOML file.
#[derive(Args, Clone, Debug)]
pub struct DemoCmd {
    /// Channel configuration (TOML)
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Number of epochs to write
    #[arg(short, long, default_value_t = 10)]
    epochs: u32,

    /// l-records per epoch
    #[arg(long, default_value_t = 2)]
    per_epoch: u32,

    /// Time step between epochs
    #[arg(long, default_value_t = 1.0)]
    step: f64,
}

impl DemoCmd {
    pub fn run(self) -> Result<()> {
        let config = ChannelConfig::from_toml_file(&self.config)
            .with_context(|| format!("Cannot load {}", self.config.display()))?;
        let accepts_o = match &config {
            ChannelConfig::File(file) => file.kind.accepts_o_records(),
            ChannelConfig::Socket(_) => true,
        };

        let mut channel = DataChannel::with_config(config)?;
        channel.open()?;

        for epoch in 0..self.epochs {
            let time = f64::from(epoch) * self.step;
            for iid in 0..self.per_epoch {
                let iid = iid as i32;
                let record = LRecord::new("DEMO", iid, time)
                    .with_tags(vec![iid])
                    .with_expectations(vec![time, f64::from(iid)])
                    .with_covariance(vec![1.0, 0.0, 1.0]);
                channel.write_l(&record)?;
            }
            if accepts_o {
                let record = ORecord::new(
                    "DEMO_OBS",
                    time,
                    (0..self.per_epoch as i32).collect(),
                    vec![epoch as i32],
                );
                channel.write_o(&record)?;
            }
        }

        channel.close()?;

        let stats = channel.stats();
        println!("Demo complete:");
        println!("  l-records: {}", stats.l_records);
        println!("  o-records: {}", stats.o_records);
        println!("  Epochs:    {}", stats.epochs);
        if stats.chunks_opened > 0 {
            println!("  Chunks:    {}", stats.chunks_opened);
        }
        if let Some(chunk) = &stats.current_chunk {
            println!("  Last chunk: {}", chunk.display());
        }
        Ok(())
    }
}

// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Astrolabe CLI
//!
//! Command-line tool for data channel chunks and headers.
//!
//! ## Usage
//!
//! ```sh
//! # Show header metadata
//! astrolabe inspect header run/params.hdr
//!
//! # Summarize one chunk
//! astrolabe inspect chunk run/params_0001
//!
//! # Print every record in text form
//! astrolabe cat run/params_0001
//!
//! # Re-encode a chunk
//! astrolabe convert run/params_0001 params.txt --to text
//!
//! # Write synthetic records through a configured channel
//! astrolabe demo channel.toml --epochs 50
//! ```

mod cmd;
mod common;

use std::process;

use clap::{Parser, Subcommand};
use cmd::{CatCmd, ConvertCmd, DemoCmd, InspectCmd};
use common::Result;

/// Astrolabe - epoch-chunked data channel toolkit
///
/// Inspect, print and re-encode chunk files written by a data channel.
/// Chunk encodings are detected from their leading bytes.
#[derive(Parser, Clone)]
#[command(name = "astrolabe")]
#[command(about = "Epoch-chunked data channel toolkit", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// Inspect header or chunk files
    #[command(subcommand)]
    Inspect(InspectCmd),

    /// Print every record of a chunk in text form
    Cat(CatCmd),

    /// Re-encode a chunk as text or binary
    Convert(ConvertCmd),

    /// Write synthetic records through a configured channel
    Demo(DemoCmd),
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect(cmd) => cmd.run(),
        Commands::Cat(cmd) => cmd.run(),
        Commands::Convert(cmd) => cmd.run(),
        Commands::Demo(cmd) => cmd.run(),
    }
}

fn main() {
    let result = run();

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

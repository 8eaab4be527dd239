//! # ddfc
//!
//! Command line front end for message schemas:
//!
//! - `compile` lays out schema files and writes a descriptor bundle.
//! - `encode` packs a JSON record and prints the packed bytes.
//! - `roundtrip` packs, relocates and unpacks a record, printing the result.

mod commands;
mod source;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use source::DescriptorSource;

#[derive(Parser)]
#[command(name = "ddfc", about = "Message schema compiler and packer")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile schema files into a descriptor bundle
    Compile {
        /// Schema files or directories of `.proto` files
        #[arg(required = true)]
        schemas: Vec<PathBuf>,

        /// Bundle to write
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the compiled layouts as JSON
        #[arg(long)]
        describe: bool,
    },

    /// Pack a JSON record and dump the bytes
    Encode {
        #[command(flatten)]
        packing: PackArgs,

        /// Address the buffer is relocated against
        #[arg(long, default_value_t = 0, value_parser = parse_address)]
        base: u64,
    },

    /// Pack, relocate and unpack a JSON record
    Roundtrip {
        #[command(flatten)]
        packing: PackArgs,
    },
}

#[derive(clap::Args)]
struct PackArgs {
    #[command(flatten)]
    source: DescriptorSource,

    /// Message to pack
    #[arg(short, long)]
    message: String,

    /// JSON record, or `-` for stdin
    #[arg(short, long, default_value = "-")]
    input: PathBuf,

    /// Size of the packing buffer in bytes
    #[arg(long, env = "DDFC_CAPACITY", default_value_t = 4096)]
    capacity: usize,
}

fn parse_address(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address '{s}': {e}"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    match args.command {
        Command::Compile {
            schemas,
            output,
            describe,
        } => commands::compile(&schemas, output.as_deref(), describe),
        Command::Encode { packing, base } => commands::encode(&packing, base),
        Command::Roundtrip { packing } => commands::roundtrip(&packing),
    }
}

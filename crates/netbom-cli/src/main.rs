//! netbom CLI - KiCad netlist to XLSX bill of materials
//!
//! Reads a KiCad generic XML netlist, groups identical parts into BOM lines
//! and writes a styled spreadsheet with per-vendor price and cost columns.

mod pipeline;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::pipeline::Options;

#[derive(Parser)]
#[command(name = "netbom")]
#[command(author, version, about = "KiCad netlist to XLSX bill of materials", long_about = None)]
struct Cli {
    /// KiCad generic XML netlist
    #[arg(value_name = "NETLIST")]
    input: PathBuf,

    /// Spreadsheet to write (.xlsx)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// TOML file overriding vendors, vendor fields, colors and the sum label
    #[arg(short, long, value_name = "FILE", env = "NETBOM_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Keep components flagged exclude_from_bom
    #[arg(long)]
    include_excluded: bool,

    /// Leave Do Not Populate components out of the BOM
    #[arg(long)]
    skip_dnp: bool,

    /// Drop components flagged exclude_from_board
    #[arg(long)]
    exclude_from_board: bool,

    /// Drop components whose footprint starts with a match of PATTERN (repeatable)
    #[arg(long, value_name = "PATTERN")]
    exclude_footprint: Vec<String>,
}

fn log_filter(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        })
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(log_filter(cli.verbose))
        .init();

    let options = Options {
        input: cli.input,
        output: cli.output,
        config: cli.config,
        include_excluded: cli.include_excluded,
        skip_dnp: cli.skip_dnp,
        exclude_from_board: cli.exclude_from_board,
        excluded_footprints: cli.exclude_footprint,
    };

    let summary = pipeline::generate(&options)?;
    info!(
        components = summary.components,
        lines = summary.lines,
        output = %options.output.display(),
        "BOM written"
    );

    Ok(())
}

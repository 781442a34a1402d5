mod cli;
mod commands;
mod error;

use std::process;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Args, Commands};
use crate::error::Result;

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    if let Err(e) = run(args) {
        error!("{e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Commands::Extract { input, meta } => commands::extract(&input, &meta),
        Commands::Merge {
            output,
            meta,
            fragments,
        } => commands::merge(&output, &meta, &fragments),
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "off"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

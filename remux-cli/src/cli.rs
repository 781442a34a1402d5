use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "remux",
    version,
    about = "Box-level MP4 metadata capture and fragment reassembly"
)]
pub struct Args {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Silence all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Capture ftyp/moov/mdat metadata from a source MP4 into a record file
    Extract {
        /// Source MP4 file
        input: PathBuf,
        /// Metadata record file to write
        meta: PathBuf,
    },
    /// Reassemble one MP4 from a metadata record and fragment inputs
    Merge {
        /// Output MP4 file
        output: PathBuf,
        /// Metadata record file written by `extract`
        meta: PathBuf,
        /// Fragment input files, one per track, in track order
        #[arg(required = true)]
        fragments: Vec<PathBuf>,
    },
}

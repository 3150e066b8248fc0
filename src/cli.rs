use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(clap::Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the ten-line settings file
    #[clap(long, short, value_name = "PATH")]
    pub settings: PathBuf,

    /// Move files into the output tree instead of copying them
    #[clap(long, short)]
    pub move_files: bool,

    /// Scan and report only; transfer nothing
    #[clap(long)]
    pub scan_only: bool,

    /// Enable Debug and Trace logs
    #[clap(long, short, action = ArgAction::Count)]
    pub verbose: u8,
}

pub fn parse_args() -> Args {
    Args::parse()
}

//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "rewind",
    about = "Timeline navigation and search over recorded execution traces",
    after_help = "\
EXAMPLES:
    rewind --replay trace.json               Navigate a recorded trace
    rewind --demo                            Stream the synthetic demo trace
    rewind --demo 20000                      Demo with 20k instructions
    rewind --replay trace.json --export out.json   Re-export and exit"
)]
pub struct Args {
    /// Recorded trace file to load
    #[arg(long, value_name = "FILE")]
    pub replay: Option<PathBuf>,

    /// Generate a synthetic demo trace and stream it in live
    #[arg(long, value_name = "STEPS", num_args = 0..=1, default_missing_value = "4096")]
    pub demo: Option<usize>,

    /// Write the loaded or generated trace to a file and exit
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

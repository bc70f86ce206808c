//! # rewind - Main Entry Point
//!
//! Supports two operational modes:
//! - **Replay** (`--replay trace.json`): navigate a recorded trace
//! - **Demo** (`--demo [N]`): generate a synthetic trace and stream it in
//!   live, exercising the full Live/Replay cursor machinery
//!
//! `--export FILE` re-serializes the loaded or generated trace and exits
//! without starting the TUI.

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::bounded;
use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::time::Duration;

use rewind::cli::Args;
use rewind::engine::RecordedEngine;
use rewind::session::TraceSession;
use rewind::trace_file::TraceFile;
use rewind::tui::App;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.to_string().to_lowercase().contains("missing required argument") {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let file = load_trace(&args)?;
    info!("trace loaded: {} steps, {} registers", file.steps.len(), file.register_names.len());

    if let Some(ref path) = args.export {
        let writer = BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        );
        file.export(writer)
            .with_context(|| format!("Failed to export trace to {}", path.display()))?;
        if !args.quiet {
            eprintln!("exported {} steps to {}", file.steps.len(), path.display());
        }
        return Ok(());
    }

    if args.demo.is_some() {
        run_demo(file)
    } else {
        let session = TraceSession::new(RecordedEngine::new(file));
        App::replay(session).run()
    }
}

fn load_trace(args: &Args) -> Result<TraceFile> {
    if let Some(ref path) = args.replay {
        if args.demo.is_some() {
            anyhow::bail!("--replay and --demo are mutually exclusive");
        }
        return TraceFile::from_file(path)
            .with_context(|| format!("Failed to load trace {}", path.display()));
    }
    if let Some(steps) = args.demo {
        return Ok(TraceFile::synthetic(steps));
    }
    anyhow::bail!(
        "Missing required argument: --replay or --demo\n\n\
         Usage:\n  \
         rewind --replay trace.json     Navigate a recording\n  \
         rewind --demo                  Stream the synthetic demo\n\n\
         Run 'rewind --help' for more options"
    )
}

/// Stream all but the first step of `file` over a channel so the TUI starts
/// in live mode with data flowing in. The feeder trickles steps so the
/// timeline visibly grows, and quitting stays responsive because the TUI
/// never blocks on the channel.
fn run_demo(mut file: TraceFile) -> Result<()> {
    let rest = file.steps.split_off(1.min(file.steps.len()));
    let session = TraceSession::new(RecordedEngine::new(file));

    let (tx, rx) = bounded(1024);
    std::thread::spawn(move || {
        for step in rest {
            if tx.send(step).is_err() {
                break; // TUI quit
            }
            std::thread::sleep(Duration::from_millis(2));
        }
    });

    App::live(session, rx).run()
}

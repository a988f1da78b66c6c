//! padlock-rig binary.
//!
//! # Usage
//!
//! ```bash
//! # Run scenarios and print a JSON report
//! padlock-rig run scenarios/first_enrollment.yaml scenarios/brute_force.yaml
//!
//! # Print the device table, or render it with Graphviz
//! padlock-rig table
//! padlock-rig table --dot | dot -Tsvg > table.svg
//! ```

use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use padlock_core::TransitionTable;
use padlock_rig::{RigConfig, run_files};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Padlock device behavior rig
#[derive(Parser, Debug)]
#[command(name = "padlock-rig")]
#[command(about = "Run device scenarios against the padlock behavior model")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run scenario files and print a JSON report
    Run {
        /// Scenario files (YAML)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Keep running a scenario after a failed expectation
        #[arg(long)]
        keep_going: bool,

        /// Attach the final DUT snapshot to each scenario report
        #[arg(long)]
        snapshot: bool,
    },
    /// Print the device transition table
    Table {
        /// Render as Graphviz DOT
        #[arg(long)]
        dot: bool,
    },
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();
    // Logs go to stderr; stdout carries the report.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let mut out = io::stdout().lock();
    match args.command {
        Command::Run { files, keep_going, snapshot } => {
            let config = RigConfig { keep_going, include_snapshot: snapshot };
            let report = run_files(&files, &config)?;
            writeln!(out, "{}", report.to_json()?)?;
            if report.passed {
                Ok(ExitCode::SUCCESS)
            } else {
                tracing::warn!("one or more scenarios failed");
                Ok(ExitCode::FAILURE)
            }
        },
        Command::Table { dot } => {
            let table = TransitionTable::device();
            let rendered = if dot { table.to_dot() } else { table.listing() };
            write!(out, "{rendered}")?;
            Ok(ExitCode::SUCCESS)
        },
    }
}

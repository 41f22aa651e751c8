//! # crossdock CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crossdock_cli::accrue::{run_accrue, AccrueArgs};
use crossdock_cli::quote::{run_quote, QuoteArgs};
use crossdock_cli::ratecard::{run_ratecard, RatecardArgs};

/// Crossdock CLI
///
/// Offline tooling for the Crossdock billing engine: rate card
/// validation, one-off shipping quotes, and storage accrual simulation.
#[derive(Parser, Debug)]
#[command(name = "crossdock", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate rate card files against the engine's publishing rules.
    Ratecard(RatecardArgs),

    /// Compute a shipping quote against a rate card file.
    Quote(QuoteArgs),

    /// Replay a warehouse scenario and print its storage charges.
    Accrue(AccrueArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Ratecard(args) => run_ratecard(&args),
        Commands::Quote(args) => run_quote(&args),
        Commands::Accrue(args) => run_accrue(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

//! # acr CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use acr_cli::code::{run_code, CodeArgs};
use acr_cli::hash::{run_hash, HashArgs};
use acr_cli::receipt::{run_receipt, ReceiptArgs};
use acr_cli::verify::{run_verify, VerifyArgs};

/// Academic Credential Registry CLI
///
/// Offline digest computation, verification code utilities, remote
/// credential verification, and anchor receipt lookup.
#[derive(Parser, Debug)]
#[command(name = "acr", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Canonicalize a JSON payload file and print its content digest.
    Hash(HashArgs),

    /// Verification code utilities (check, sample).
    Code(CodeArgs),

    /// Verify a credential against a running registry API.
    Verify(VerifyArgs),

    /// Fetch the ledger transaction behind an anchor reference.
    Receipt(ReceiptArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

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
        Commands::Hash(args) => run_hash(&args),
        Commands::Code(args) => run_code(&args),
        Commands::Verify(args) => run_verify(&args),
        Commands::Receipt(args) => run_receipt(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

//! # canary CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use canary_cli::exit::{ExitContext, ExitStatus, Failure};
use canary_cli::keys::{run_keygen, KeygenArgs};
use canary_cli::local::{run_add, run_create, run_verify, AddArgs, CreateArgs, VerifyArgs};
use canary_cli::remote::{
    run_key, run_pull, run_push, run_status, KeyArgs, PullArgs, PushArgs, StatusArgs,
};

/// Warrant canary client.
///
/// Creates, verifies and stores signed canaries, and exchanges them with
/// canary servers.
#[derive(Parser, Debug)]
#[command(name = "canary", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a new Ed25519 keypair.
    Keygen(KeygenArgs),
    /// Create and sign the next canary from a manifest.
    Create(CreateArgs),
    /// Verify a proof's signature and canary fields.
    Verify(VerifyArgs),
    /// Validate a proof against a local store and append it.
    Add(AddArgs),
    /// Submit a proof to a server.
    Push(PushArgs),
    /// Fetch the latest proof from a server.
    Pull(PullArgs),
    /// Show a server's status.
    Status(StatusArgs),
    /// Fetch and save a server's public key.
    Key(KeyArgs),
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
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Keygen(args) => run_keygen(&args),
        Commands::Create(args) => run_create(&args),
        Commands::Verify(args) => run_verify(&args),
        Commands::Add(args) => run_add(&args),
        Commands::Push(args) => block_on(run_push(&args)),
        Commands::Pull(args) => block_on(run_pull(&args)),
        Commands::Status(args) => block_on(run_status(&args)),
        Commands::Key(args) => block_on(run_key(&args)),
    };

    match result {
        Ok(()) => ExitStatus::Success.into(),
        Err(failure) => {
            eprintln!("FAIL: {failure}");
            failure.status.into()
        }
    }
}

/// Run a remote command on a single-threaded runtime.
fn block_on<F>(future: F) -> Result<(), Failure>
where
    F: std::future::Future<Output = Result<(), Failure>>,
{
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .or_exit(ExitStatus::ConnectionFailure, || "failed to start async runtime")?
        .block_on(future)
}

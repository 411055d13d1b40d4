/// Entry point for the sysprobe CLI, a scanner for system-contract calls in EVM bytecode.
///
/// This module parses command-line arguments, installs logging and dispatches to the
/// subcommands. Reports go to stdout; logs go to stderr.
use clap::Parser;
use sysprobe_cli::commands::{Cmd, Command};
use tracing_subscriber::EnvFilter;

/// Command-line interface for sysprobe.
///
/// sysprobe decodes EVM bytecode, detects calls to the token-service system contract, and
/// aggregates selector usage across a corpus harvested from a mirror node.
#[derive(Parser)]
#[command(name = "sysprobe")]
#[command(about = "sysprobe: system-contract call detector for EVM bytecode")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Log at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Runs the sysprobe CLI with the provided arguments.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    cli.command.execute().await
}

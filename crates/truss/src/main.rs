//! Truss CLI binary.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use truss::cli::Cli;

/// Main entry point for the truss CLI.
///
/// Runs on tokio's current_thread runtime; command execution is
/// sequential I/O-bound work.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    // Can be controlled via RUST_LOG environment variable
    // Example: RUST_LOG=truss=debug,truss_jsonl=trace cargo run
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("truss=info,truss_jsonl=info")),
        )
        .with_target(false)
        .init();

    tracing::debug!("Starting truss CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Truss CLI completed successfully");
    Ok(())
}

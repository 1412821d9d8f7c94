//! Elph CLI binary.

use anyhow::Result;
use elph::cli::Cli;
use elph::logging;

/// Main entry point for the elph CLI.
///
/// Uses tokio's current_thread runtime; oracle queries are I/O bound and
/// interleave on one thread.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // RUST_LOG overrides the -v/-q flags when set
    // Example: RUST_LOG=elph=debug,elph_cache=trace elph deps app
    logging::init(cli.log_config());

    tracing::debug!("Starting elph CLI");
    cli.execute().await?;
    tracing::debug!("Elph CLI completed successfully");
    Ok(())
}

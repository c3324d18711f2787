//! CLI entry point for the arXiv digest.

use anyhow::{Context, Result, bail};
use arxiv_digest::{build_fetcher, load_config, run};
use clap::Parser;
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.default_log_level()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");
    info!(config = %args.config_path.display(), "arXiv digest starting");

    let config = load_config(&args.config_path).with_context(|| {
        format!(
            "cannot start without a valid configuration at {}",
            args.config_path.display()
        )
    })?;
    let fetcher = build_fetcher(&config).context("failed to set up HTTP clients")?;

    let summary = run(&config, &fetcher).await;

    if !summary.targets_failed.is_empty() {
        bail!(
            "publishing failed for target(s): {}",
            summary.targets_failed.join(", ")
        );
    }
    Ok(())
}

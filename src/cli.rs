//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use arxiv_digest::DEFAULT_CONFIG_PATH;
use clap::Parser;

/// Daily arXiv paper digest.
///
/// Searches arXiv for every configured topic, looks up code repositories,
/// merges the results into JSON stores and renders Markdown reports.
#[derive(Parser, Debug)]
#[command(name = "arxiv-digest")]
#[command(author, version, about)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(long, alias = "config_path", default_value = DEFAULT_CONFIG_PATH)]
    pub config_path: PathBuf,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Log filter used when `RUST_LOG` is unset.
    #[must_use]
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }
}

//! Command-line arguments for the Quote Requester.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use std::path::PathBuf;

use clap::Parser;
use quote_common::net::{SERVER_PORT, SINK_LABEL, SINK_PATH};

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Base URL of the quote server.
    #[clap(long, default_value_t = format!("http://localhost:{}", SERVER_PORT))]
    pub server_url: String,

    /// Deadline of the whole request, in milliseconds. Must exceed the
    /// server's upstream and store budgets combined.
    #[clap(long, default_value_t = 300)]
    pub timeout_ms: u64,

    /// File the quote is written to. Prior content is replaced.
    #[clap(long, default_value = SINK_PATH)]
    pub output: PathBuf,

    /// Label written before the quote.
    #[clap(long, default_value = SINK_LABEL)]
    pub label: String,
}

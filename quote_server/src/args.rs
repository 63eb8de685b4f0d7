//! Command-line arguments for the Quote Server.
//!
//! Every hop budget is its own flag; they are never derived from one another.
use std::path::PathBuf;

use clap::Parser;
use quote_common::CurrencyPair;
use quote_common::deadline::ServerDeadlines;
use quote_common::net::{DB_PATH, SERVER_PORT, UPSTREAM_BASE_URL, addr};

use crate::store::DEFAULT_MAX_CONNECTIONS;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Address to bind the HTTP listener to.
    #[clap(long, default_value_t = addr("0.0.0.0", SERVER_PORT))]
    pub bind: String,

    /// SQLite file the quotes are appended to. Created if missing.
    #[clap(long, default_value = DB_PATH)]
    pub db_path: PathBuf,

    /// Base URL of the quote provider.
    #[clap(long, default_value = UPSTREAM_BASE_URL)]
    pub upstream_url: String,

    /// Currency pair requested from the provider.
    #[clap(long, value_enum, default_value_t = CurrencyPair::UsdBrl)]
    pub pair: CurrencyPair,

    /// Deadline of the provider fetch, in milliseconds.
    #[clap(long, default_value_t = 200)]
    pub upstream_timeout_ms: u64,

    /// Deadline of the store insert, in milliseconds.
    #[clap(long, default_value_t = 10)]
    pub store_timeout_ms: u64,

    /// Maximum number of pooled database connections.
    #[clap(long, default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_db_connections: u32,
}

impl Args {
    /// Hop budgets selected on the command line.
    pub fn deadlines(&self) -> ServerDeadlines {
        ServerDeadlines::from_millis(self.upstream_timeout_ms, self.store_timeout_ms)
    }
}

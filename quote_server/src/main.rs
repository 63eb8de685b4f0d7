//! Quote HTTP server binary.
//!
//! Startup order matters: the store is opened and its schema ensured before the
//! listener is bound, and any failure there aborts the process. Per-request
//! failures are logged and answered with `500`; they never stop the server.
//! The store is closed exactly once, after the listener has drained.
use std::sync::Arc;

use clap::Parser;
use log::{info, warn};
use quote_common::Result;
use quote_common::deadline::REQUEST_BUDGET;
use quote_common::{Cause, QuoteError};
use quote_server::args::Args;
use quote_server::server::{serve, shutdown_signal};
use quote_server::{QuoteHandler, RateStore, UpstreamClient};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();
    let deadlines = args.deadlines();

    info!(
        "Deadlines: upstream={:?} store={:?}",
        deadlines.upstream, deadlines.store
    );
    if !deadlines.fits_within(REQUEST_BUDGET) {
        warn!(
            "Server budget {:?} does not fit inside the default requester budget {:?}",
            deadlines.total(),
            REQUEST_BUDGET
        );
    }

    let store = RateStore::open(&args.db_path, args.max_db_connections).await?;
    store.ensure_schema().await?;

    let upstream = UpstreamClient::new(&args.upstream_url, args.pair);
    info!("Upstream endpoint: {}", upstream.url());
    let handler = Arc::new(QuoteHandler::new(upstream, store.clone(), deadlines));

    let served = match TcpListener::bind(&args.bind).await {
        Ok(listener) => serve(listener, handler, shutdown_signal())
            .await
            .map_err(|e| QuoteError::Init(Cause::Io(e))),
        Err(e) => Err(QuoteError::Init(Cause::Io(e))),
    };

    store.close().await;
    served
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

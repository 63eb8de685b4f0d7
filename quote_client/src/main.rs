//! Quote Requester — a single-shot client that asks the quote server for the
//! current bid and stores it in a local file.
//!
//! Usage example (CLI):
//! ```bash
//! quote_client --server-url http://localhost:8080 --timeout-ms 300 --output ./cotacao.txt
//! ```
//!
//! On success the output file contains `Dollar: "<bid>"` and the raw response
//! is echoed to stdout. Any failure (deadline, connection, non-2xx status,
//! file write) terminates the process with a non-zero exit code.
use clap::Parser;
use log::info;
use quote_client::QuoteRequester;
use quote_client::args::Args;
use quote_common::Result;

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();
    let requester = QuoteRequester::from_args(&args);

    let result = requester.run().await?;
    info!("Bid {} saved to {}", result.bid, requester.sink().display());
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

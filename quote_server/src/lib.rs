//! Quote server library.
//!
//! The server answers `GET /cotacao` by fetching the latest quote from the
//! external provider, appending it to a local SQLite store and replying with the
//! bid. It wires together four building blocks:
//!
//! - `upstream` — `UpstreamClient`, one deadline-bound request to the provider.
//! - `store` — `RateStore`, the append-only `exchange_rates` table behind a
//!   connection pool shared by every request.
//! - `handler` — `QuoteHandler`, the fetch → persist → respond pipeline and its
//!   mapping of failures to `500` responses.
//! - `server` — the axum router, the serving loop and graceful shutdown.
//!
//! Each hop has its own budget (see `quote_common::deadline`); a timeout in one
//! hop fails the request without leaking the connection it was using.
#![warn(missing_docs)]
pub mod args;
pub mod handler;
pub mod server;
pub mod store;
pub mod upstream;

pub use handler::QuoteHandler;
pub use store::{RateStore, StoredRow};
pub use upstream::UpstreamClient;

//!
//! Common types and utilities shared by the quote server and the quote requester.
//!
//! This crate aggregates:
//! - `error` — the error taxonomy `QuoteError` and its underlying `Cause`.
//! - `result` — handy `Result<T, QuoteError>` alias.
//! - `currency` — currency pairs understood by the upstream provider.
//! - `rate` — the `RateRecord` fetched upstream and carried verbatim to storage.
//! - `deadline` — per-hop time budgets and the helper that enforces them.
//! - `net` — networking constants and small helpers.
#![warn(missing_docs)]
pub mod currency;
pub mod deadline;
pub mod error;
pub mod net;
pub mod rate;
pub mod result;

pub use currency::CurrencyPair;
pub use error::{Cause, QuoteError};
pub use rate::RateRecord;
pub use result::Result;

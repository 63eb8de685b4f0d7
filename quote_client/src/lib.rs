//! Quote Requester — asks the quote server for the current bid once, under its
//! own deadline, and records the answer in a local sink file.
//!
//! - `args` — command-line interface.
//! - `requester` — `QuoteRequester` and the `QuoteResult` it produces.
#![warn(missing_docs)]
pub mod args;
pub mod requester;

pub use requester::{QuoteRequester, QuoteResult};

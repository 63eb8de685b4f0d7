//! Exchange rate data model and payload decoding.
//!
//! A `RateRecord` is the quote the provider returns for one currency pair. Every
//! field is kept as the provider's own string: numeric-looking values such as
//! `bid` are never parsed, so what is stored and served is byte-for-byte what
//! the provider sent.

use serde::Deserialize;
use serde_json::Value;

use crate::currency::CurrencyPair;
use crate::error::Cause;

/// Quote for a single currency pair.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RateRecord {
    /// Base currency code (e.g., `USD`).
    pub code: String,
    /// Quote currency code (e.g., `BRL`).
    #[serde(rename = "codein")]
    pub code_in: String,
    /// Human-readable pair name.
    pub name: String,
    /// Session high.
    pub high: String,
    /// Session low.
    pub low: String,
    /// Bid variation.
    #[serde(rename = "varBid")]
    pub var_bid: String,
    /// Percentage change.
    #[serde(rename = "pctChange")]
    pub pct_change: String,
    /// Bid price. This is the value served to callers.
    pub bid: String,
    /// Ask price.
    pub ask: String,
    /// Provider timestamp (epoch seconds as a string).
    pub timestamp: String,
    /// Provider creation date (`YYYY-MM-DD hh:mm:ss`).
    pub create_date: String,
}

impl RateRecord {
    /// Decode the provider payload `{"<KEY>": {...}}` for `pair`.
    ///
    /// Returns `Cause::Json` if the body is not JSON or the nested object does not
    /// match `RateRecord`, and `Cause::MissingKey` if the top-level key is absent.
    pub fn from_payload(body: &[u8], pair: CurrencyPair) -> Result<Self, Cause> {
        let key = pair.payload_key();
        let mut payload: Value = serde_json::from_slice(body)?;
        let quote = payload
            .get_mut(&key)
            .map(Value::take)
            .ok_or(Cause::MissingKey(key))?;
        Ok(serde_json::from_value(quote)?)
    }

    /// Encode only the bid as a JSON string, e.g. `"5.23"`.
    pub fn bid_json(&self) -> Result<Vec<u8>, Cause> {
        Ok(serde_json::to_vec(&self.bid)?)
    }
}

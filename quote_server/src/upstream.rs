//! Client for the external quote provider.
//!
//! One call to [`UpstreamClient::fetch`] is one HTTP request: there are no
//! retries, the caller's budget has no room for them.
use std::time::Duration;

use log::debug;
use quote_common::deadline::within;
use quote_common::{Cause, CurrencyPair, QuoteError, RateRecord, Result};

/// Fetches the latest quote for a fixed currency pair.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    url: String,
    pair: CurrencyPair,
}

impl UpstreamClient {
    /// Create a client for `GET {base_url}/json/last/{pair}`.
    pub fn new(base_url: &str, pair: CurrencyPair) -> Self {
        Self::with_http(reqwest::Client::new(), base_url, pair)
    }

    /// Same as [`UpstreamClient::new`] but reusing an existing HTTP client.
    pub fn with_http(http: reqwest::Client, base_url: &str, pair: CurrencyPair) -> Self {
        let url = format!(
            "{}/json/last/{}",
            base_url.trim_end_matches('/'),
            pair.path_segment()
        );
        Self { http, url, pair }
    }

    /// Full URL requested on each fetch.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and decode one quote; the whole exchange is bound to `deadline`.
    ///
    /// Any failure (deadline, connection, status, body, payload shape) is
    /// returned as `QuoteError::Upstream`.
    pub async fn fetch(&self, deadline: Duration) -> Result<RateRecord> {
        debug!("Fetching {} (deadline {:?})", self.url, deadline);
        let body = within(deadline, self.fetch_body())
            .await
            .map_err(QuoteError::Upstream)?;
        RateRecord::from_payload(&body, self.pair).map_err(QuoteError::Upstream)
    }

    async fn fetch_body(&self) -> std::result::Result<Vec<u8>, Cause> {
        let response = self.http.get(&self.url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(Cause::Status(
                status.as_u16(),
                String::from_utf8_lossy(&body).into_owned(),
            ));
        }
        Ok(body.to_vec())
    }
}

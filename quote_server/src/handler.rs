//! The `/cotacao` request pipeline.
//!
//! One invocation walks the stages strictly in order and stops at the first
//! failure:
//!
//! ```text
//! fetch upstream ──▶ persist ──▶ serialize ──▶ respond (200, bid as JSON)
//!       │               │             │
//!       ▼               ▼             ▼
//!      500             500           500
//! ```
//!
//! A quote that was fetched but could not be persisted is discarded: the caller
//! only ever sees a bid that has also been recorded.
use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use log::{debug, error, info};
use quote_common::deadline::ServerDeadlines;
use quote_common::{QuoteError, Result};

use crate::store::RateStore;
use crate::upstream::UpstreamClient;

/// Runs the fetch → persist → respond pipeline.
#[derive(Debug)]
pub struct QuoteHandler {
    upstream: UpstreamClient,
    store: RateStore,
    deadlines: ServerDeadlines,
}

impl QuoteHandler {
    /// Build a handler over an already opened store.
    pub fn new(upstream: UpstreamClient, store: RateStore, deadlines: ServerDeadlines) -> Self {
        Self {
            upstream,
            store,
            deadlines,
        }
    }

    /// Budgets applied to each invocation.
    pub fn deadlines(&self) -> ServerDeadlines {
        self.deadlines
    }

    /// The store this handler appends to.
    pub fn store(&self) -> &RateStore {
        &self.store
    }

    /// Run the pipeline and return the JSON-encoded bid.
    pub async fn quote(&self) -> Result<Vec<u8>> {
        let record = self.upstream.fetch(self.deadlines.upstream).await?;
        debug!("Fetched {}-{} bid={}", record.code, record.code_in, record.bid);

        let id = self.store.insert(&record, self.deadlines.store).await?;
        debug!("Persisted rate as row {}", id);

        record.bid_json().map_err(QuoteError::Serialization)
    }

    /// Run the pipeline and turn its outcome into an HTTP response.
    pub async fn handle(&self) -> Response {
        match self.quote().await {
            Ok(body) => {
                info!("Served quote {}", String::from_utf8_lossy(&body));
                ([(header::CONTENT_TYPE, "application/json")], body).into_response()
            }
            Err(e) => error_response(&e),
        }
    }
}

/// Map a pipeline failure to a `500 text/plain` response and log it.
pub fn error_response(err: &QuoteError) -> Response {
    let context = match err {
        QuoteError::Upstream(_) => "getting exchange rate",
        QuoteError::Store(_) => "persisting exchange rate",
        QuoteError::Serialization(_) => "serializing JSON response",
        QuoteError::Request(_) | QuoteError::Init(_) => "handling request",
    };
    error!("Error {}: {}", context, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Error {}: {}", context, err.cause()),
    )
        .into_response()
}

/// Axum entry point for `GET /cotacao`.
pub async fn get_quote(State(handler): State<Arc<QuoteHandler>>) -> Response {
    handler.handle().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use quote_common::Cause;
    use std::time::Duration;

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn upstream_failure_maps_to_500_with_context() {
        let err = QuoteError::upstream(Cause::DeadlineExceeded(Duration::from_millis(200)));
        let response = error_response(&err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(
            body_text(response).await,
            "Error getting exchange rate: deadline of 200ms exceeded"
        );
    }

    #[tokio::test]
    async fn store_failure_maps_to_500_with_context() {
        let err = QuoteError::store(Cause::DeadlineExceeded(Duration::from_millis(10)));
        let response = error_response(&err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_text(response).await,
            "Error persisting exchange rate: deadline of 10ms exceeded"
        );
    }
}

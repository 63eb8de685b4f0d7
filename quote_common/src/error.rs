//! Error types shared by the server and the requester.
//!
//! Failures are reported in two layers. `Cause` says *what* went wrong (a
//! deadline fired, a socket failed, a payload was malformed), while `QuoteError`
//! says *where* in the pipeline it happened. The server maps each `QuoteError`
//! variant to its own error response; the requester surfaces it and exits.
use std::io;
use std::time::Duration;

use thiserror::Error;

/// Underlying reason an operation failed.
#[derive(Error, Debug)]
pub enum Cause {
    /// The operation did not finish within its time budget.
    #[error("deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    /// I/O error originating from the standard library or sockets/files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport-level HTTP failure (connect, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Failure reported by the database driver.
    #[cfg(feature = "sqlx")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload decoded but lacks the expected top-level key.
    #[error("missing key `{0}` in payload")]
    MissingKey(String),

    /// The peer answered with a non-success status; contains the status code and body.
    #[error("unexpected status {0}: {1}")]
    Status(u16, String),
}

/// Error taxonomy of the quote pipeline.
#[derive(Error, Debug)]
pub enum QuoteError {
    /// Fetching or decoding the quote from the external provider failed.
    #[error("upstream error: {0}")]
    Upstream(#[source] Cause),

    /// Persisting the quote failed.
    #[error("store error: {0}")]
    Store(#[source] Cause),

    /// Encoding or decoding the quote response failed.
    #[error("serialization error: {0}")]
    Serialization(#[source] Cause),

    /// The requester could not obtain a quote from the server.
    #[error("request error: {0}")]
    Request(#[source] Cause),

    /// The store could not be opened or its schema created at startup.
    #[error("initialization error: {0}")]
    Init(#[source] Cause),
}

impl QuoteError {
    /// Wraps `cause` as an upstream failure.
    pub fn upstream(cause: impl Into<Cause>) -> Self {
        QuoteError::Upstream(cause.into())
    }

    /// Wraps `cause` as a store failure.
    pub fn store(cause: impl Into<Cause>) -> Self {
        QuoteError::Store(cause.into())
    }

    /// Wraps `cause` as a serialization failure.
    pub fn serialization(cause: impl Into<Cause>) -> Self {
        QuoteError::Serialization(cause.into())
    }

    /// Wraps `cause` as a requester-side failure.
    pub fn request(cause: impl Into<Cause>) -> Self {
        QuoteError::Request(cause.into())
    }

    /// Wraps `cause` as a fatal startup failure.
    pub fn init(cause: impl Into<Cause>) -> Self {
        QuoteError::Init(cause.into())
    }

    /// The underlying cause, whatever the stage.
    pub fn cause(&self) -> &Cause {
        match self {
            QuoteError::Upstream(c)
            | QuoteError::Store(c)
            | QuoteError::Serialization(c)
            | QuoteError::Request(c)
            | QuoteError::Init(c) => c,
        }
    }

    /// Returns `true` if the failure was a deadline firing.
    pub fn is_timeout(&self) -> bool {
        matches!(self.cause(), Cause::DeadlineExceeded(_))
    }
}

//! Single-shot quote request.
//!
//! The response is read completely, within the deadline, before anything is
//! written: the sink is either fully replaced with the new quote or left as it
//! was. The buffered body is then mirrored once to a secondary writer.
use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use log::{debug, info};
use quote_common::deadline::within;
use quote_common::net::{QUOTE_ROUTE, join_url};
use quote_common::{Cause, QuoteError, Result};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::args::Args;

/// Outcome of a successful request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteResult {
    /// Bid decoded from the JSON string body.
    pub bid: String,
    /// Response body exactly as received, e.g. `"5.23"` including the quotes.
    pub raw: Bytes,
}

impl QuoteResult {
    /// Line written to the sink: `<label>: <raw body>`.
    pub fn sink_line(&self, label: &str) -> String {
        format!("{}: {}", label, String::from_utf8_lossy(&self.raw))
    }
}

/// Asks the quote server for the current bid.
#[derive(Debug, Clone)]
pub struct QuoteRequester {
    http: reqwest::Client,
    url: String,
    deadline: Duration,
    sink: PathBuf,
    label: String,
}

impl QuoteRequester {
    /// Create a requester for `{server_url}/cotacao`.
    pub fn new(server_url: &str, deadline: Duration, sink: impl Into<PathBuf>, label: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: join_url(server_url, QUOTE_ROUTE),
            deadline,
            sink: sink.into(),
            label: label.to_string(),
        }
    }

    /// Create a requester from parsed command-line arguments.
    pub fn from_args(args: &Args) -> Self {
        Self::new(
            &args.server_url,
            Duration::from_millis(args.timeout_ms),
            &args.output,
            &args.label,
        )
    }

    /// Sink file path.
    pub fn sink(&self) -> &Path {
        &self.sink
    }

    /// Run once, mirroring the raw body to stdout.
    pub async fn run(&self) -> Result<QuoteResult> {
        let mut stdout = tokio::io::stdout();
        self.run_with(&mut stdout).await
    }

    /// Run once, mirroring the raw body to `mirror`.
    pub async fn run_with<W>(&self, mirror: &mut W) -> Result<QuoteResult>
    where
        W: AsyncWrite + Unpin,
    {
        let raw = self.fetch().await?;
        let bid: String = serde_json::from_slice(&raw).map_err(QuoteError::serialization)?;
        let result = QuoteResult { bid, raw };

        let line = result.sink_line(&self.label);
        info!("{}", line);
        tokio::fs::write(&self.sink, line.as_bytes())
            .await
            .map_err(QuoteError::request)?;
        debug!("Wrote {}", self.sink.display());

        mirror
            .write_all(&result.raw)
            .await
            .map_err(QuoteError::request)?;
        mirror.flush().await.map_err(QuoteError::request)?;
        Ok(result)
    }

    /// Request the quote and read the whole body within the deadline.
    pub async fn fetch(&self) -> Result<Bytes> {
        debug!("Requesting {} (deadline {:?})", self.url, self.deadline);
        within(self.deadline, self.fetch_body())
            .await
            .map_err(QuoteError::Request)
    }

    async fn fetch_body(&self) -> std::result::Result<Bytes, Cause> {
        let response = self.http.get(&self.url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(Cause::Status(
                status.as_u16(),
                String::from_utf8_lossy(&body).into_owned(),
            ));
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_line_keeps_raw_body_verbatim() {
        let result = QuoteResult {
            bid: "5.23".into(),
            raw: Bytes::from_static(br#""5.23""#),
        };
        assert_eq!(result.sink_line("Dollar"), r#"Dollar: "5.23""#);
    }

    #[test]
    fn url_points_at_quote_route() {
        let requester = QuoteRequester::new(
            "http://localhost:8080/",
            Duration::from_millis(300),
            "./cotacao.txt",
            "Dollar",
        );
        assert_eq!(requester.url, "http://localhost:8080/cotacao");
        assert_eq!(requester.sink(), Path::new("./cotacao.txt"));
    }
}

//! End-to-end tests of the `/cotacao` pipeline.
//!
//! The quote provider is replaced by a local axum router with a configurable
//! delay and body; the store is a SQLite file in a temporary directory. The
//! quote server itself runs on a random loopback port and is queried with
//! reqwest, exactly as the requester would.
//!
//! Run with:
//!   cargo test -p quote_server --test pipeline

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use futures_util::future::join_all;
use quote_common::deadline::ServerDeadlines;
use quote_common::{CurrencyPair, QuoteError};
use quote_server::server::serve;
use quote_server::store::DEFAULT_MAX_CONNECTIONS;
use quote_server::{QuoteHandler, RateStore, UpstreamClient};
use sqlx::ConnectOptions;
use sqlx::sqlite::SqliteConnectOptions;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

// ── Helpers ───────────────────────────────────────────────────────────────────

const USDBRL_OK: &str = r#"{"USDBRL":{"code":"USD","codein":"BRL","name":"Dólar Americano/Real Brasileiro","high":"5.2561","low":"5.2201","varBid":"0.0012","pctChange":"0.02","bid":"5.23","ask":"5.2310","timestamp":"1718136000","create_date":"2024-06-11 17:00:00"}}"#;

const GENEROUS: Duration = Duration::from_secs(2);

struct MockUpstream {
    delay: Duration,
    body: &'static str,
    hits: AtomicUsize,
}

async fn provider(State(mock): State<Arc<MockUpstream>>) -> impl IntoResponse {
    mock.hits.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(mock.delay).await;
    ([(header::CONTENT_TYPE, "application/json")], mock.body)
}

/// Start a fake provider answering `GET /json/last/USD-BRL`.
async fn start_upstream(delay: Duration, body: &'static str) -> (String, Arc<MockUpstream>) {
    let mock = Arc::new(MockUpstream {
        delay,
        body,
        hits: AtomicUsize::new(0),
    });
    let app = Router::new()
        .route("/json/last/USD-BRL", get(provider))
        .with_state(Arc::clone(&mock));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock upstream error");
    });
    (base, mock)
}

async fn open_store() -> (TempDir, RateStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = RateStore::open(dir.path().join("exchange_rates.db"), DEFAULT_MAX_CONNECTIONS)
        .await
        .unwrap();
    store.ensure_schema().await.unwrap();
    (dir, store)
}

fn handler(base: &str, store: &RateStore, deadlines: ServerDeadlines) -> Arc<QuoteHandler> {
    let upstream = UpstreamClient::new(base, CurrencyPair::UsdBrl);
    Arc::new(QuoteHandler::new(upstream, store.clone(), deadlines))
}

/// Start the quote server; returns its base URL and the shutdown trigger.
async fn start_server(handler: Arc<QuoteHandler>) -> (String, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/cotacao", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        serve(listener, handler, async {
            let _ = rx.await;
        })
        .await
        .expect("Quote server error");
    });
    (url, tx)
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn success_serves_upstream_bid_and_records_one_row() {
    let (base, mock) = start_upstream(Duration::from_millis(5), USDBRL_OK).await;
    let (_dir, store) = open_store().await;
    let (url, _shutdown) = start_server(handler(&base, &store, ServerDeadlines::default())).await;

    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.headers()[reqwest::header::CONTENT_TYPE],
        "application/json"
    );
    assert_eq!(response.text().await.unwrap(), r#""5.23""#);

    let rows = store.rows().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].record.bid, "5.23");
    assert_eq!(rows[0].record.code, "USD");
    assert_eq!(rows[0].record.code_in, "BRL");
    assert_eq!(mock.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn slow_upstream_fails_without_touching_store() {
    let (base, mock) = start_upstream(Duration::from_millis(250), USDBRL_OK).await;
    let (_dir, store) = open_store().await;
    let deadlines = ServerDeadlines { upstream: Duration::from_millis(200), store: GENEROUS };
    let (url, _shutdown) = start_server(handler(&base, &store, deadlines)).await;

    let before = store.count().await.unwrap();
    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(
        response.text().await.unwrap(),
        "Error getting exchange rate: deadline of 200ms exceeded"
    );
    assert_eq!(store.count().await.unwrap(), before);
    assert_eq!(mock.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn slow_upstream_is_reported_as_upstream_timeout() {
    let (base, _mock) = start_upstream(Duration::from_millis(250), USDBRL_OK).await;
    let (_dir, store) = open_store().await;
    let deadlines = ServerDeadlines { upstream: Duration::from_millis(200), store: GENEROUS };
    let handler = handler(&base, &store, deadlines);

    let err = handler.quote().await.unwrap_err();
    assert!(matches!(err, QuoteError::Upstream(_)));
    assert!(err.is_timeout());
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn malformed_payload_is_a_server_error() {
    let (base, _mock) = start_upstream(Duration::ZERO, r#"{"EURBRL":{}}"#).await;
    let (_dir, store) = open_store().await;
    let deadlines = ServerDeadlines { upstream: GENEROUS, store: GENEROUS };
    let (url, _shutdown) = start_server(handler(&base, &store, deadlines)).await;

    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(
        response.text().await.unwrap(),
        "Error getting exchange rate: missing key `USDBRL` in payload"
    );
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn store_timeout_fails_even_though_fetch_succeeded() {
    let (base, mock) = start_upstream(Duration::ZERO, USDBRL_OK).await;
    let (dir, store) = open_store().await;
    let deadlines = ServerDeadlines { upstream: GENEROUS, store: Duration::from_millis(100) };
    let (url, _shutdown) = start_server(handler(&base, &store, deadlines)).await;

    // Hold the write lock from a second connection so the insert cannot finish.
    let mut blocker = SqliteConnectOptions::new()
        .filename(dir.path().join("exchange_rates.db"))
        .connect()
        .await
        .unwrap();
    sqlx::query("BEGIN IMMEDIATE").execute(&mut blocker).await.unwrap();

    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.status().as_u16(), 500);
    assert!(
        response
            .text()
            .await
            .unwrap()
            .starts_with("Error persisting exchange rate:")
    );
    assert_eq!(mock.hits.load(Ordering::SeqCst), 1);

    sqlx::query("ROLLBACK").execute(&mut blocker).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn concurrent_invocations_release_every_connection() {
    const N: usize = 16;
    let (base, _mock) = start_upstream(Duration::from_millis(5), USDBRL_OK).await;
    let (_dir, store) = open_store().await;
    let deadlines = ServerDeadlines { upstream: GENEROUS, store: GENEROUS };
    let handler = handler(&base, &store, deadlines);

    let results = join_all((0..N).map(|_| {
        let handler = Arc::clone(&handler);
        async move { handler.quote().await }
    }))
    .await;
    assert!(results.iter().all(|r| matches!(r, Ok(body) if body == br#""5.23""#)));

    let (slow_base, _slow) = start_upstream(Duration::from_millis(200), USDBRL_OK).await;
    let timing_out = self::handler(
        &slow_base,
        &store,
        ServerDeadlines { upstream: Duration::from_millis(20), store: GENEROUS },
    );
    let failures = join_all((0..N).map(|_| {
        let handler = Arc::clone(&timing_out);
        async move { handler.quote().await }
    }))
    .await;
    assert!(failures.iter().all(|r| matches!(r, Err(e) if e.is_timeout())));

    // Released connections are handed back to the pool asynchronously.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let (size, idle) = store.connections();
    assert!(size >= 1 && size <= DEFAULT_MAX_CONNECTIONS);
    assert_eq!(idle, size as usize);
    assert_eq!(store.count().await.unwrap(), N as i64);
}

#[tokio::test]
async fn repeated_successes_append_one_row_each() {
    const K: i64 = 5;
    let (base, mock) = start_upstream(Duration::ZERO, USDBRL_OK).await;
    let (_dir, store) = open_store().await;
    let (url, _shutdown) = start_server(handler(&base, &store, ServerDeadlines::default())).await;

    let client = reqwest::Client::new();
    for _ in 0..K {
        let response = client.get(&url).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 200);
    }

    let rows = store.rows().await.unwrap();
    assert_eq!(rows.len() as i64, K);
    assert!(rows.windows(2).all(|w| w[0].id < w[1].id));
    assert_eq!(mock.hits.load(Ordering::SeqCst), K as usize);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn default_budgets_cover_concurrent_round_trips() {
    const N: usize = 8;
    let (base, _mock) = start_upstream(Duration::from_millis(5), USDBRL_OK).await;
    let (_dir, store) = open_store().await;
    let (url, _shutdown) = start_server(handler(&base, &store, ServerDeadlines::default())).await;

    let client = reqwest::Client::new();
    let statuses = join_all((0..N).map(|_| {
        let client = client.clone();
        let url = url.clone();
        async move { client.get(&url).send().await.unwrap().status().as_u16() }
    }))
    .await;

    let ok = statuses.iter().filter(|s| **s == 200).count();
    assert!(statuses.iter().all(|s| *s == 200 || *s == 500));
    assert!(ok > 0);
    assert_eq!(store.count().await.unwrap(), ok as i64);
}

#[tokio::test]
async fn only_the_quote_route_is_served() {
    let (base, mock) = start_upstream(Duration::ZERO, USDBRL_OK).await;
    let (_dir, store) = open_store().await;
    let (url, _shutdown) = start_server(handler(&base, &store, ServerDeadlines::default())).await;

    let other = url.replace("/cotacao", "/quote");
    let response = reqwest::get(&other).await.unwrap();
    assert_eq!(response.status().as_u16(), 404);
    assert_eq!(mock.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn shutdown_then_close_releases_the_store() {
    let (base, _mock) = start_upstream(Duration::ZERO, USDBRL_OK).await;
    let (_dir, store) = open_store().await;
    let deadlines = ServerDeadlines { upstream: GENEROUS, store: GENEROUS };
    let (url, shutdown) = start_server(handler(&base, &store, deadlines)).await;

    assert_eq!(reqwest::get(&url).await.unwrap().status().as_u16(), 200);
    shutdown.send(()).unwrap();
    store.close().await;
    assert!(store.is_closed());
}

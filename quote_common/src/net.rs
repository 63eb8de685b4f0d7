//! Shared networking constants and helpers used by the server and the requester.

/// TCP port the quote server listens on by default.
pub const SERVER_PORT: u16 = 8080;
/// The only route served by the quote server.
pub const QUOTE_ROUTE: &str = "/cotacao";
/// Base URL of the external quote provider.
pub const UPSTREAM_BASE_URL: &str = "https://economia.awesomeapi.com.br";
/// Default SQLite file backing the rate store.
pub const DB_PATH: &str = "./exchange_rates.db";
/// Default sink written by the requester.
pub const SINK_PATH: &str = "./cotacao.txt";
/// Label prefixed to the quote in the sink.
pub const SINK_LABEL: &str = "Dollar";

/// Helper to format an address with a port like "ip:port".
pub fn addr(ip: &str, port: u16) -> String {
    format!("{}:{}", ip, port)
}

/// Joins a base URL and a route, tolerating a trailing slash on the base.
pub fn join_url(base: &str, route: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), route)
}

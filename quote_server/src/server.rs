//! HTTP surface of the quote server.
use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use log::{error, info};
use quote_common::net::QUOTE_ROUTE;
use tokio::net::TcpListener;

use crate::handler::{QuoteHandler, get_quote};

/// Router exposing `GET /cotacao` and nothing else.
pub fn router(handler: Arc<QuoteHandler>) -> Router {
    Router::new()
        .route(QUOTE_ROUTE, get(get_quote))
        .with_state(handler)
}

/// Serve `handler` on `listener` until `shutdown` resolves.
///
/// Every inbound request runs on its own task. In-flight requests are allowed
/// to finish before this returns.
pub async fn serve<S>(
    listener: TcpListener,
    handler: Arc<QuoteHandler>,
    shutdown: S,
) -> std::io::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    info!("Quote server listening on {}", listener.local_addr()?);
    axum::serve(listener, router(handler))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received. Stopping quote server...");
}

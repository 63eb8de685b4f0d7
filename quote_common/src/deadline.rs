//! Per-hop time budgets.
//!
//! Each hop of the pipeline carries its own, independent deadline: the requester
//! waits for the server, the server waits for the provider, the server waits for
//! the store. Budgets are never derived from one another, so the child budgets
//! must be provisioned to fit inside the parent's with room for overhead.
//!
//! [`within`] enforces a budget on a future. When the budget elapses the future
//! is dropped, which closes the HTTP connection or returns the pooled database
//! connection it was holding.

use std::future::Future;
use std::time::Duration;

use crate::error::Cause;

/// Requester → server budget.
pub const REQUEST_BUDGET: Duration = Duration::from_millis(300);
/// Server → provider budget.
pub const UPSTREAM_BUDGET: Duration = Duration::from_millis(200);
/// Server → store budget. Storage is local; a slow insert is a fault.
pub const STORE_BUDGET: Duration = Duration::from_millis(10);

/// Budgets applied by the server for one handler invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerDeadlines {
    /// Deadline of the provider fetch.
    pub upstream: Duration,
    /// Deadline of the store insert.
    pub store: Duration,
}

impl Default for ServerDeadlines {
    fn default() -> Self {
        Self {
            upstream: UPSTREAM_BUDGET,
            store: STORE_BUDGET,
        }
    }
}

impl ServerDeadlines {
    /// Build budgets from millisecond values as given on the command line.
    pub fn from_millis(upstream_ms: u64, store_ms: u64) -> Self {
        Self {
            upstream: Duration::from_millis(upstream_ms),
            store: Duration::from_millis(store_ms),
        }
    }

    /// Worst-case time spent waiting on the provider and the store together.
    pub fn total(&self) -> Duration {
        self.upstream + self.store
    }

    /// `true` if a fully successful invocation can finish before a caller
    /// waiting `request` gives up.
    pub fn fits_within(&self, request: Duration) -> bool {
        self.total() < request
    }
}

/// Run `fut` with `budget` as its deadline.
///
/// Returns the future's own result, or `Cause::DeadlineExceeded(budget)` if the
/// budget elapses first; in that case `fut` is dropped before returning.
pub async fn within<F, T, E>(budget: Duration, fut: F) -> Result<T, Cause>
where
    F: Future<Output = Result<T, E>>,
    E: Into<Cause>,
{
    match tokio::time::timeout(budget, fut).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(Cause::DeadlineExceeded(budget)),
    }
}

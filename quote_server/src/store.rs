//! SQLite-backed rate store.
//!
//! The store owns the `exchange_rates` table and only ever appends to it. A
//! `RateStore` is a cheap handle over a connection pool: clones share the same
//! pool, so one store opened at startup serves every concurrent handler.

use std::path::Path;
use std::time::Duration;

use log::{debug, info};
use quote_common::deadline::within;
use quote_common::{Cause, QuoteError, RateRecord, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, Row, Sqlite, Transaction};

const CREATE_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS exchange_rates (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        Code TEXT,
        CodeIn TEXT,
        Name TEXT,
        High TEXT,
        Low TEXT,
        VarBid TEXT,
        PctChange TEXT,
        Bid TEXT,
        Ask TEXT,
        Timestamp TEXT,
        CreateDate TEXT
    )";

const INSERT_SQL: &str = "
    INSERT INTO exchange_rates (Code, CodeIn, Name, High, Low, VarBid, PctChange, Bid, Ask, Timestamp, CreateDate)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

/// Default upper bound on pooled connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// A persisted `RateRecord` with its store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRow {
    /// Monotonic row id.
    pub id: i64,
    /// The record exactly as inserted.
    pub record: RateRecord,
}

impl<'r> FromRow<'r, SqliteRow> for StoredRow {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(StoredRow {
            id: row.try_get("id")?,
            record: RateRecord {
                code: row.try_get("Code")?,
                code_in: row.try_get("CodeIn")?,
                name: row.try_get("Name")?,
                high: row.try_get("High")?,
                low: row.try_get("Low")?,
                var_bid: row.try_get("VarBid")?,
                pct_change: row.try_get("PctChange")?,
                bid: row.try_get("Bid")?,
                ask: row.try_get("Ask")?,
                timestamp: row.try_get("Timestamp")?,
                create_date: row.try_get("CreateDate")?,
            },
        })
    }
}

/// Append-only store of fetched rates.
#[derive(Debug, Clone)]
pub struct RateStore {
    pool: SqlitePool,
}

impl RateStore {
    /// Open (creating if missing) the SQLite file at `path`.
    pub async fn open(path: impl AsRef<Path>, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(QuoteError::init)?;
        info!("Rate store opened at {}", path.as_ref().display());
        Ok(Self { pool })
    }

    /// Create the `exchange_rates` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE_SQL)
            .execute(&self.pool)
            .await
            .map_err(QuoteError::init)?;
        debug!("Schema ready");
        Ok(())
    }

    /// Append `record`, bound to `deadline`, and return the new row id.
    ///
    /// `BEGIN` and the `INSERT` run under the deadline; if it fires the
    /// transaction is dropped uncommitted and rolled back. The commit runs
    /// outside the deadline, so its outcome alone decides whether the row
    /// exists: an `Err` from here never leaves a committed row behind.
    pub async fn insert(&self, record: &RateRecord, deadline: Duration) -> Result<i64> {
        let (tx, id) = within(deadline, self.begin_insert(record))
            .await
            .map_err(QuoteError::Store)?;
        tx.commit().await.map_err(QuoteError::store)?;
        Ok(id)
    }

    async fn begin_insert(
        &self,
        record: &RateRecord,
    ) -> std::result::Result<(Transaction<'static, Sqlite>, i64), Cause> {
        let mut tx = self.pool.begin().await?;
        let id = sqlx::query(INSERT_SQL)
            .bind(&record.code)
            .bind(&record.code_in)
            .bind(&record.name)
            .bind(&record.high)
            .bind(&record.low)
            .bind(&record.var_bid)
            .bind(&record.pct_change)
            .bind(&record.bid)
            .bind(&record.ask)
            .bind(&record.timestamp)
            .bind(&record.create_date)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();
        Ok((tx, id))
    }

    /// Number of stored rows.
    pub async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM exchange_rates")
            .fetch_one(&self.pool)
            .await
            .map_err(QuoteError::store)
    }

    /// All stored rows in insertion order.
    pub async fn rows(&self) -> Result<Vec<StoredRow>> {
        sqlx::query_as::<_, StoredRow>("SELECT * FROM exchange_rates ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(QuoteError::store)
    }

    /// Open connections and how many of them are idle, in that order.
    pub fn connections(&self) -> (u32, usize) {
        (self.pool.size(), self.pool.num_idle())
    }

    /// Close every pooled connection. Waits for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Rate store closed");
    }

    /// `true` once [`RateStore::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

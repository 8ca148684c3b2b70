//! Persistence seams for the stock and sales ledgers
//!
//! The engine only needs "read by filter" and "write one record". Each write
//! is atomic on its own; nothing here spans records.

use async_trait::async_trait;
use shared::{LedgerKey, LineFilter, SaleRecord, StockLine, StockStatus};
use thiserror::Error;
use uuid::Uuid;

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Store operation error
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("record {0} does not exist")]
    Missing(Uuid),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for stock lines
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Earliest-created line for the key.
    ///
    /// With `status` unset any active line matches; `open-stock-day`
    /// snapshots are only returned when asked for by status.
    async fn find_line(
        &self,
        key: &LedgerKey,
        status: Option<StockStatus>,
    ) -> StoreResult<Option<StockLine>>;

    /// All lines matching the filter, in creation order
    async fn list_lines(&self, filter: &LineFilter) -> StoreResult<Vec<StockLine>>;

    async fn insert_line(&self, line: &StockLine) -> StoreResult<()>;

    /// Replace the stored line with the same id
    async fn update_line(&self, line: &StockLine) -> StoreResult<()>;

    async fn health(&self) -> StoreResult<()>;
}

/// Persistence for sale records
#[async_trait]
pub trait SalesStore: Send + Sync {
    async fn find_sales(&self, key: &LedgerKey) -> StoreResult<Vec<SaleRecord>>;

    async fn list_sales(&self) -> StoreResult<Vec<SaleRecord>>;

    async fn insert_sale(&self, record: &SaleRecord) -> StoreResult<()>;

    async fn update_sale(&self, record: &SaleRecord) -> StoreResult<()>;
}

/// Shared matching rule for `find_line`
pub(crate) fn line_matches(
    line: &StockLine,
    key: &LedgerKey,
    status: Option<StockStatus>,
) -> bool {
    line.date == key.date
        && line.item == key.item
        && match status {
            Some(status) => line.status == status,
            None => line.status.is_active(),
        }
}

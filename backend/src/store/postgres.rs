use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{LedgerKey, LineFilter, SaleRecord, StockLine, StockStatus};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{LedgerStore, SalesStore, StoreError, StoreResult};

/// PostgreSQL-backed ledger and sales store
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

/// Row for stock line queries
#[derive(Debug, FromRow)]
struct StockLineRow {
    id: Uuid,
    date: NaiveDate,
    item: String,
    status: String,
    quantity: i64,
    selling_price_per_unit: Decimal,
    cost_price_per_unit: Decimal,
    total_amount: Decimal,
    location: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<StockLineRow> for StockLine {
    type Error = StoreError;

    fn try_from(row: StockLineRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<StockStatus>().map_err(StoreError::Corrupt)?;
        Ok(StockLine {
            id: row.id,
            date: row.date,
            item: row.item,
            status,
            quantity: row.quantity,
            selling_price_per_unit: row.selling_price_per_unit,
            cost_price_per_unit: row.cost_price_per_unit,
            total_amount: row.total_amount,
            location: row.location,
            created_at: row.created_at,
        })
    }
}

/// Row for sale record queries
#[derive(Debug, FromRow)]
struct SaleRecordRow {
    id: Uuid,
    date: NaiveDate,
    item: String,
    quantity: i64,
    total_amount: Decimal,
    profit: Option<Decimal>,
    customer_name: Option<String>,
    phone_number: Option<String>,
    comment: Option<String>,
    user_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<SaleRecordRow> for SaleRecord {
    fn from(row: SaleRecordRow) -> Self {
        SaleRecord {
            id: row.id,
            date: row.date,
            item: row.item,
            quantity: row.quantity,
            total_amount: row.total_amount,
            profit: row.profit,
            customer_name: row.customer_name,
            phone_number: row.phone_number,
            comment: row.comment,
            user: row.user_id,
            created_at: row.created_at,
        }
    }
}

const LINE_COLUMNS: &str = "id, date, item, status, quantity, selling_price_per_unit, \
     cost_price_per_unit, total_amount, location, created_at";

const SALE_COLUMNS: &str = "id, date, item, quantity, total_amount, profit, customer_name, \
     phone_number, comment, user_id, created_at";

impl PgStore {
    /// Create a new PgStore instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    fn collect_lines(rows: Vec<StockLineRow>) -> StoreResult<Vec<StockLine>> {
        rows.into_iter().map(StockLine::try_from).collect()
    }
}

#[async_trait]
impl LedgerStore for PgStore {
    async fn find_line(
        &self,
        key: &LedgerKey,
        status: Option<StockStatus>,
    ) -> StoreResult<Option<StockLine>> {
        let row = match status {
            Some(status) => {
                sqlx::query_as::<_, StockLineRow>(&format!(
                    "SELECT {LINE_COLUMNS} FROM stock_lines \
                     WHERE date = $1 AND item = $2 AND status = $3 \
                     ORDER BY seq LIMIT 1"
                ))
                .bind(key.date)
                .bind(&key.item)
                .bind(status.as_str())
                .fetch_optional(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, StockLineRow>(&format!(
                    "SELECT {LINE_COLUMNS} FROM stock_lines \
                     WHERE date = $1 AND item = $2 AND status <> $3 \
                     ORDER BY seq LIMIT 1"
                ))
                .bind(key.date)
                .bind(&key.item)
                .bind(StockStatus::OpenStockDay.as_str())
                .fetch_optional(&self.db)
                .await?
            }
        };

        row.map(StockLine::try_from).transpose()
    }

    async fn list_lines(&self, filter: &LineFilter) -> StoreResult<Vec<StockLine>> {
        let rows = sqlx::query_as::<_, StockLineRow>(&format!(
            "SELECT {LINE_COLUMNS} FROM stock_lines \
             WHERE ($1::date IS NULL OR date = $1) \
               AND ($2::text IS NULL OR item = $2) \
               AND ($3::text IS NULL OR status = $3) \
             ORDER BY seq"
        ))
        .bind(filter.date)
        .bind(filter.item.as_deref())
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&self.db)
        .await?;

        Self::collect_lines(rows)
    }

    async fn insert_line(&self, line: &StockLine) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stock_lines (
                id, date, item, status, quantity, selling_price_per_unit,
                cost_price_per_unit, total_amount, location, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(line.id)
        .bind(line.date)
        .bind(&line.item)
        .bind(line.status.as_str())
        .bind(line.quantity)
        .bind(line.selling_price_per_unit)
        .bind(line.cost_price_per_unit)
        .bind(line.total_amount)
        .bind(&line.location)
        .bind(line.created_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn update_line(&self, line: &StockLine) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE stock_lines
            SET status = $2, quantity = $3, selling_price_per_unit = $4,
                cost_price_per_unit = $5, total_amount = $6, location = $7,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(line.id)
        .bind(line.status.as_str())
        .bind(line.quantity)
        .bind(line.selling_price_per_unit)
        .bind(line.cost_price_per_unit)
        .bind(line.total_amount)
        .bind(&line.location)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing(line.id));
        }

        Ok(())
    }

    async fn health(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}

#[async_trait]
impl SalesStore for PgStore {
    async fn find_sales(&self, key: &LedgerKey) -> StoreResult<Vec<SaleRecord>> {
        let rows = sqlx::query_as::<_, SaleRecordRow>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales_records \
             WHERE date = $1 AND item = $2 ORDER BY seq"
        ))
        .bind(key.date)
        .bind(&key.item)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(SaleRecord::from).collect())
    }

    async fn list_sales(&self) -> StoreResult<Vec<SaleRecord>> {
        let rows = sqlx::query_as::<_, SaleRecordRow>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales_records ORDER BY seq"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(SaleRecord::from).collect())
    }

    async fn insert_sale(&self, record: &SaleRecord) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sales_records (
                id, date, item, quantity, total_amount, profit, customer_name,
                phone_number, comment, user_id, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(record.id)
        .bind(record.date)
        .bind(&record.item)
        .bind(record.quantity)
        .bind(record.total_amount)
        .bind(record.profit)
        .bind(&record.customer_name)
        .bind(&record.phone_number)
        .bind(&record.comment)
        .bind(record.user)
        .bind(record.created_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn update_sale(&self, record: &SaleRecord) -> StoreResult<()> {
        // Only the amount changes after creation
        let result = sqlx::query("UPDATE sales_records SET total_amount = $2 WHERE id = $1")
            .bind(record.id)
            .bind(record.total_amount)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing(record.id));
        }

        Ok(())
    }
}

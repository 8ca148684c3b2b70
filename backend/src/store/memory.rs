use std::sync::RwLock;

use async_trait::async_trait;
use shared::{LedgerKey, LineFilter, SaleRecord, StockLine, StockStatus};

use super::{line_matches, LedgerStore, SalesStore, StoreError, StoreResult};

/// In-memory ledger and sales store.
///
/// Intended for tests/dev. Records keep insertion order, which doubles as
/// creation order for `find_line`.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    lines: RwLock<Vec<StockLine>>,
    sales: RwLock<Vec<SaleRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    async fn find_line(
        &self,
        key: &LedgerKey,
        status: Option<StockStatus>,
    ) -> StoreResult<Option<StockLine>> {
        let lines = self.lines.read().map_err(|_| StoreError::Poisoned)?;
        Ok(lines
            .iter()
            .find(|line| line_matches(line, key, status))
            .cloned())
    }

    async fn list_lines(&self, filter: &LineFilter) -> StoreResult<Vec<StockLine>> {
        let lines = self.lines.read().map_err(|_| StoreError::Poisoned)?;
        Ok(lines
            .iter()
            .filter(|line| filter.matches(line))
            .cloned()
            .collect())
    }

    async fn insert_line(&self, line: &StockLine) -> StoreResult<()> {
        let mut lines = self.lines.write().map_err(|_| StoreError::Poisoned)?;
        lines.push(line.clone());
        Ok(())
    }

    async fn update_line(&self, line: &StockLine) -> StoreResult<()> {
        let mut lines = self.lines.write().map_err(|_| StoreError::Poisoned)?;
        let stored = lines
            .iter_mut()
            .find(|stored| stored.id == line.id)
            .ok_or(StoreError::Missing(line.id))?;
        *stored = line.clone();
        Ok(())
    }

    async fn health(&self) -> StoreResult<()> {
        self.lines.read().map_err(|_| StoreError::Poisoned)?;
        Ok(())
    }
}

#[async_trait]
impl SalesStore for InMemoryStore {
    async fn find_sales(&self, key: &LedgerKey) -> StoreResult<Vec<SaleRecord>> {
        let sales = self.sales.read().map_err(|_| StoreError::Poisoned)?;
        Ok(sales
            .iter()
            .filter(|sale| sale.date == key.date && sale.item == key.item)
            .cloned()
            .collect())
    }

    async fn list_sales(&self) -> StoreResult<Vec<SaleRecord>> {
        let sales = self.sales.read().map_err(|_| StoreError::Poisoned)?;
        Ok(sales.clone())
    }

    async fn insert_sale(&self, record: &SaleRecord) -> StoreResult<()> {
        let mut sales = self.sales.write().map_err(|_| StoreError::Poisoned)?;
        sales.push(record.clone());
        Ok(())
    }

    async fn update_sale(&self, record: &SaleRecord) -> StoreResult<()> {
        let mut sales = self.sales.write().map_err(|_| StoreError::Poisoned)?;
        let stored = sales
            .iter_mut()
            .find(|stored| stored.id == record.id)
            .ok_or(StoreError::Missing(record.id))?;
        *stored = record.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use shared::StockReceipt;

    fn receipt(day: u32) -> StockReceipt {
        StockReceipt {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            item: "175/65R14".to_string(),
            quantity: 10,
            selling_price_per_unit: Decimal::from(120),
            cost_price_per_unit: Decimal::from(100),
            total_amount: Decimal::from(1000),
            location: String::new(),
        }
    }

    #[tokio::test]
    async fn test_find_line_skips_snapshots_unless_asked() {
        let store = InMemoryStore::new();
        let r = receipt(1);
        let key = LedgerKey::new(r.date, r.item.clone());

        let snapshot = StockLine::from_receipt(&r, StockStatus::OpenStockDay);
        store.insert_line(&snapshot).await.unwrap();
        assert!(store.find_line(&key, None).await.unwrap().is_none());

        let existing = StockLine::from_receipt(&r, StockStatus::ExistingStock);
        store.insert_line(&existing).await.unwrap();
        assert_eq!(store.find_line(&key, None).await.unwrap(), Some(existing));
        assert_eq!(
            store
                .find_line(&key, Some(StockStatus::OpenStockDay))
                .await
                .unwrap(),
            Some(snapshot)
        );
    }

    #[tokio::test]
    async fn test_find_line_returns_earliest() {
        let store = InMemoryStore::new();
        let r = receipt(1);
        let key = LedgerKey::new(r.date, r.item.clone());

        let first = StockLine::from_receipt(&r, StockStatus::OpenStock);
        let second = StockLine::from_receipt(&r, StockStatus::ExistingStock);
        store.insert_line(&first).await.unwrap();
        store.insert_line(&second).await.unwrap();

        assert_eq!(store.find_line(&key, None).await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn test_update_missing_record_fails() {
        let store = InMemoryStore::new();
        let line = StockLine::from_receipt(&receipt(1), StockStatus::OpenStock);
        let err = store.update_line(&line).await.unwrap_err();
        assert!(matches!(err, StoreError::Missing(id) if id == line.id));

        let sale = SaleRecord::receipt_correction(&receipt(1));
        assert!(store.update_sale(&sale).await.is_err());
    }

    #[tokio::test]
    async fn test_find_sales_by_key() {
        let store = InMemoryStore::new();
        store
            .insert_sale(&SaleRecord::receipt_correction(&receipt(1)))
            .await
            .unwrap();
        store
            .insert_sale(&SaleRecord::receipt_correction(&receipt(2)))
            .await
            .unwrap();

        let key = LedgerKey::new(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), "175/65R14");
        assert_eq!(store.find_sales(&key).await.unwrap().len(), 1);
        assert_eq!(store.list_sales().await.unwrap().len(), 2);
    }
}

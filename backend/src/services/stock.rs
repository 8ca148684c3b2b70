//! Stock reconciliation engine
//!
//! Keeps the stock ledger and the sales ledger consistent with each other
//! across receipts, sales and administrative open-stock overrides. The
//! branching lives in `shared::reconcile`; this module gathers the inputs
//! for it and applies the chosen outcome to the stores.
//!
//! The engine never reads the clock. Callers pass the day they consider
//! "today" wherever an operation needs one.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    extended_amount, shortfall, Actor, LedgerKey, LineFilter, ReceiptLookup, ReceiptPlacement,
    SaleLookup, SaleRecord, SaleRequest, SaleSource, StockLine, StockReceipt, StockStatus,
};
use validator::Validate;

use super::locks::KeyLocks;
use super::notification::{Notifier, SaleNotice};
use crate::error::{AppError, AppResult};
use crate::store::{LedgerStore, SalesStore};

/// Stock service driving the ledger state machine
#[derive(Clone)]
pub struct StockService {
    ledger: Arc<dyn LedgerStore>,
    sales: Arc<dyn SalesStore>,
    notifier: Arc<dyn Notifier>,
    locks: Arc<KeyLocks>,
}

/// What a receipt did to the ledgers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptSummary {
    pub placement: &'static str,
    pub opened_today: bool,
    pub corrected_sales: usize,
    pub profit: Decimal,
}

impl StockService {
    /// Create a new StockService instance
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        sales: Arc<dyn SalesStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            ledger,
            sales,
            notifier,
            locks: Arc::new(KeyLocks::new()),
        }
    }

    pub fn ledger(&self) -> &Arc<dyn LedgerStore> {
        &self.ledger
    }

    fn authorize(actor: &Actor) -> AppResult<()> {
        if actor.role.can_manage_stock() {
            Ok(())
        } else {
            tracing::warn!(user = %actor.user_id, role = %actor.role, "Role may not manage stock");
            Err(AppError::Forbidden)
        }
    }

    /// Record received inventory, fold it into the running ledger and
    /// correct the day's sales for the receipt's cost basis.
    pub async fn receive_stock(
        &self,
        actor: &Actor,
        receipt: StockReceipt,
    ) -> AppResult<ReceiptSummary> {
        Self::authorize(actor)?;
        receipt.validate()?;

        let key = LedgerKey::new(receipt.date, receipt.item.clone());
        let yesterday = key.previous();
        let _guards = self
            .locks
            .acquire(std::iter::once(key.clone()).chain(yesterday.clone()))
            .await;

        let placement = self.receipt_lookup(&key, yesterday.as_ref()).await?.placement();
        let opened_today = placement.opens_today_marker();
        let placement_name = placement.name();
        tracing::debug!(key = %key, placement = placement_name, "Placing stock receipt");

        match placement {
            ReceiptPlacement::MergeToday(mut line)
            | ReceiptPlacement::MergeYesterdayExisting(mut line) => {
                line.accrue(receipt.quantity, receipt.total_amount);
                self.ledger.update_line(&line).await?;
            }
            ReceiptPlacement::PromoteYesterdayOpen(mut line) => {
                line.status = StockStatus::ExistingStock;
                line.restate_from(&receipt);
                self.ledger.update_line(&line).await?;
            }
            ReceiptPlacement::OpenToday => {}
        }

        if opened_today {
            let marker = StockLine::from_receipt(&receipt, StockStatus::OpenStock);
            self.ledger.insert_line(&marker).await?;
        }

        // Every sale already booked for the day is restated at this receipt's cost
        let correction = extended_amount(receipt.quantity, receipt.cost_price_per_unit);
        let booked = self.sales.find_sales(&key).await?;
        let corrected_sales = booked.len();
        for mut sale in booked {
            sale.total_amount -= correction;
            self.sales.update_sale(&sale).await?;
        }

        let record = SaleRecord::receipt_correction(&receipt);
        self.sales.insert_sale(&record).await?;

        let profit = record.profit.unwrap_or_default();
        tracing::info!(
            key = %key,
            quantity = receipt.quantity,
            placement = placement_name,
            corrected_sales,
            %profit,
            "Stock received"
        );

        Ok(ReceiptSummary {
            placement: placement_name,
            opened_today,
            corrected_sales,
            profit,
        })
    }

    async fn receipt_lookup(
        &self,
        key: &LedgerKey,
        yesterday: Option<&LedgerKey>,
    ) -> AppResult<ReceiptLookup> {
        let today_active = self.ledger.find_line(key, None).await?;
        let Some(yesterday) = yesterday.filter(|_| today_active.is_none()) else {
            return Ok(ReceiptLookup {
                today_active,
                ..ReceiptLookup::default()
            });
        };

        let yesterday_existing = self
            .ledger
            .find_line(yesterday, Some(StockStatus::ExistingStock))
            .await?;
        let yesterday_open = match yesterday_existing {
            Some(_) => None,
            None => {
                self.ledger
                    .find_line(yesterday, Some(StockStatus::OpenStock))
                    .await?
            }
        };

        Ok(ReceiptLookup {
            today_active: None,
            yesterday_existing,
            yesterday_open,
        })
    }

    /// Administrative override of the day's open stock.
    ///
    /// Rewrites the open-stock line when there is one; otherwise writes the
    /// values straight into a new existing-stock line.
    pub async fn set_today_open_stock(
        &self,
        actor: &Actor,
        receipt: StockReceipt,
    ) -> AppResult<StockLine> {
        Self::authorize(actor)?;
        receipt.validate()?;

        let key = LedgerKey::new(receipt.date, receipt.item.clone());
        let _guards = self.locks.acquire([key.clone()]).await;

        let line = match self
            .ledger
            .find_line(&key, Some(StockStatus::OpenStock))
            .await?
        {
            Some(mut line) => {
                line.overwrite_from(&receipt);
                self.ledger.update_line(&line).await?;
                line
            }
            None => {
                let line = StockLine::from_receipt(&receipt, StockStatus::ExistingStock);
                self.ledger.insert_line(&line).await?;
                line
            }
        };

        tracing::info!(
            key = %key,
            status = %line.status,
            quantity = line.quantity,
            "Open stock set"
        );
        Ok(line)
    }

    /// Deplete stock for a sale and record it.
    ///
    /// `today` is used when the request carries no date.
    pub async fn record_sale(
        &self,
        actor: &Actor,
        today: NaiveDate,
        request: SaleRequest,
    ) -> AppResult<SaleRecord> {
        Self::authorize(actor)?;
        request.validate()?;

        let date = request.date.unwrap_or(today);
        let key = LedgerKey::new(date, request.item.clone());
        let guards = self.locks.acquire([key.clone()]).await;

        let mut line = match self.sale_lookup(&key).await?.source() {
            SaleSource::Line(line) => line,
            SaleSource::CloneOpen(open) => {
                let clone = open.copy_as(StockStatus::ExistingStock);
                self.ledger.insert_line(&clone).await?;
                tracing::debug!(key = %key, "Cloned open stock into existing stock");
                clone
            }
            SaleSource::Missing => {
                tracing::debug!(key = %key, "Item not found in stock");
                return Err(AppError::StockNotFound(key));
            }
        };

        if shortfall(&line, request.quantity).is_some() {
            return Err(AppError::InsufficientStock {
                key,
                available: line.quantity,
                requested: request.quantity,
            });
        }

        let amount = extended_amount(request.quantity, request.cost_price_per_unit);

        // A separate existing-stock line for the day is depleted as well
        if let Some(mut existing) = self
            .ledger
            .find_line(&key, Some(StockStatus::ExistingStock))
            .await?
        {
            if existing.id != line.id {
                existing.deduct(request.quantity, amount);
                self.ledger.update_line(&existing).await?;
            }
        }

        let record = SaleRecord::sale(&request, date, actor.user_id);
        self.sales.insert_sale(&record).await?;

        if line.status == StockStatus::OpenStock {
            self.activate(&key, &mut line).await?;
        }

        line.book_sale(request.quantity, amount);
        if let Err(e) = self.ledger.update_line(&line).await {
            tracing::error!(
                key = %key,
                sale = %record.id,
                "Sale recorded but stock line not updated: {}",
                e
            );
            return Err(e.into());
        }

        tracing::info!(
            key = %key,
            quantity = request.quantity,
            remaining = line.quantity,
            user = %actor.user_id,
            "Sale recorded"
        );

        drop(guards);

        // Delivery runs detached; neither the key lock nor the caller waits on it
        let notice = SaleNotice {
            date,
            item: key.item.clone(),
            quantity: request.quantity,
            total_amount: record.total_amount,
            remaining_quantity: line.quantity,
            user: actor.user_id,
        };
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(&notice).await {
                tracing::warn!(
                    item = %notice.item,
                    date = %notice.date,
                    "Sale notification failed: {}",
                    e
                );
            }
        });

        Ok(record)
    }

    async fn sale_lookup(&self, key: &LedgerKey) -> AppResult<SaleLookup> {
        let today_active = self.ledger.find_line(key, None).await?;
        let today_open = match today_active {
            Some(_) => None,
            None => {
                self.ledger
                    .find_line(key, Some(StockStatus::OpenStock))
                    .await?
            }
        };

        Ok(SaleLookup {
            today_active,
            today_open,
        })
    }

    /// First sale of the day on an open line: snapshot it once, then make it
    /// the day's existing stock.
    async fn activate(&self, key: &LedgerKey, line: &mut StockLine) -> AppResult<()> {
        let snapshot_exists = self
            .ledger
            .find_line(key, Some(StockStatus::OpenStockDay))
            .await?
            .is_some();

        if !snapshot_exists {
            let snapshot = line.copy_as(StockStatus::OpenStockDay);
            self.ledger.insert_line(&snapshot).await?;
            tracing::debug!(key = %key, quantity = snapshot.quantity, "Open stock day recorded");
        }

        line.status = StockStatus::ExistingStock;
        Ok(())
    }

    /// Every open-stock line
    pub async fn open_stock(&self) -> AppResult<Vec<StockLine>> {
        Ok(self
            .ledger
            .list_lines(&LineFilter::status(StockStatus::OpenStock))
            .await?)
    }

    /// Today's existing stock, or today's open stock when nothing is active yet
    pub async fn existing_stock(&self, today: NaiveDate) -> AppResult<Vec<StockLine>> {
        let existing = self
            .ledger
            .list_lines(&LineFilter::status(StockStatus::ExistingStock).on(today))
            .await?;
        if !existing.is_empty() {
            return Ok(existing);
        }

        Ok(self
            .ledger
            .list_lines(&LineFilter::status(StockStatus::OpenStock).on(today))
            .await?)
    }

    /// Every open-stock-day snapshot
    pub async fn open_stock_days(&self) -> AppResult<Vec<StockLine>> {
        Ok(self
            .ledger
            .list_lines(&LineFilter::status(StockStatus::OpenStockDay))
            .await?)
    }

    /// Every sale record, corrections included
    pub async fn sales_records(&self) -> AppResult<Vec<SaleRecord>> {
        Ok(self.sales.list_sales().await?)
    }
}

//! Stock ledger models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StockReceipt;

/// Lifecycle status of a stock line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatus {
    /// Inventory carried into a day, not yet activated by a sale
    OpenStock,
    /// The active, sale-decrementable line for a day
    ExistingStock,
    /// Write-once snapshot of an open-stock line at first-sale activation
    OpenStockDay,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::OpenStock => "open-stock",
            StockStatus::ExistingStock => "existing-stock",
            StockStatus::OpenStockDay => "open-stock-day",
        }
    }

    /// Active lines take part in receipts and sales; snapshots never do.
    pub fn is_active(&self) -> bool {
        !matches!(self, StockStatus::OpenStockDay)
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StockStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open-stock" => Ok(StockStatus::OpenStock),
            "existing-stock" => Ok(StockStatus::ExistingStock),
            "open-stock-day" => Ok(StockStatus::OpenStockDay),
            other => Err(format!("unknown stock status '{}'", other)),
        }
    }
}

/// One inventory record for one item on one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLine {
    pub id: Uuid,
    pub date: NaiveDate,
    /// Item key (the tyre size)
    pub item: String,
    pub status: StockStatus,
    pub quantity: i64,
    pub selling_price_per_unit: Decimal,
    pub cost_price_per_unit: Decimal,
    /// Running money handled through the line; not derived from quantity
    pub total_amount: Decimal,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

impl StockLine {
    /// Build a fresh line carrying the values of a receipt
    pub fn from_receipt(receipt: &StockReceipt, status: StockStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: receipt.date,
            item: receipt.item.clone(),
            status,
            quantity: receipt.quantity,
            selling_price_per_unit: receipt.selling_price_per_unit,
            cost_price_per_unit: receipt.cost_price_per_unit,
            total_amount: receipt.total_amount,
            location: receipt.location.clone(),
            created_at: Utc::now(),
        }
    }

    /// Copy this line's values into a new record with another status
    pub fn copy_as(&self, status: StockStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            status,
            created_at: Utc::now(),
            ..self.clone()
        }
    }

    /// Fold an additional receipt into the line
    pub fn accrue(&mut self, quantity: i64, amount: Decimal) {
        self.quantity += quantity;
        self.total_amount += amount;
    }

    /// Take a quantity and its value out of the line
    pub fn deduct(&mut self, quantity: i64, amount: Decimal) {
        self.quantity -= quantity;
        self.total_amount -= amount;
    }

    /// Book a sale: units leave the line, money handled through it grows
    pub fn book_sale(&mut self, quantity: i64, amount: Decimal) {
        self.quantity -= quantity;
        self.total_amount += amount;
    }

    /// Replace the receipt-carried values. The selling price is left alone.
    pub fn restate_from(&mut self, receipt: &StockReceipt) {
        self.quantity = receipt.quantity;
        self.total_amount = receipt.total_amount;
        self.cost_price_per_unit = receipt.cost_price_per_unit;
        self.location = receipt.location.clone();
    }

    /// Replace every mutable field, selling price included
    pub fn overwrite_from(&mut self, receipt: &StockReceipt) {
        self.restate_from(receipt);
        self.selling_price_per_unit = receipt.selling_price_per_unit;
    }
}

/// Filter used by the ledger queries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineFilter {
    pub date: Option<NaiveDate>,
    pub item: Option<String>,
    pub status: Option<StockStatus>,
}

impl LineFilter {
    pub fn status(status: StockStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn matches(&self, line: &StockLine) -> bool {
        self.date.map_or(true, |d| d == line.date)
            && self.item.as_deref().map_or(true, |i| i == line.item)
            && self.status.map_or(true, |s| s == line.status)
    }
}

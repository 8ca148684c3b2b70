//! Sales ledger models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{SaleRequest, StockReceipt};
use crate::reconcile::{extended_amount, receipt_profit};

/// One sale transaction, or the correction entry written by a stock receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    pub id: Uuid,
    pub date: NaiveDate,
    pub item: String,
    pub quantity: i64,
    pub total_amount: Decimal,
    /// Only present on receipt corrections
    pub profit: Option<Decimal>,
    pub customer_name: Option<String>,
    pub phone_number: Option<String>,
    pub comment: Option<String>,
    /// Attributed actor, only present on true sales
    pub user: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl SaleRecord {
    /// Entry logging a receipt's contribution at cost and its margin
    pub fn receipt_correction(receipt: &StockReceipt) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: receipt.date,
            item: receipt.item.clone(),
            quantity: receipt.quantity,
            total_amount: extended_amount(receipt.quantity, receipt.cost_price_per_unit),
            profit: Some(receipt_profit(
                receipt.quantity,
                receipt.selling_price_per_unit,
                receipt.cost_price_per_unit,
            )),
            customer_name: None,
            phone_number: None,
            comment: None,
            user: None,
            created_at: Utc::now(),
        }
    }

    /// A customer sale on `date`, attributed to `user`
    pub fn sale(request: &SaleRequest, date: NaiveDate, user: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            item: request.item.clone(),
            quantity: request.quantity,
            total_amount: extended_amount(request.quantity, request.cost_price_per_unit),
            profit: None,
            customer_name: request.customer_name.clone(),
            phone_number: request.phone_number.clone(),
            comment: request.comment.clone(),
            user: Some(user),
            created_at: Utc::now(),
        }
    }

    pub fn is_receipt_correction(&self) -> bool {
        self.profit.is_some()
    }
}

//! Request bodies accepted by the ledger operations

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Newly received inventory, also used for the open-stock override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StockReceipt {
    pub date: NaiveDate,
    #[serde(alias = "tyreSize")]
    #[validate(length(min = 1, message = "Item must not be empty"))]
    pub item: String,
    #[validate(range(min = 1, max = 1000000, message = "Quantity must be between 1 and 1000000"))]
    pub quantity: i64,
    /// Selling price per unit
    #[serde(rename = "SSP")]
    #[validate(custom = "crate::validation::validate_money")]
    pub selling_price_per_unit: Decimal,
    #[serde(rename = "costPricePerUnit", alias = "pricePerUnit")]
    #[validate(custom = "crate::validation::validate_money")]
    pub cost_price_per_unit: Decimal,
    #[serde(rename = "totalAmount")]
    #[validate(custom = "crate::validation::validate_money")]
    pub total_amount: Decimal,
    #[serde(default)]
    pub location: String,
}

/// A sale against the day's stock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    /// Day of the sale; the caller's current day when absent
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(alias = "tyreSize")]
    #[validate(length(min = 1, message = "Item must not be empty"))]
    pub item: String,
    #[validate(range(min = 1, max = 1000000, message = "Quantity must be between 1 and 1000000"))]
    pub quantity: i64,
    #[serde(alias = "pricePerUnit")]
    #[validate(custom = "crate::validation::validate_money")]
    pub cost_price_per_unit: Decimal,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

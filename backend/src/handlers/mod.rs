//! HTTP handlers for the Tyre Stock Ledger API

mod health;
mod sales;
mod stock;

pub use health::*;
pub use sales::*;
pub use stock::*;

use chrono::{NaiveDate, Utc};

/// The server's current day; the only place the API reads the clock
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

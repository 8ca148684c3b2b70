//! Reconciliation rules for the stock ledger
//!
//! The engine gathers what the stores hold for a key and hands it to the
//! decision tables below; the tables pick exactly one outcome. Keeping the
//! branching here, away from the store calls, lets every outcome be tested
//! without persistence.
//!
//! Receipts (first table):
//!
//! | line today | existing yesterday | open yesterday | outcome                  |
//! |------------|--------------------|----------------|--------------------------|
//! | yes        | -                  | -              | merge into today's line  |
//! | no         | yes                | -              | merge into yesterday's   |
//! | no         | no                 | yes            | promote yesterday's open |
//! | no         | no                 | no             | open a line today        |
//!
//! Every outcome except the first also leaves one fresh `open-stock` line
//! for today.

use rust_decimal::Decimal;

use crate::models::StockLine;

/// What the stores hold for a receipt's key
#[derive(Debug, Clone, Default)]
pub struct ReceiptLookup {
    /// Any active line on the receipt's day
    pub today_active: Option<StockLine>,
    pub yesterday_existing: Option<StockLine>,
    pub yesterday_open: Option<StockLine>,
}

/// Where a receipt lands
#[derive(Debug, Clone, PartialEq)]
pub enum ReceiptPlacement {
    /// Additional receipt on an already active day
    MergeToday(StockLine),
    /// Yesterday's active line keeps accruing
    MergeYesterdayExisting(StockLine),
    /// Yesterday's open line becomes existing-stock and takes the receipt's values
    PromoteYesterdayOpen(StockLine),
    /// No carry-over anywhere
    OpenToday,
}

impl ReceiptLookup {
    pub fn placement(self) -> ReceiptPlacement {
        match (self.today_active, self.yesterday_existing, self.yesterday_open) {
            (Some(line), _, _) => ReceiptPlacement::MergeToday(line),
            (None, Some(line), _) => ReceiptPlacement::MergeYesterdayExisting(line),
            (None, None, Some(line)) => ReceiptPlacement::PromoteYesterdayOpen(line),
            (None, None, None) => ReceiptPlacement::OpenToday,
        }
    }
}

impl ReceiptPlacement {
    /// Whether today gets a fresh open-stock line carrying the receipt
    pub fn opens_today_marker(&self) -> bool {
        !matches!(self, ReceiptPlacement::MergeToday(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            ReceiptPlacement::MergeToday(_) => "merge_today",
            ReceiptPlacement::MergeYesterdayExisting(_) => "merge_yesterday_existing",
            ReceiptPlacement::PromoteYesterdayOpen(_) => "promote_yesterday_open",
            ReceiptPlacement::OpenToday => "open_today",
        }
    }
}

/// What the stores hold for a sale's key
#[derive(Debug, Clone, Default)]
pub struct SaleLookup {
    pub today_active: Option<StockLine>,
    pub today_open: Option<StockLine>,
}

/// Which line a sale depletes
#[derive(Debug, Clone, PartialEq)]
pub enum SaleSource {
    Line(StockLine),
    /// Clone the open line into a new existing-stock line and sell from that
    CloneOpen(StockLine),
    Missing,
}

impl SaleLookup {
    pub fn source(self) -> SaleSource {
        match (self.today_active, self.today_open) {
            (Some(line), _) => SaleSource::Line(line),
            (None, Some(open)) => SaleSource::CloneOpen(open),
            (None, None) => SaleSource::Missing,
        }
    }
}

/// Units missing for a sale, if the line cannot cover it.
///
/// An open-stock line is checked too: the sale activates it into the day's
/// existing stock, which must not go negative.
pub fn shortfall(line: &StockLine, requested: i64) -> Option<i64> {
    (line.status.is_active() && line.quantity < requested).then(|| requested - line.quantity)
}

/// `quantity * price`
pub fn extended_amount(quantity: i64, price: Decimal) -> Decimal {
    Decimal::from(quantity) * price
}

/// Margin a receipt contributes: `quantity * (SSP - cost)`
pub fn receipt_profit(quantity: i64, selling_price: Decimal, cost_price: Decimal) -> Decimal {
    Decimal::from(quantity) * (selling_price - cost_price)
}

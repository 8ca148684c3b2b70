//! Business logic services for the Tyre Stock Ledger

pub mod locks;
pub mod notification;
pub mod stock;

pub use notification::{
    notifier_from_config, LogNotifier, Notifier, NotifyError, SaleNotice, WebhookNotifier,
};
pub use stock::{ReceiptSummary, StockService};

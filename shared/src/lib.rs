//! Shared types and rules for the Tyre Stock Ledger
//!
//! This crate contains the stock and sales models, the wire shapes of the
//! ledger requests, and the pure reconciliation rules used by the backend
//! engine. Nothing here performs I/O.

pub mod models;
pub mod reconcile;
pub mod types;
pub mod validation;

pub use models::*;
pub use reconcile::*;
pub use types::*;
pub use validation::*;

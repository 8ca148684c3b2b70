//! Domain models for the Tyre Stock Ledger

mod requests;
mod sale;
mod stock;
mod user;

pub use requests::*;
pub use sale::*;
pub use stock::*;
pub use user::*;

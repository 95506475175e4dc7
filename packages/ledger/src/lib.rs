pub mod app;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use error::LedgerError;
pub use services::{Ledger, LedgerStore};

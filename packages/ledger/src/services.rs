pub mod ledger;
pub mod store;
pub mod tally;

pub use ledger::Ledger;
pub use store::LedgerStore;

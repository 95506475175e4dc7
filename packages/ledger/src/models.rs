pub mod tally;
pub mod vote;

pub use tally::*;
pub use vote::*;

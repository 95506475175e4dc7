pub mod api;
pub mod cli;
pub mod proof;

pub use api::*;
pub use cli::*;
pub use proof::*;

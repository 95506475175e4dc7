pub mod config;
pub mod error;
pub mod models;
pub mod node;
pub mod proof;
pub mod server;

pub use config::*;
pub use error::*;
pub use models::*;
pub use node::*;
pub use proof::*;
pub use server::*;

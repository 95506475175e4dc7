pub mod auth;
pub mod config;
#[cfg(any(test, feature = "test-fixtures"))]
pub mod test_setup;
pub mod websocket;

use std::sync::Arc;

use crate::services::Ledger;
use crate::utils::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(ledger: Arc<Ledger>, config: Arc<Config>) -> Self {
        AppState { ledger, config }
    }
}

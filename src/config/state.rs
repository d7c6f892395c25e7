// Application state module
// Shared, read-only state handed to every connection

use std::sync::Arc;

use super::types::Config;
use crate::dispatch::{DispatchLog, Dispatcher};

/// Application state
pub struct AppState {
    pub config: Config,
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(config: Config, dispatch_log: Arc<dyn DispatchLog>) -> Self {
        Self {
            config,
            dispatcher: Dispatcher::new(dispatch_log),
        }
    }
}

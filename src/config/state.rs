// Application state module
// Shared, read-only state handed to every connection

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use super::types::Config;
use crate::loader::DataLoader;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Stateless loader; each request performs its own load
    pub loader: DataLoader,
    /// Connections currently being served
    pub active_connections: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            loader: config.data_loader(),
            config: config.clone(),
            active_connections: Arc::new(AtomicUsize::new(0)),
        }
    }
}

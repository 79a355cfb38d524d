use std::sync::Arc;
use magneticow_core::{Config, TorrentCatalog};

/// Shared application state
pub struct AppState {
    config: Config,
    catalog: Arc<dyn TorrentCatalog>,
}

impl AppState {
    pub fn new(config: Config, catalog: Arc<dyn TorrentCatalog>) -> Self {
        Self { config, catalog }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &dyn TorrentCatalog {
        self.catalog.as_ref()
    }

    /// Rows per search page. Fixed by configuration, never by the client.
    pub fn page_size(&self) -> u32 {
        self.config.search.page_size
    }
}

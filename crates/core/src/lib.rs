pub mod catalog;
pub mod config;
pub mod metrics;
pub mod search;
pub mod testing;

pub use catalog::{
    CatalogError, CatalogStats, NewTorrent, SqliteCatalog, TorrentCatalog, TorrentFile,
    TorrentMetadata,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    SearchConfig, ServerConfig,
};
pub use search::{
    search, Cursor, Direction, OrderedValue, OrderingCriterion, RawSearchParams, SearchError,
    SearchRequest, TorrentPage, TorrentQuery,
};

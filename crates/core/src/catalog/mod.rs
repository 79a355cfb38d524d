//! Torrent catalog - the store of discovered torrents that searches run against.
//!
//! Records are appended by the ingestion side and read concurrently by the
//! search API. Keyset pagination stays correct under concurrent appends as
//! long as a record's sort fields never move backwards once it has been
//! returned to a client.

mod sqlite;
mod types;

pub use sqlite::SqliteCatalog;
pub use types::*;

use crate::search::TorrentQuery;

/// Trait for torrent catalog storage.
pub trait TorrentCatalog: Send + Sync {
    /// Fetch one page of torrents.
    ///
    /// Only torrents discovered at or before `query.epoch` are visible. Rows
    /// are sorted by `(primary key, id)` in `query.direction`, start strictly
    /// after `query.cursor` when one is given, and number at most
    /// `query.page_size`. Text searches fill in `relevance`.
    fn query_torrents(&self, query: &TorrentQuery) -> Result<Vec<TorrentMetadata>, CatalogError>;

    /// Get a specific torrent by info hash.
    fn get_torrent(&self, info_hash: &str) -> Result<TorrentMetadata, CatalogError>;

    /// List the files of a torrent.
    fn get_files(&self, info_hash: &str) -> Result<Vec<TorrentFile>, CatalogError>;

    /// Get catalog statistics.
    fn stats(&self) -> Result<CatalogStats, CatalogError>;

    /// Add a newly discovered torrent, returning its id.
    fn insert(&self, torrent: &NewTorrent) -> Result<i64, CatalogError>;

    /// Remove a torrent (and its files) from the catalog.
    fn remove(&self, info_hash: &str) -> Result<(), CatalogError>;
}

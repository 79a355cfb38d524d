//! Testing utilities: an in-memory catalog and torrent fixtures.
//!
//! [`MemoryCatalog`] orders and pages records with the same keyset rules the
//! SQLite catalog expresses in SQL, so the two can be checked against each
//! other.
//!
//! # Example
//!
//! ```rust,ignore
//! use magneticow_core::testing::{fixtures, MemoryCatalog};
//!
//! let catalog = MemoryCatalog::new();
//! catalog.insert_all(vec![
//!     fixtures::torrent(1, "ubuntu 24.04", 1_700_000_000),
//!     fixtures::torrent(2, "debian 12", 1_700_000_100),
//! ]);
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::catalog::{
    normalize_info_hash, CatalogError, CatalogStats, NewTorrent, TorrentCatalog, TorrentFile,
    TorrentMetadata,
};
use crate::search::{keyset_order, relevance_score, words, OrderingCriterion, TorrentQuery};

#[derive(Default)]
struct Store {
    next_id: i64,
    torrents: Vec<TorrentMetadata>,
    files: HashMap<i64, Vec<TorrentFile>>,
}

/// In-memory implementation of [`TorrentCatalog`].
///
/// Text matching is simple: every query term must appear as a word of the
/// name. Matches are scored with [`relevance_score`], as in the SQLite catalog.
#[derive(Default)]
pub struct MemoryCatalog {
    store: Mutex<Store>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert every torrent, panicking on failure. Returns the assigned ids.
    pub fn insert_all(&self, torrents: Vec<NewTorrent>) -> Vec<i64> {
        torrents
            .iter()
            .map(|t| self.insert(t).expect("fixture torrent should insert"))
            .collect()
    }

    fn store(&self) -> Result<MutexGuard<'_, Store>, CatalogError> {
        self.store
            .lock()
            .map_err(|_| CatalogError::Database("store lock poisoned".to_string()))
    }
}

/// Every query term must appear as a word of the name.
fn text_matches(query: &str, name: &str) -> bool {
    let terms = words(query);
    let name_words = words(name);
    !terms.is_empty() && terms.iter().all(|t| name_words.contains(t))
}

impl TorrentCatalog for MemoryCatalog {
    fn query_torrents(&self, query: &TorrentQuery) -> Result<Vec<TorrentMetadata>, CatalogError> {
        let text_search = query.is_text_search();
        if query.order_by == OrderingCriterion::ByRelevance && !text_search {
            return Err(CatalogError::InvalidQuery(
                "relevance ordering requires a non-empty query".to_string(),
            ));
        }

        let store = self.store()?;
        let mut rows: Vec<TorrentMetadata> = store
            .torrents
            .iter()
            .filter(|t| t.discovered_on <= query.epoch)
            .filter_map(|t| {
                if !text_search {
                    return Some(t.clone());
                }
                text_matches(&query.query, &t.name).then(|| TorrentMetadata {
                    relevance: Some(relevance_score(&query.query, &t.name)),
                    ..t.clone()
                })
            })
            .collect();

        let keyed = |t: &TorrentMetadata| query.order_by.sort_key(t).map(|key| (key, t.id));
        rows.retain(|t| match (query.cursor, keyed(t)) {
            (Some(cursor), Some((key, id))) => cursor.admits(key, id, query.direction),
            (None, _) => true,
            (Some(_), None) => false,
        });
        rows.sort_by(|a, b| match (keyed(a), keyed(b)) {
            (Some(a), Some(b)) => keyset_order(a, b, query.direction),
            _ => a.id.cmp(&b.id),
        });
        rows.truncate(query.page_size as usize);

        Ok(rows)
    }

    fn get_torrent(&self, info_hash: &str) -> Result<TorrentMetadata, CatalogError> {
        let info_hash = normalize_info_hash(info_hash)?;
        self.store()?
            .torrents
            .iter()
            .find(|t| t.info_hash == info_hash)
            .cloned()
            .ok_or(CatalogError::NotFound(info_hash))
    }

    fn get_files(&self, info_hash: &str) -> Result<Vec<TorrentFile>, CatalogError> {
        let torrent = self.get_torrent(info_hash)?;
        Ok(self
            .store()?
            .files
            .get(&torrent.id)
            .cloned()
            .unwrap_or_default())
    }

    fn stats(&self) -> Result<CatalogStats, CatalogError> {
        let store = self.store()?;
        Ok(CatalogStats {
            n_torrents: store.torrents.len() as u64,
            n_files: store.files.values().map(|f| f.len() as u64).sum(),
            total_size: store.torrents.iter().map(|t| t.total_size).sum(),
            oldest_discovered_on: store.torrents.iter().map(|t| t.discovered_on).min(),
            newest_discovered_on: store.torrents.iter().map(|t| t.discovered_on).max(),
        })
    }

    fn insert(&self, torrent: &NewTorrent) -> Result<i64, CatalogError> {
        let info_hash = normalize_info_hash(&torrent.info_hash)?;
        let mut store = self.store()?;
        if store.torrents.iter().any(|t| t.info_hash == info_hash) {
            return Err(CatalogError::Duplicate(info_hash));
        }
        if torrent.discovered_on <= 0 {
            return Err(CatalogError::Database(
                "discovered_on must be positive".to_string(),
            ));
        }

        store.next_id += 1;
        let id = store.next_id;
        store.torrents.push(TorrentMetadata {
            id,
            info_hash,
            name: torrent.name.clone(),
            total_size: torrent.total_size(),
            n_files: torrent.files.len() as u64,
            discovered_on: torrent.discovered_on,
            updated_on: torrent.updated_on,
            n_seeders: torrent.n_seeders,
            n_leechers: torrent.n_leechers,
            relevance: None,
        });
        store.files.insert(id, torrent.files.clone());
        Ok(id)
    }

    fn remove(&self, info_hash: &str) -> Result<(), CatalogError> {
        let info_hash = normalize_info_hash(info_hash)?;
        let mut store = self.store()?;
        let position = store
            .torrents
            .iter()
            .position(|t| t.info_hash == info_hash)
            .ok_or_else(|| CatalogError::NotFound(info_hash.clone()))?;
        let removed = store.torrents.remove(position);
        store.files.remove(&removed.id);
        Ok(())
    }
}

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::NewTorrent;

    /// Deterministic, valid info hash for fixture number `n`.
    pub fn info_hash(n: u64) -> String {
        format!("{:040x}", n)
    }

    /// A torrent with no files, no peers and `updated_on == discovered_on`.
    pub fn torrent(n: u64, name: &str, discovered_on: i64) -> NewTorrent {
        NewTorrent::new(info_hash(n), name, discovered_on)
    }
}

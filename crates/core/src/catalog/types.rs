//! Types for the catalog of discovered torrents.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of a hex-encoded v1 info hash.
pub const INFO_HASH_HEX_LEN: usize = 40;

/// A torrent record as returned by catalog queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TorrentMetadata {
    /// Catalog-assigned identifier. Monotonically increasing, never reused.
    pub id: i64,
    /// Info hash (lowercase hex).
    pub info_hash: String,
    /// Torrent name from the metadata dictionary.
    pub name: String,
    /// Sum of all file sizes in bytes.
    pub total_size: u64,
    /// Number of files.
    pub n_files: u64,
    /// When the torrent was first discovered (unix seconds).
    pub discovered_on: i64,
    /// When the swarm statistics were last refreshed (unix seconds).
    pub updated_on: i64,
    /// Seeders (last known).
    pub n_seeders: u32,
    /// Leechers (last known).
    pub n_leechers: u32,
    /// Relevance score of a text search. Lower is more relevant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f64>,
}

/// A file within a torrent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentFile {
    /// File path within the torrent.
    pub path: String,
    /// File size in bytes.
    pub size: u64,
}

/// A torrent handed to the catalog by the ingestion side.
#[derive(Debug, Clone)]
pub struct NewTorrent {
    pub info_hash: String,
    pub name: String,
    pub discovered_on: i64,
    pub updated_on: i64,
    pub n_seeders: u32,
    pub n_leechers: u32,
    pub files: Vec<TorrentFile>,
}

impl NewTorrent {
    pub fn new(info_hash: impl Into<String>, name: impl Into<String>, discovered_on: i64) -> Self {
        Self {
            info_hash: info_hash.into(),
            name: name.into(),
            discovered_on,
            updated_on: discovered_on,
            n_seeders: 0,
            n_leechers: 0,
            files: Vec::new(),
        }
    }

    pub fn with_file(mut self, path: impl Into<String>, size: u64) -> Self {
        self.files.push(TorrentFile {
            path: path.into(),
            size,
        });
        self
    }

    pub fn with_peers(mut self, n_seeders: u32, n_leechers: u32) -> Self {
        self.n_seeders = n_seeders;
        self.n_leechers = n_leechers;
        self
    }

    pub fn with_updated_on(mut self, updated_on: i64) -> Self {
        self.updated_on = updated_on;
        self
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}

/// Catalog statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    /// Total torrents in the catalog.
    pub n_torrents: u64,
    /// Total files across all torrents.
    pub n_files: u64,
    /// Total size of all torrents (bytes).
    pub total_size: u64,
    /// Earliest discovery time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_discovered_on: Option<i64>,
    /// Latest discovery time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_discovered_on: Option<i64>,
}

/// Errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(String),

    /// The storage engine rejected caller-supplied search input.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid info hash: {0}")]
    InvalidInfoHash(String),

    #[error("Torrent already in catalog: {0}")]
    Duplicate(String),
}

/// Normalize a hex info hash to lowercase, rejecting anything that is not
/// exactly 40 hex digits.
pub fn normalize_info_hash(info_hash: &str) -> Result<String, CatalogError> {
    if info_hash.len() != INFO_HASH_HEX_LEN || !info_hash.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CatalogError::InvalidInfoHash(info_hash.to_string()));
    }
    Ok(info_hash.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_info_hash_lowercases() {
        let hash = "A94A8FE5CCB19BA61C4C0873D391E987982FBBD3";
        assert_eq!(
            normalize_info_hash(hash).unwrap(),
            "a94a8fe5ccb19ba61c4c0873d391e987982fbbd3"
        );
    }

    #[test]
    fn test_normalize_info_hash_rejects_wrong_length() {
        assert!(matches!(
            normalize_info_hash("abc123"),
            Err(CatalogError::InvalidInfoHash(_))
        ));
    }

    #[test]
    fn test_normalize_info_hash_rejects_non_hex() {
        let hash = "z94a8fe5ccb19ba61c4c0873d391e987982fbbd3";
        assert!(matches!(
            normalize_info_hash(hash),
            Err(CatalogError::InvalidInfoHash(_))
        ));
    }

    #[test]
    fn test_new_torrent_total_size() {
        let torrent = NewTorrent::new("a".repeat(40), "Album", 1_600_000_000)
            .with_file("01.flac", 100)
            .with_file("02.flac", 250);
        assert_eq!(torrent.total_size(), 350);
        assert_eq!(torrent.updated_on, 1_600_000_000);
    }

    #[test]
    fn test_torrent_metadata_serialization() {
        let torrent = TorrentMetadata {
            id: 7,
            info_hash: "a".repeat(40),
            name: "ubuntu-22.04-desktop-amd64.iso".to_string(),
            total_size: 3_654_957_056,
            n_files: 1,
            discovered_on: 1_650_000_000,
            updated_on: 1_650_000_000,
            n_seeders: 12,
            n_leechers: 3,
            relevance: None,
        };

        let json = serde_json::to_value(&torrent).unwrap();
        assert_eq!(json["infoHash"], "a".repeat(40));
        assert_eq!(json["totalSize"], 3_654_957_056u64);
        assert_eq!(json["discoveredOn"], 1_650_000_000);
        assert_eq!(json["nSeeders"], 12);
        assert!(json.get("relevance").is_none()); // None should be skipped
    }

    #[test]
    fn test_catalog_stats_serialization() {
        let stats = CatalogStats {
            n_torrents: 0,
            n_files: 0,
            total_size: 0,
            oldest_discovered_on: None,
            newest_discovered_on: None,
        };

        let json = serde_json::to_string(&stats).unwrap();
        assert!(!json.contains("oldestDiscoveredOn"));
        assert!(json.contains("nTorrents"));
    }
}

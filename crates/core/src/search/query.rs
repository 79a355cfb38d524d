use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use super::cursor::{Cursor, Direction};
use super::error::SearchError;
use super::ordering::OrderingCriterion;
use crate::catalog::{TorrentCatalog, TorrentMetadata};
use crate::metrics::{CATALOG_QUERY_DURATION, CATALOG_QUERY_ERRORS};

/// Everything the catalog needs to fetch one page.
#[derive(Debug, Clone, PartialEq)]
pub struct TorrentQuery {
    pub query: String,
    pub epoch: i64,
    pub order_by: OrderingCriterion,
    pub direction: Direction,
    pub cursor: Option<Cursor>,
    pub page_size: u32,
}

impl TorrentQuery {
    pub fn is_text_search(&self) -> bool {
        !self.query.is_empty()
    }
}

/// One page of results together with the cursor that resumes after it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TorrentPage {
    pub torrents: Vec<TorrentMetadata>,
    /// `None` once the walk has reached the end.
    pub next_cursor: Option<Cursor>,
}

impl TorrentPage {
    pub fn new(torrents: Vec<TorrentMetadata>, order_by: OrderingCriterion) -> Self {
        let next_cursor = torrents
            .last()
            .and_then(|last| order_by.sort_key(last).map(|key| Cursor::new(key, last.id)));
        Self {
            torrents,
            next_cursor,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.torrents.is_empty()
    }
}

/// Run a validated query against the catalog.
pub fn search(
    catalog: &dyn TorrentCatalog,
    query: &TorrentQuery,
) -> Result<TorrentPage, SearchError> {
    let started = Instant::now();
    let result = catalog.query_torrents(query);
    CATALOG_QUERY_DURATION
        .with_label_values(&[query.order_by.label()])
        .observe(started.elapsed().as_secs_f64());

    let torrents = result.map_err(|e| {
        CATALOG_QUERY_ERRORS
            .with_label_values(&[query.order_by.label()])
            .inc();
        SearchError::from(e)
    })?;

    debug!(
        order_by = query.order_by.label(),
        ascending = query.direction.is_ascending(),
        resumed = query.cursor.is_some(),
        rows = torrents.len(),
        "Catalog query completed"
    );

    Ok(TorrentPage::new(torrents, query.order_by))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogError;
    use crate::search::OrderedValue;
    use crate::testing::{fixtures, MemoryCatalog};

    fn browse(page_size: u32) -> TorrentQuery {
        TorrentQuery {
            query: String::new(),
            epoch: i64::MAX,
            order_by: OrderingCriterion::ByDiscoveredOn,
            direction: Direction::Ascending,
            cursor: None,
            page_size,
        }
    }

    #[test]
    fn test_empty_page_has_no_cursor() {
        let page = TorrentPage::new(Vec::new(), OrderingCriterion::ByDiscoveredOn);
        assert!(page.is_empty());
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_cursor_points_at_last_record() {
        let catalog = MemoryCatalog::new();
        catalog.insert_all(vec![
            fixtures::torrent(1, "first", 100),
            fixtures::torrent(2, "second", 200),
            fixtures::torrent(3, "third", 300),
        ]);

        let page = search(&catalog, &browse(2)).unwrap();
        assert_eq!(page.torrents.len(), 2);
        let cursor = page.next_cursor.unwrap();
        assert_eq!(cursor.last_ordered_value, OrderedValue::from(200i64));
        assert_eq!(cursor.last_id, page.torrents[1].id);
    }

    #[test]
    fn test_catalog_failure_is_query_execution() {
        struct FailingCatalog;

        impl TorrentCatalog for FailingCatalog {
            fn query_torrents(
                &self,
                _query: &TorrentQuery,
            ) -> Result<Vec<TorrentMetadata>, CatalogError> {
                Err(CatalogError::InvalidQuery("fts5: syntax error near \"\"\"".into()))
            }

            fn get_torrent(&self, info_hash: &str) -> Result<TorrentMetadata, CatalogError> {
                Err(CatalogError::NotFound(info_hash.to_string()))
            }

            fn get_files(
                &self,
                info_hash: &str,
            ) -> Result<Vec<crate::catalog::TorrentFile>, CatalogError> {
                Err(CatalogError::NotFound(info_hash.to_string()))
            }

            fn stats(&self) -> Result<crate::catalog::CatalogStats, CatalogError> {
                Err(CatalogError::Database("unavailable".into()))
            }

            fn insert(&self, _torrent: &crate::catalog::NewTorrent) -> Result<i64, CatalogError> {
                Err(CatalogError::Database("read-only".into()))
            }

            fn remove(&self, info_hash: &str) -> Result<(), CatalogError> {
                Err(CatalogError::NotFound(info_hash.to_string()))
            }
        }

        let err = search(&FailingCatalog, &browse(10)).unwrap_err();
        assert!(matches!(err, SearchError::QueryExecution(_)));
    }
}

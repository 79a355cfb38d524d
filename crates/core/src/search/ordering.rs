//! Ordering criteria and the rules for picking one.

use serde::{Deserialize, Serialize};

use super::cursor::OrderedValue;
use super::error::SearchError;
use crate::catalog::TorrentMetadata;

/// Field a result walk is sorted by. Ties are always broken by record id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderingCriterion {
    ByRelevance,
    ByTotalSize,
    ByDiscoveredOn,
    ByNFiles,
    ByUpdatedOn,
    ByNSeeders,
    ByNLeechers,
}

/// Names accepted in the `orderBy` parameter.
///
/// Relevance has no name: it is only ever chosen implicitly for text searches.
const ORDER_BY_NAMES: [(&str, OrderingCriterion); 6] = [
    ("TOTAL_SIZE", OrderingCriterion::ByTotalSize),
    ("DISCOVERED_ON", OrderingCriterion::ByDiscoveredOn),
    ("N_FILES", OrderingCriterion::ByNFiles),
    ("UPDATED_ON", OrderingCriterion::ByUpdatedOn),
    ("N_SEEDERS", OrderingCriterion::ByNSeeders),
    ("N_LEECHERS", OrderingCriterion::ByNLeechers),
];

impl OrderingCriterion {
    /// Look up an `orderBy` name. Matching is exact; nothing is coerced.
    pub fn from_name(name: &str) -> Result<Self, SearchError> {
        ORDER_BY_NAMES
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, criterion)| *criterion)
            .ok_or_else(|| SearchError::UnknownOrderingCriterion(name.to_string()))
    }

    /// The `orderBy` name of this criterion, if it can be requested explicitly.
    pub fn name(self) -> Option<&'static str> {
        ORDER_BY_NAMES
            .iter()
            .find(|(_, criterion)| *criterion == self)
            .map(|(name, _)| *name)
    }

    /// Label used in logs and metrics.
    pub fn label(self) -> &'static str {
        self.name().unwrap_or("RELEVANCE")
    }

    /// Primary key of `torrent` under this criterion.
    ///
    /// `None` only for relevance on a record that did not come from a text search.
    pub fn sort_key(self, torrent: &TorrentMetadata) -> Option<OrderedValue> {
        match self {
            OrderingCriterion::ByRelevance => torrent.relevance.and_then(OrderedValue::new),
            OrderingCriterion::ByTotalSize => Some(torrent.total_size.into()),
            OrderingCriterion::ByDiscoveredOn => Some(torrent.discovered_on.into()),
            OrderingCriterion::ByNFiles => Some(torrent.n_files.into()),
            OrderingCriterion::ByUpdatedOn => Some(torrent.updated_on.into()),
            OrderingCriterion::ByNSeeders => Some(torrent.n_seeders.into()),
            OrderingCriterion::ByNLeechers => Some(torrent.n_leechers.into()),
        }
    }
}

/// Resolve the criterion for a request.
///
/// An explicit name always wins. Without one, browsing (empty query) walks the
/// catalog chronologically and a text search is ranked by relevance.
pub fn resolve_ordering(
    order_by: Option<&str>,
    query: &str,
) -> Result<OrderingCriterion, SearchError> {
    match order_by {
        Some(name) => OrderingCriterion::from_name(name),
        None if query.is_empty() => Ok(OrderingCriterion::ByDiscoveredOn),
        None => Ok(OrderingCriterion::ByRelevance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn torrent() -> TorrentMetadata {
        TorrentMetadata {
            id: 1,
            info_hash: "b".repeat(40),
            name: "debian-12.5.0-amd64-netinst.iso".to_string(),
            total_size: 659_554_304,
            n_files: 1,
            discovered_on: 1_700_000_000,
            updated_on: 1_700_000_500,
            n_seeders: 40,
            n_leechers: 4,
            relevance: None,
        }
    }

    #[test]
    fn test_default_without_query_is_discovered_on() {
        assert_eq!(
            resolve_ordering(None, "").unwrap(),
            OrderingCriterion::ByDiscoveredOn
        );
    }

    #[test]
    fn test_default_with_query_is_relevance() {
        assert_eq!(
            resolve_ordering(None, "x").unwrap(),
            OrderingCriterion::ByRelevance
        );
    }

    #[test]
    fn test_explicit_name_ignores_query() {
        for query in ["", "ubuntu"] {
            assert_eq!(
                resolve_ordering(Some("N_SEEDERS"), query).unwrap(),
                OrderingCriterion::ByNSeeders
            );
        }
    }

    #[test]
    fn test_every_name_round_trips() {
        for (name, criterion) in ORDER_BY_NAMES {
            assert_eq!(OrderingCriterion::from_name(name).unwrap(), criterion);
            assert_eq!(criterion.name(), Some(name));
        }
    }

    #[test]
    fn test_unknown_name_rejected() {
        let err = resolve_ordering(Some("BOGUS"), "").unwrap_err();
        assert!(matches!(err, SearchError::UnknownOrderingCriterion(ref n) if n == "BOGUS"));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        assert!(OrderingCriterion::from_name("total_size").is_err());
        assert!(OrderingCriterion::from_name(" TOTAL_SIZE").is_err());
    }

    #[test]
    fn test_relevance_cannot_be_requested_by_name() {
        assert!(OrderingCriterion::from_name("RELEVANCE").is_err());
        assert_eq!(OrderingCriterion::ByRelevance.name(), None);
        assert_eq!(OrderingCriterion::ByRelevance.label(), "RELEVANCE");
    }

    #[test]
    fn test_sort_key_reads_matching_field() {
        let t = torrent();
        assert_eq!(
            OrderingCriterion::ByTotalSize.sort_key(&t).unwrap().get(),
            659_554_304.0
        );
        assert_eq!(
            OrderingCriterion::ByUpdatedOn.sort_key(&t).unwrap().get(),
            1_700_000_500.0
        );
        assert_eq!(OrderingCriterion::ByNLeechers.sort_key(&t).unwrap().get(), 4.0);
        assert!(OrderingCriterion::ByRelevance.sort_key(&t).is_none());
    }

    #[test]
    fn test_sort_key_relevance() {
        let t = TorrentMetadata {
            relevance: Some(-2.5),
            ..torrent()
        };
        assert_eq!(OrderingCriterion::ByRelevance.sort_key(&t).unwrap().get(), -2.5);
    }
}

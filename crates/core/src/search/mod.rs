//! The search contract: parameter validation, ordering resolution and the
//! keyset pagination cursor.
//!
//! Everything here is pure request-scoped computation. The only I/O happens
//! behind [`TorrentCatalog`](crate::catalog::TorrentCatalog) in [`search`].

mod cursor;
mod error;
mod ordering;
pub mod params;
mod query;
mod relevance;

pub use cursor::{
    keyset_order, Cursor, Direction, OrderedValue, SQL_LAST_ID_PARAM, SQL_LAST_VALUE_PARAM,
};
pub use error::SearchError;
pub use ordering::{resolve_ordering, OrderingCriterion};
pub use params::{RawSearchParams, SearchRequest};
pub use query::{search, TorrentPage, TorrentQuery};
pub use relevance::relevance_score;
pub(crate) use relevance::words;

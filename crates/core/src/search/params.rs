//! Raw query parameters and their validation into a [`SearchRequest`].

use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::cursor::{Cursor, Direction, OrderedValue};
use super::error::SearchError;
use super::ordering::{resolve_ordering, OrderingCriterion};
use super::query::TorrentQuery;

pub const QUERY: &str = "query";
pub const EPOCH: &str = "epoch";
pub const LAST_ORDERED_VALUE: &str = "lastOrderedValue";
pub const LAST_ID: &str = "lastID";
pub const ASCENDING: &str = "ascending";
pub const ORDER_BY: &str = "orderBy";

/// Query parameters exactly as the client sent them.
///
/// Empty values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSearchParams {
    pub query: Option<String>,
    pub epoch: Option<String>,
    pub last_ordered_value: Option<String>,
    pub last_id: Option<String>,
    pub ascending: Option<String>,
    pub order_by: Option<String>,
    /// Keys that cannot be accepted (unknown or repeated), with the reason.
    pub rejected: Vec<(String, String)>,
}

impl RawSearchParams {
    /// Collect parameters from decoded `key=value` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut raw = Self::default();

        for (key, value) in pairs {
            let key = key.into();
            let value = value.into();

            let slot = match key.as_str() {
                QUERY => &mut raw.query,
                EPOCH => &mut raw.epoch,
                LAST_ORDERED_VALUE => &mut raw.last_ordered_value,
                LAST_ID => &mut raw.last_id,
                ASCENDING => &mut raw.ascending,
                ORDER_BY => &mut raw.order_by,
                _ => {
                    raw.rejected.push((key, "unknown parameter".to_string()));
                    continue;
                }
            };

            if value.is_empty() {
                continue;
            }
            if slot.is_some() {
                raw.rejected
                    .push((key, "parameter supplied more than once".to_string()));
                continue;
            }
            *slot = Some(value);
        }

        raw
    }
}

/// A validated, fully defaulted search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Free-text filter; empty means browse.
    pub query: String,
    /// Snapshot time (unix seconds). Records discovered later are invisible.
    pub epoch: i64,
    pub ascending: bool,
    pub order_by: OrderingCriterion,
    /// Resume point; `None` starts from the beginning of the ordering.
    pub cursor: Option<Cursor>,
}

impl SearchRequest {
    /// Validate against the current wall-clock time.
    pub fn from_params(raw: &RawSearchParams) -> Result<Self, SearchError> {
        Self::from_params_at(raw, Utc::now())
    }

    /// Validate, defaulting a missing epoch to `now`.
    pub fn from_params_at(raw: &RawSearchParams, now: DateTime<Utc>) -> Result<Self, SearchError> {
        if raw.last_ordered_value.is_some() != raw.last_id.is_some() {
            return Err(SearchError::IncompleteCursor);
        }

        if let Some((key, reason)) = raw.rejected.first() {
            return Err(SearchError::malformed(key, reason));
        }
        let epoch = decode(EPOCH, raw.epoch.as_deref(), parse_integer)?;
        let last_ordered_value = decode(
            LAST_ORDERED_VALUE,
            raw.last_ordered_value.as_deref(),
            OrderedValue::parse,
        )?;
        let last_id = decode(LAST_ID, raw.last_id.as_deref(), parse_integer)?;
        let ascending = decode(ASCENDING, raw.ascending.as_deref(), parse_bool)?;

        let query = raw.query.clone().unwrap_or_default();

        let epoch = match epoch {
            None => now.timestamp(),
            Some(epoch) if epoch <= 0 => return Err(SearchError::InvalidEpoch),
            Some(epoch) => epoch,
        };

        if matches!(last_id, Some(id) if id < 0) {
            return Err(SearchError::InvalidCursor);
        }

        let ascending = ascending.unwrap_or(true);

        let order_by = resolve_ordering(raw.order_by.as_deref(), &query)?;

        let cursor = match (last_ordered_value, last_id) {
            (Some(value), Some(id)) => Some(Cursor::new(value, id)),
            _ => None,
        };

        Ok(Self {
            query,
            epoch,
            ascending,
            order_by,
            cursor,
        })
    }

    pub fn direction(&self) -> Direction {
        Direction::from_ascending(self.ascending)
    }

    /// Assemble the input for the catalog.
    pub fn into_query(self, page_size: u32) -> TorrentQuery {
        TorrentQuery {
            direction: self.direction(),
            query: self.query,
            epoch: self.epoch,
            order_by: self.order_by,
            cursor: self.cursor,
            page_size,
        }
    }
}

fn decode<T>(
    field: &str,
    raw: Option<&str>,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<Option<T>, SearchError> {
    raw.map(|value| parse(value).map_err(|detail| SearchError::malformed(field, detail)))
        .transpose()
}

fn parse_integer(raw: &str) -> Result<i64, String> {
    i64::from_str(raw).map_err(|e| format!("{:?} is not an integer: {}", raw, e))
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(format!("{:?} is not a boolean", raw)),
    }
}

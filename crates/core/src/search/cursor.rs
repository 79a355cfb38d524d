//! Keyset pagination cursor.
//!
//! Every ordering is treated as the pair `(primary key, id)`. The id is unique
//! and never reused, so the pair is a total order even when many records share
//! a primary key (same-second discovery times, equal relevance scores). A page
//! resumed from cursor `(v, i)` contains only records strictly after `(v, i)`
//! in the active direction. The predicate is structural: the record the cursor
//! was built from does not have to exist any more.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Sort direction of a result walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            Direction::Ascending
        } else {
            Direction::Descending
        }
    }

    pub fn is_ascending(self) -> bool {
        self == Direction::Ascending
    }

    pub fn sql_keyword(self) -> &'static str {
        match self {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        }
    }

    /// Operator selecting rows that come after a boundary.
    fn sql_after_operator(self) -> &'static str {
        match self {
            Direction::Ascending => ">",
            Direction::Descending => "<",
        }
    }

    /// Apply the direction to an ascending comparison.
    fn orient(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

/// The primary-key value of a record under some ordering criterion.
///
/// Always finite, so it has a total order. Integer keys are exact only within
/// `-2^53..=2^53`; the `From<i64>` and `From<u64>` conversions round beyond it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct OrderedValue(f64);

impl OrderedValue {
    pub fn new(value: f64) -> Option<Self> {
        value.is_finite().then_some(Self(value))
    }

    pub fn get(self) -> f64 {
        self.0
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        let value: f64 = raw.parse().map_err(|e| format!("{}", e))?;
        Self::new(value).ok_or_else(|| format!("{} is not a finite number", raw))
    }

    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<i64> for OrderedValue {
    fn from(value: i64) -> Self {
        Self(value as f64)
    }
}

impl From<u64> for OrderedValue {
    fn from(value: u64) -> Self {
        Self(value as f64)
    }
}

impl From<u32> for OrderedValue {
    fn from(value: u32) -> Self {
        Self(f64::from(value))
    }
}

impl TryFrom<f64> for OrderedValue {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("{} is not a finite number", value))
    }
}

impl From<OrderedValue> for f64 {
    fn from(value: OrderedValue) -> Self {
        value.0
    }
}

impl fmt::Display for OrderedValue {
    // Shortest representation that parses back to the same f64.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Compare two `(primary key, id)` pairs under a direction.
pub fn keyset_order(
    a: (OrderedValue, i64),
    b: (OrderedValue, i64),
    direction: Direction,
) -> Ordering {
    let ascending = a.0.total_cmp(&b.0).then(a.1.cmp(&b.1));
    direction.orient(ascending)
}

/// Resume point of a pagination walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    pub last_ordered_value: OrderedValue,
    #[serde(rename = "lastID")]
    pub last_id: i64,
}

/// Named SQL parameter carrying [`Cursor::last_ordered_value`].
pub const SQL_LAST_VALUE_PARAM: &str = ":last_ordered_value";
/// Named SQL parameter carrying [`Cursor::last_id`].
pub const SQL_LAST_ID_PARAM: &str = ":last_id";

impl Cursor {
    pub fn new(last_ordered_value: OrderedValue, last_id: i64) -> Self {
        Self {
            last_ordered_value,
            last_id,
        }
    }

    /// Whether a record with primary key `key` and identifier `id` lies
    /// strictly after this cursor.
    pub fn admits(&self, key: OrderedValue, id: i64, direction: Direction) -> bool {
        keyset_order((key, id), (self.last_ordered_value, self.last_id), direction)
            == Ordering::Greater
    }

    /// SQL form of [`Cursor::admits`] for a primary-key expression `column`
    /// and an id column `id_column`, bound through [`SQL_LAST_VALUE_PARAM`]
    /// and [`SQL_LAST_ID_PARAM`].
    pub fn sql_predicate(column: &str, id_column: &str, direction: Direction) -> String {
        let op = direction.sql_after_operator();
        format!(
            "({column} {op} {value} OR ({column} = {value} AND {id_column} {op} {id}))",
            value = SQL_LAST_VALUE_PARAM,
            id = SQL_LAST_ID_PARAM,
        )
    }
}

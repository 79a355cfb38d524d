//! Errors produced while turning raw parameters into a page of results.

use thiserror::Error;

use crate::catalog::CatalogError;

/// Every way a search request can fail.
///
/// Validation variants are terminal for the request. Only [`SearchError::Encoding`]
/// is a server-side fault.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("`lastOrderedValue`, `lastID` must be supplied altogether, if supplied")]
    IncompleteCursor,

    #[error("invalid value for `{field}`: {detail}")]
    MalformedParameter { field: String, detail: String },

    #[error("epoch must be greater than 0")]
    InvalidEpoch,

    #[error("lastID has to be greater than or equal to zero")]
    InvalidCursor,

    #[error("unknown orderBy string: {0}")]
    UnknownOrderingCriterion(String),

    #[error("query error: {0}")]
    QueryExecution(String),

    #[error("encoding error: {0}")]
    Encoding(String),
}

impl SearchError {
    pub fn malformed(field: impl Into<String>, detail: impl Into<String>) -> Self {
        SearchError::MalformedParameter {
            field: field.into(),
            detail: detail.into(),
        }
    }

    /// Stable identifier used in error bodies and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::IncompleteCursor => "incomplete_cursor",
            SearchError::MalformedParameter { .. } => "malformed_parameter",
            SearchError::InvalidEpoch => "invalid_epoch",
            SearchError::InvalidCursor => "invalid_cursor",
            SearchError::UnknownOrderingCriterion(_) => "unknown_ordering_criterion",
            SearchError::QueryExecution(_) => "query_execution",
            SearchError::Encoding(_) => "encoding",
        }
    }

    /// The request parameter the caller has to fix, when there is one.
    pub fn field(&self) -> Option<&str> {
        match self {
            SearchError::IncompleteCursor => None,
            SearchError::MalformedParameter { field, .. } => Some(field),
            SearchError::InvalidEpoch => Some("epoch"),
            SearchError::InvalidCursor => Some("lastID"),
            SearchError::UnknownOrderingCriterion(_) => Some("orderBy"),
            SearchError::QueryExecution(_) => Some("query"),
            SearchError::Encoding(_) => None,
        }
    }

    pub fn is_client_error(&self) -> bool {
        !matches!(self, SearchError::Encoding(_))
    }
}

impl From<CatalogError> for SearchError {
    fn from(err: CatalogError) -> Self {
        SearchError::QueryExecution(err.to_string())
    }
}

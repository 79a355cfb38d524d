//! Error responses shared by the API handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use magneticow_core::{CatalogError, SearchError};
use serde::Serialize;
use tracing::{error, warn};

use crate::metrics::SEARCH_REJECTIONS_TOTAL;

const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// A failed request: status code plus the JSON body sent to the caller.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorResponse {
                error: INTERNAL_ERROR_MESSAGE.to_string(),
                kind: "internal",
                field: None,
            },
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        SEARCH_REJECTIONS_TOTAL.with_label_values(&[err.kind()]).inc();

        if !err.is_client_error() {
            error!(kind = err.kind(), "Search failed: {}", err);
            let mut internal = Self::internal();
            internal.body.kind = err.kind();
            return internal;
        }

        warn!(kind = err.kind(), field = err.field(), "Rejected search: {}", err);
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorResponse {
                error: err.to_string(),
                kind: err.kind(),
                field: err.field().map(str::to_string),
            },
        }
    }
}

/// Status mapping for the lookup and statistics routes.
impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(hash) => Self {
                status: StatusCode::NOT_FOUND,
                body: ErrorResponse {
                    error: format!("Torrent not found: {}", hash),
                    kind: "not_found",
                    field: None,
                },
            },
            CatalogError::InvalidInfoHash(hash) => Self {
                status: StatusCode::BAD_REQUEST,
                body: ErrorResponse {
                    error: format!("infohash must be 40 hexadecimal digits, got {:?}", hash),
                    kind: "invalid_info_hash",
                    field: Some("infohash".to_string()),
                },
            },
            other => {
                error!("Catalog failure: {}", other);
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

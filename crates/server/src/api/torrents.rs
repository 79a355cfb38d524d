//! Torrent search and lookup handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use magneticow_core::{
    search, RawSearchParams, SearchError, SearchRequest, TorrentFile, TorrentMetadata,
};
use tracing::debug;

use super::error::ApiError;
use crate::metrics::SEARCH_PAGE_ROWS;
use crate::state::AppState;

/// Response header carrying the primary key of the last record on the page.
pub const LAST_ORDERED_VALUE_HEADER: HeaderName = HeaderName::from_static("x-last-ordered-value");
/// Response header carrying the id of the last record on the page.
pub const LAST_ID_HEADER: HeaderName = HeaderName::from_static("x-last-id");

/// GET /api/v0.1/torrents
///
/// One page of the catalog, filtered by `query` and `epoch` and ordered by
/// `orderBy`/`ascending`. The body is a JSON array of records. When the page
/// is non-empty the cursor for the next page is returned in the
/// `X-Last-Ordered-Value` and `X-Last-ID` headers.
pub async fn search_torrents(
    State(state): State<Arc<AppState>>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(pairs) =
        params.map_err(|e| SearchError::malformed("query string", e.body_text()))?;

    let raw = RawSearchParams::from_pairs(pairs);
    let request = SearchRequest::from_params(&raw)?;
    let query = request.into_query(state.page_size());

    let page = search(state.catalog(), &query)?;

    SEARCH_PAGE_ROWS
        .with_label_values(&[query.order_by.label()])
        .observe(page.torrents.len() as f64);

    let body = serde_json::to_vec_pretty(&page.torrents)
        .map_err(|e| SearchError::Encoding(e.to_string()))?;

    let mut response = (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response();

    if let Some(cursor) = page.next_cursor {
        let value = HeaderValue::from_str(&cursor.last_ordered_value.to_string())
            .map_err(|e| SearchError::Encoding(e.to_string()))?;
        let headers = response.headers_mut();
        headers.insert(LAST_ORDERED_VALUE_HEADER, value);
        headers.insert(LAST_ID_HEADER, HeaderValue::from(cursor.last_id));
    }

    debug!(
        order_by = query.order_by.label(),
        ascending = query.direction.is_ascending(),
        rows = page.torrents.len(),
        "Served search page"
    );

    Ok(response)
}

/// GET /api/v0.1/torrents/{infohash}
pub async fn get_torrent(
    State(state): State<Arc<AppState>>,
    Path(infohash): Path<String>,
) -> Result<Json<TorrentMetadata>, ApiError> {
    let torrent = state.catalog().get_torrent(&infohash)?;
    Ok(Json(torrent))
}

/// GET /api/v0.1/torrents/{infohash}/files
pub async fn get_files(
    State(state): State<Arc<AppState>>,
    Path(infohash): Path<String>,
) -> Result<Json<Vec<TorrentFile>>, ApiError> {
    let files = state.catalog().get_files(&infohash)?;
    Ok(Json(files))
}

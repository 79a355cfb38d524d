//! Catalog statistics handler.

use std::sync::Arc;

use axum::{extract::State, Json};
use magneticow_core::CatalogStats;

use super::error::ApiError;
use crate::state::AppState;

/// GET /api/v0.1/statistics
///
/// Aggregate counts over the whole catalog.
pub async fn get_statistics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CatalogStats>, ApiError> {
    let stats = state.catalog().stats()?;
    Ok(Json(stats))
}

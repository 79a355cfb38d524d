use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{handlers, statistics, torrents};
use super::middleware::metrics_middleware;
use crate::state::AppState;

/// Prefix every API route is nested under.
pub const API_PREFIX: &str = "/api/v0.1";

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health
        .route("/health", get(handlers::health))
        // Search
        .route("/torrents", get(torrents::search_torrents))
        .route("/torrents/{infohash}", get(torrents::get_torrent))
        .route("/torrents/{infohash}/files", get(torrents::get_files))
        // Catalog statistics
        .route("/statistics", get(statistics::get_statistics));

    Router::new()
        .nest(API_PREFIX, api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

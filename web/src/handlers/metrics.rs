//! Prometheus scrape endpoint.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode};

/// `GET /metrics` in Prometheus text format; 404 when metrics are disabled.
#[allow(clippy::unused_async)]
pub async fn render(State(state): State<AppState>) -> (StatusCode, String) {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled".to_string()),
    }
}

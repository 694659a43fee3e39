//! Refresh Routes
//!
//! - POST /api/v1/refresh - Run a refresh cycle now

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::RefreshResponse;
use crate::api::state::AppState;

/// POST /api/v1/refresh
///
/// Waits for any cycle already in flight, then runs a fresh one. A failed
/// fetch is reported in the body; the request itself still succeeds.
pub async fn trigger_refresh(State(state): State<Arc<AppState>>) -> Json<RefreshResponse> {
    tracing::info!("Manual refresh requested");

    let outcome = state.dashboard.refresh().await;

    Json(RefreshResponse {
        outcome,
        report: state.dashboard.last_cycle(),
    })
}

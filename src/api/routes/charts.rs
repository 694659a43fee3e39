//! Chart Routes
//!
//! - GET /api/v1/charts - Current scatter and histogram specs

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::state::AppState;
use crate::charts::ChartPair;

/// GET /api/v1/charts
pub async fn get_charts(State(state): State<Arc<AppState>>) -> Json<ChartPair> {
    Json(state.dashboard.charts())
}

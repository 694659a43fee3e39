//! Diagnostic Routes
//!
//! - GET /test-connection - Fetch a small sample to prove the source is reachable

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::ConnectionStatusResponse;
use crate::api::state::AppState;

/// GET /test-connection
///
/// 200 when the source answered, even with an empty collection.
/// 500 with the error message when it could not be reached.
pub async fn test_connection(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ConnectionStatusResponse>) {
    let source = state.dashboard.source();
    let name = source.name().to_string();

    match source.sample(state.sample_size).await {
        Ok(sample) => {
            let message = if sample.is_empty() {
                "Connected to the database, but no data found in the collection.".to_string()
            } else {
                format!("Connected to the database. Sample size: {}", sample.len())
            };
            tracing::debug!(source = %name, documents = sample.len(), "Connection check passed");

            (
                StatusCode::OK,
                Json(ConnectionStatusResponse {
                    status: "connected".to_string(),
                    message,
                    source: name,
                    sample,
                }),
            )
        }
        Err(e) => {
            tracing::error!(source = %name, error = %e, "Connection check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ConnectionStatusResponse {
                    status: "error".to_string(),
                    message: format!("Error connecting to the database: {}", e),
                    source: name,
                    sample: Vec::new(),
                }),
            )
        }
    }
}

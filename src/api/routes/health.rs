//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (a refresh cycle has succeeded)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;
use crate::pipeline::CycleReport;

/// GET /health/live
///
/// Kubernetes liveness probe.
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Kubernetes readiness probe.
/// Returns 200 once the last refresh cycle loaded data (or found the
/// collection empty), 503 before the first cycle or after a failed one.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    match cycle_health(state.dashboard.last_cycle().as_ref()) {
        "healthy" => StatusCode::OK,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// GET /health
///
/// Full health status with pipeline details.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let last_cycle = state.dashboard.last_cycle();

    Json(HealthResponse {
        status: cycle_health(last_cycle.as_ref()).to_string(),
        phase: state.dashboard.phase(),
        last_cycle,
        ws_connections: state.ws_connection_count().await,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn cycle_health(last_cycle: Option<&CycleReport>) -> &'static str {
    match last_cycle {
        None => "starting",
        Some(report) if report.outcome.is_failed() => "degraded",
        Some(_) => "healthy",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::CycleOutcome;
    use chrono::Utc;

    #[tokio::test]
    async fn test_liveness() {
        let status = liveness().await;
        assert_eq!(status, StatusCode::OK);
    }

    #[test]
    fn test_cycle_health() {
        let report = |outcome| CycleReport {
            cycle: 1,
            outcome,
            completed_at: Utc::now(),
            duration_ms: 3,
        };

        assert_eq!(cycle_health(None), "starting");
        assert_eq!(cycle_health(Some(&report(CycleOutcome::Empty))), "healthy");
        assert_eq!(
            cycle_health(Some(&report(CycleOutcome::Failed {
                error: "down".into()
            }))),
            "degraded"
        );
    }
}

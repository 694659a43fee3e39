//! Filmboard REST API
//!
//! HTTP API layer for the dashboard, built with Axum.
//!
//! # Endpoints
//!
//! ## Diagnostics
//! - `GET /test-connection` - Fetch a sample document from the source
//!
//! ## Table
//! - `GET /api/v1/table` - Current table or placeholder
//! - `PATCH /api/v1/table/cells` - Edit one cell in place
//! - `GET /api/v1/table/export` - Download the table (csv, json)
//!
//! ## Charts
//! - `GET /api/v1/charts` - Current scatter and histogram specs
//!
//! ## Refresh
//! - `POST /api/v1/refresh` - Run a refresh cycle now
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! ## WebSocket
//! - `GET /ws` - Real-time table and chart updates
//!
//! # Example
//!
//! ```rust,ignore
//! use filmboard::api::{serve, AppState};
//! use filmboard::config::ApiConfig;
//! use filmboard::pipeline::Dashboard;
//! use filmboard::source::StaticSource;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = Arc::new(StaticSource::new(filmboard::source::demo_records()));
//!     let dashboard = Arc::new(Dashboard::new(source, Default::default(), Default::default()));
//!     dashboard.refresh().await;
//!
//!     serve(AppState::new(dashboard, ApiConfig::default())).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    http::HeaderValue,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ApiConfig;
use crate::websocket::{spawn_bridge, websocket_handler};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    let api_routes = Router::new()
        .route("/table", get(routes::table::get_table))
        .route("/table/cells", patch(routes::table::edit_cell))
        .route("/table/export", get(routes::table::export_table))
        .route("/charts", get(routes::charts::get_charts))
        .route("/refresh", post(routes::refresh::trigger_refresh));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .route("/test-connection", get(routes::diagnostics::test_connection))
        .route("/ws", get(websocket_handler))
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Permissive unless explicit origins are configured
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the API server and the WebSocket bridge
pub async fn serve(state: AppState) -> Result<(), ApiError> {
    let addr = state.config.addr();
    let bridge = spawn_bridge(&state.dashboard, Arc::clone(&state.ws_hub));
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Filmboard API listening on {}", addr);

    let result = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)));

    bridge.abort();
    result?;

    tracing::info!("Filmboard API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Dashboard;
    use crate::source::{demo_records, StaticSource};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    async fn create_test_app(source: StaticSource, refresh: bool) -> Router {
        let dashboard = Arc::new(Dashboard::new(
            Arc::new(source),
            Default::default(),
            Default::default(),
        ));
        if refresh {
            dashboard.refresh().await;
        }

        build_router(AppState::new(dashboard, ApiConfig::default()))
    }

    async fn loaded_app() -> Router {
        create_test_app(StaticSource::new(demo_records()), true).await
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn patch_cell(body: &str) -> Request<Body> {
        Request::builder()
            .method("PATCH")
            .uri("/api/v1/table/cells")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let app = loaded_app().await;
        let response = app.oneshot(get("/health/live")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready_tracks_cycles() {
        let app = create_test_app(StaticSource::new(demo_records()), false).await;
        let response = app.oneshot(get("/health/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let app = loaded_app().await;
        let response = app.oneshot(get("/health/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let app = loaded_app().await;
        let response = app.oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["phase"], "idle");
        assert_eq!(body["last_cycle"]["outcome"]["status"], "loaded");
    }

    #[tokio::test]
    async fn test_connection_with_data() {
        let app = loaded_app().await;
        let response = app.oneshot(get("/test-connection")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "connected");
        assert_eq!(body["sample"].as_array().unwrap().len(), 1);
        assert_eq!(body["sample"][0]["Title"], "Frozen II");
    }

    #[tokio::test]
    async fn test_connection_empty_collection() {
        let app = create_test_app(StaticSource::empty(), false).await;
        let response = app.oneshot(get("/test-connection")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(body["message"].as_str().unwrap().contains("no data found"));
    }

    #[tokio::test]
    async fn test_connection_failure() {
        let app = create_test_app(StaticSource::new(demo_records()).failing(10), false).await;
        let response = app.oneshot(get("/test-connection")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_get_table() {
        let app = loaded_app().await;
        let response = app.oneshot(get("/api/v1/table")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["state"], "ready");
        assert_eq!(body["table"]["rows"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_get_charts() {
        let app = loaded_app().await;
        let response = app.oneshot(get("/api/v1/charts")).await.unwrap();

        let body = json_body(response).await;
        assert_eq!(body["scatter"]["spec"]["x_field"], "Title");
        assert_eq!(body["histogram"]["spec"]["x_field"], "Year");
    }

    #[tokio::test]
    async fn test_edit_cell() {
        let app = loaded_app().await;
        let response = app
            .oneshot(patch_cell(
                r#"{"row": 0, "column": "Worldwide gross", "value": 1}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["charts"]["scatter"]["spec"]["points"][0]["y"], 1);
    }

    #[tokio::test]
    async fn test_edit_identifier_rejected() {
        let app = loaded_app().await;
        let response = app
            .oneshot(patch_cell(r#"{"row": 0, "column": "_id", "value": "x"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "COLUMN_NOT_EDITABLE");
    }

    #[tokio::test]
    async fn test_edit_without_table_conflicts() {
        let app = create_test_app(StaticSource::new(demo_records()), false).await;
        let response = app
            .oneshot(patch_cell(r#"{"row": 0, "column": "Title", "value": "x"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_refresh() {
        let app = create_test_app(StaticSource::new(demo_records()), false).await;
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/refresh")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["outcome"]["status"], "loaded");
        assert_eq!(body["outcome"]["rows"], 6);
        assert_eq!(body["report"]["cycle"], 1);
    }

    #[tokio::test]
    async fn test_export_csv() {
        let app = loaded_app().await;
        let response = app
            .oneshot(get("/api/v1/table/export?format=csv"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "text/csv"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("_id,Title,Year,Worldwide gross"));
    }

    #[tokio::test]
    async fn test_export_unknown_format() {
        let app = loaded_app().await;
        let response = app
            .oneshot(get("/api/v1/table/export?format=xlsx"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

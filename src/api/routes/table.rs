//! Table Routes
//!
//! - GET /api/v1/table - Current table view or placeholder
//! - PATCH /api/v1/table/cells - Edit one cell in place
//! - GET /api/v1/table/export - Download the current table

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::dto::{CellEditRequest, CellEditResponse, ExportParams};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::pipeline::TableState;
use crate::table::{ExportFormat, TableError};

/// GET /api/v1/table
pub async fn get_table(State(state): State<Arc<AppState>>) -> Json<TableState> {
    Json(state.dashboard.table())
}

/// PATCH /api/v1/table/cells
///
/// The edit stays in memory; the next refresh replaces it with the stored
/// document. Returns the charts recomputed from the edited table.
pub async fn edit_cell(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CellEditRequest>,
) -> ApiResult<Json<CellEditResponse>> {
    let charts = state
        .dashboard
        .edit_cell(req.row, &req.column, req.value)?;

    Ok(Json(CellEditResponse {
        status: "updated".to_string(),
        charts,
    }))
}

/// GET /api/v1/table/export
pub async fn export_table(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportParams>,
) -> ApiResult<Response> {
    if !state.config.enable_export {
        return Err(ApiError::Validation(
            "Export feature is disabled".to_string(),
        ));
    }

    let format: ExportFormat = params.format.parse().map_err(ApiError::Validation)?;

    let snapshot = state.dashboard.table();
    let table = snapshot.table().ok_or(TableError::NoTable)?;
    let body = table.export(format).map_err(ApiError::Internal)?;

    let filename = format!(
        "filmboard_export_{}.{}",
        Utc::now().format("%Y%m%d_%H%M%S"),
        format.extension()
    );

    tracing::info!(rows = table.row_count(), format = ?format, "Exported table");

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response())
}

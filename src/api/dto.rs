//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::charts::ChartPair;
use crate::pipeline::{CycleOutcome, CyclePhase, CycleReport};
use crate::source::{Record, Value};

// ============================================
// DIAGNOSTIC DTOs
// ============================================

/// Response of the connection diagnostic
#[derive(Debug, Serialize)]
pub struct ConnectionStatusResponse {
    /// "connected" or "error"
    pub status: String,
    /// Human-readable summary
    pub message: String,
    /// Collection name (no credentials)
    pub source: String,
    /// Sample documents, empty on failure
    pub sample: Vec<Record>,
}

// ============================================
// TABLE DTOs
// ============================================

/// In-place cell edit request
#[derive(Debug, Deserialize)]
pub struct CellEditRequest {
    /// 0-based row index
    pub row: usize,
    /// Column id
    pub column: String,
    /// New value
    pub value: Value,
}

/// Cell edit response: the charts recomputed from the edited table
#[derive(Debug, Serialize)]
pub struct CellEditResponse {
    pub status: String,
    pub charts: ChartPair,
}

/// Query parameters for table export
#[derive(Debug, Deserialize)]
pub struct ExportParams {
    /// Output format: csv, json
    #[serde(default = "default_export_format")]
    pub format: String,
}

fn default_export_format() -> String {
    "csv".to_string()
}

// ============================================
// REFRESH DTOs
// ============================================

/// Response of a manual refresh
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub outcome: CycleOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<CycleReport>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy", "degraded" or "starting"
    pub status: String,
    pub phase: CyclePhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_cycle: Option<CycleReport>,
    pub ws_connections: usize,
    pub uptime_seconds: u64,
    pub version: String,
}

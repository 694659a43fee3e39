//! Published pipeline state

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::table::{Materialized, Table};

/// Message shown in place of the table when loading failed
pub const TABLE_ERROR_MESSAGE: &str = "Error loading data table.";

/// Message shown in place of the table when the collection is empty
pub const NO_DATA_MESSAGE: &str = "No data available in the collection.";

/// What the table widget should currently show
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TableState {
    /// No refresh cycle has completed yet
    Pending,
    /// The collection is empty
    NoData { message: String },
    Ready { table: Table },
    /// The last fetch failed
    Failed { message: String },
}

impl TableState {
    pub fn table(&self) -> Option<&Table> {
        match self {
            TableState::Ready { table } => Some(table),
            _ => None,
        }
    }

    pub fn failed() -> Self {
        TableState::Failed {
            message: TABLE_ERROR_MESSAGE.to_string(),
        }
    }
}

impl From<Materialized> for TableState {
    fn from(materialized: Materialized) -> Self {
        match materialized {
            Materialized::NoData => TableState::NoData {
                message: NO_DATA_MESSAGE.to_string(),
            },
            Materialized::Table { table } => TableState::Ready { table },
        }
    }
}

/// Phase of the refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    Idle,
    Fetching,
    Materializing,
    Rendering,
}

/// How a refresh cycle ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CycleOutcome {
    Loaded { rows: usize, columns: usize },
    Empty,
    Failed { error: String },
}

impl CycleOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, CycleOutcome::Failed { .. })
    }
}

/// Record of the most recent completed cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    /// 1-based cycle counter since process start
    pub cycle: u64,
    pub outcome: CycleOutcome,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
}

//! Refresh Pipeline
//!
//! Connects the three components into one reactive cycle:
//!
//! 1. A timer tick (or process start) triggers a fetch from the data source
//! 2. The fetched records are materialized into a table, replacing the
//!    previous one wholesale
//! 3. Any table change (refresh or cell edit) recomputes the charts
//!
//! State is published through `tokio::sync::watch` channels so the HTTP and
//! WebSocket layers always read a consistent snapshot.

mod dashboard;
mod scheduler;
mod state;

pub use dashboard::Dashboard;
pub use scheduler::RefreshScheduler;
pub use state::{
    CycleOutcome, CyclePhase, CycleReport, TableState, NO_DATA_MESSAGE, TABLE_ERROR_MESSAGE,
};

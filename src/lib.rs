//! # Filmboard
//!
//! Live database dashboard: reads a document collection, materializes it into
//! an editable table and derives two chart specifications from that table.
//! A periodic refresh keeps everything current; connected clients receive
//! updates over WebSocket.
//!
//! ## Modules
//!
//! - [`source`]: Document sources (MongoDB, in-memory) with retry
//! - [`table`]: Record to table materialization, cell edits, export
//! - [`charts`]: Scatter and histogram specs derived from the table
//! - [`pipeline`]: Refresh cycle state machine and scheduler
//! - [`api`]: REST API server with Axum
//! - [`websocket`]: Real-time table and chart streaming
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use filmboard::pipeline::Dashboard;
//! use filmboard::source::{demo_records, StaticSource};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let source = Arc::new(StaticSource::new(demo_records()));
//!     let dashboard = Dashboard::new(source, Default::default(), Default::default());
//!
//!     let outcome = dashboard.refresh().await;
//!     println!("Refresh: {:?}", outcome);
//!
//!     let charts = dashboard.charts();
//!     println!("Scatter points: {}", charts.scatter.spec().map_or(0, |s| s.points.len()));
//! }
//! ```

pub mod api;
pub mod charts;
pub mod config;
pub mod pipeline;
pub mod source;
pub mod table;
pub mod telemetry;
pub mod websocket;

// Re-export top-level types for convenience
pub use source::{
    DocumentSource, MongoSource, Record, RetryPolicy, SourceError, SourceResult, StaticSource,
    Value,
};

pub use table::{Column, ExportFormat, Materialized, Materializer, Table, TableError};

pub use charts::{ChartOutput, ChartPair, ChartSpec, RenderError, VisualizationUpdater};

pub use pipeline::{CycleOutcome, CyclePhase, CycleReport, Dashboard, RefreshScheduler, TableState};

pub use api::{build_router, serve, ApiError, AppState};

pub use websocket::{
    websocket_handler, ClientMessage, ConnectionHub, HubConfig, HubError, ServerMessage, WsEvent,
};

pub use config::{Config, ConfigError, LoggingConfig};

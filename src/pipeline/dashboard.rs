//! Refresh cycle driver
//!
//! Owns the current table and chart state. Every change to the table, whether
//! a full refresh or a single cell edit, goes through [`Dashboard::render`],
//! so the charts always reflect the table that subscribers see.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as SyncMutex, PoisonError};
use std::time::Instant;

use chrono::Utc;
use tokio::sync::{watch, Mutex};

use super::state::{CycleOutcome, CyclePhase, CycleReport, TableState};
use crate::charts::{ChartPair, VisualizationUpdater};
use crate::config::Config;
use crate::source::{DocumentSource, Value};
use crate::table::{Materialized, Materializer, TableError};

/// The reactive table/chart pipeline for one collection
pub struct Dashboard {
    source: Arc<dyn DocumentSource>,
    materializer: Materializer,
    updater: VisualizationUpdater,
    /// Serializes refresh cycles
    cycle_lock: Mutex<()>,
    /// Held while a table change and its charts are published, so the two
    /// channels never disagree
    publish_lock: SyncMutex<()>,
    cycle_counter: AtomicU64,
    phase_tx: watch::Sender<CyclePhase>,
    table_tx: watch::Sender<TableState>,
    charts_tx: watch::Sender<ChartPair>,
    cycle_tx: watch::Sender<Option<CycleReport>>,
}

impl Dashboard {
    pub fn new(
        source: Arc<dyn DocumentSource>,
        materializer: Materializer,
        updater: VisualizationUpdater,
    ) -> Self {
        let initial_charts = updater.no_data();
        Self {
            source,
            materializer,
            updater,
            cycle_lock: Mutex::new(()),
            publish_lock: SyncMutex::new(()),
            cycle_counter: AtomicU64::new(0),
            phase_tx: watch::channel(CyclePhase::Idle).0,
            table_tx: watch::channel(TableState::Pending).0,
            charts_tx: watch::channel(initial_charts).0,
            cycle_tx: watch::channel(None).0,
        }
    }

    /// Build a dashboard with the materializer and charts from configuration
    pub fn from_config(source: Arc<dyn DocumentSource>, config: &Config) -> Self {
        Self::new(
            source,
            Materializer::new(config.table.id_field.clone()),
            VisualizationUpdater::new(&config.charts),
        )
    }

    pub fn source(&self) -> &Arc<dyn DocumentSource> {
        &self.source
    }

    pub fn phase(&self) -> CyclePhase {
        *self.phase_tx.borrow()
    }

    pub fn table(&self) -> TableState {
        self.table_tx.borrow().clone()
    }

    pub fn charts(&self) -> ChartPair {
        self.charts_tx.borrow().clone()
    }

    pub fn last_cycle(&self) -> Option<CycleReport> {
        self.cycle_tx.borrow().clone()
    }

    pub fn subscribe_table(&self) -> watch::Receiver<TableState> {
        self.table_tx.subscribe()
    }

    pub fn subscribe_charts(&self) -> watch::Receiver<ChartPair> {
        self.charts_tx.subscribe()
    }

    pub fn subscribe_cycles(&self) -> watch::Receiver<Option<CycleReport>> {
        self.cycle_tx.subscribe()
    }

    /// Run one refresh cycle: Idle → Fetching → Materializing → Rendering → Idle.
    ///
    /// A fetch failure publishes the error placeholder and returns to Idle;
    /// it is reported in the outcome, never propagated.
    pub async fn refresh(&self) -> CycleOutcome {
        let _guard = self.cycle_lock.lock().await;
        let started = Instant::now();
        let cycle = self.cycle_counter.fetch_add(1, Ordering::SeqCst) + 1;

        self.set_phase(CyclePhase::Fetching);
        let records = match self.source.fetch_all().await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(
                    cycle,
                    source = %self.source.name(),
                    error = %e,
                    "Refresh cycle failed while fetching"
                );
                self.publish_table(TableState::failed());
                self.set_phase(CyclePhase::Idle);

                let outcome = CycleOutcome::Failed {
                    error: e.to_string(),
                };
                self.finish(cycle, outcome.clone(), started);
                return outcome;
            }
        };

        self.set_phase(CyclePhase::Materializing);
        let materialized = self.materializer.materialize(&records);
        let outcome = match &materialized {
            Materialized::NoData => CycleOutcome::Empty,
            Materialized::Table { table } => CycleOutcome::Loaded {
                rows: table.row_count(),
                columns: table.column_count(),
            },
        };

        self.set_phase(CyclePhase::Rendering);
        self.publish_table(TableState::from(materialized));
        self.set_phase(CyclePhase::Idle);

        self.finish(cycle, outcome.clone(), started);
        outcome
    }

    /// Edit one cell of the current table and recompute the charts.
    ///
    /// Concurrent edits are applied one at a time; the last one wins.
    pub fn edit_cell(
        &self,
        row: usize,
        column: &str,
        value: Value,
    ) -> Result<ChartPair, TableError> {
        let _publish = self.publish_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut result = Err(TableError::NoTable);
        self.table_tx.send_if_modified(|state| match state {
            TableState::Ready { table } => {
                result = table.update_cell(row, column, value);
                result.is_ok()
            }
            _ => false,
        });
        result?;

        tracing::debug!(row, column, "Cell edited");
        Ok(self.render())
    }

    /// Replace the table and publish the charts derived from it
    fn publish_table(&self, state: TableState) {
        let _publish = self.publish_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.table_tx.send_replace(state);
        self.render();
    }

    /// Recompute charts from the current table and publish them.
    /// Callers hold `publish_lock`.
    fn render(&self) -> ChartPair {
        let charts = {
            let state = self.table_tx.borrow();
            self.updater.update_table(state.table())
        };
        self.charts_tx.send_replace(charts.clone());
        charts
    }

    fn set_phase(&self, phase: CyclePhase) {
        self.phase_tx.send_replace(phase);
    }

    fn finish(&self, cycle: u64, outcome: CycleOutcome, started: Instant) {
        let duration_ms = started.elapsed().as_millis() as u64;

        match &outcome {
            CycleOutcome::Loaded { rows, columns } => {
                tracing::info!(cycle, rows, columns, duration_ms, "Refresh cycle completed")
            }
            CycleOutcome::Empty => {
                tracing::info!(cycle, duration_ms, "Refresh cycle completed, collection is empty")
            }
            CycleOutcome::Failed { .. } => {}
        }

        self.cycle_tx.send_replace(Some(CycleReport {
            cycle,
            outcome,
            completed_at: Utc::now(),
            duration_ms,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{demo_records, Record, StaticSource};

    fn build(source: StaticSource) -> (Dashboard, Arc<StaticSource>) {
        let source = Arc::new(source);
        let dashboard = Dashboard::new(
            source.clone(),
            Materializer::default(),
            VisualizationUpdater::default(),
        );
        (dashboard, source)
    }

    #[tokio::test]
    async fn test_initial_state() {
        let (dashboard, _) = build(StaticSource::new(demo_records()));

        assert_eq!(dashboard.phase(), CyclePhase::Idle);
        assert_eq!(dashboard.table(), TableState::Pending);
        assert!(dashboard.charts().scatter.is_placeholder());
        assert!(dashboard.last_cycle().is_none());
    }

    #[tokio::test]
    async fn test_refresh_loads_table_and_charts() {
        let (dashboard, _) = build(StaticSource::new(demo_records()));

        let outcome = dashboard.refresh().await;

        assert_eq!(outcome, CycleOutcome::Loaded { rows: 6, columns: 4 });
        assert_eq!(dashboard.phase(), CyclePhase::Idle);
        assert_eq!(dashboard.table().table().unwrap().row_count(), 6);

        let charts = dashboard.charts();
        assert_eq!(charts.scatter.spec().unwrap().points.len(), 6);
        assert_eq!(charts.histogram.spec().unwrap().points.len(), 6);

        let report = dashboard.last_cycle().unwrap();
        assert_eq!(report.cycle, 1);
    }

    #[tokio::test]
    async fn test_empty_collection() {
        let (dashboard, _) = build(StaticSource::empty());

        let outcome = dashboard.refresh().await;

        assert_eq!(outcome, CycleOutcome::Empty);
        assert!(matches!(dashboard.table(), TableState::NoData { .. }));
        let charts = dashboard.charts();
        assert_eq!(
            charts.scatter.placeholder_message(),
            Some("No data available for scatter plot")
        );
        assert_eq!(
            charts.histogram.placeholder_message(),
            Some("No data available for histogram")
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_publishes_placeholder() {
        let (dashboard, source) = build(StaticSource::new(demo_records()));
        dashboard.refresh().await;

        source.fail_next(3);
        let outcome = dashboard.refresh().await;

        assert!(outcome.is_failed());
        assert_eq!(dashboard.phase(), CyclePhase::Idle);
        assert_eq!(dashboard.table(), TableState::failed());
        assert!(dashboard.charts().scatter.is_placeholder());
        assert!(dashboard.last_cycle().unwrap().outcome.is_failed());

        // The next cycle starts from scratch
        let outcome = dashboard.refresh().await;
        assert_eq!(outcome, CycleOutcome::Loaded { rows: 6, columns: 4 });
    }

    #[tokio::test]
    async fn test_edit_drives_charts() {
        let (dashboard, _) = build(StaticSource::new(demo_records()));
        dashboard.refresh().await;

        let charts = dashboard
            .edit_cell(0, "Worldwide gross", Value::Integer(1))
            .unwrap();

        assert_eq!(charts.scatter.spec().unwrap().points[0].y, Value::Integer(1));
        assert_eq!(dashboard.charts(), charts);
        assert_eq!(
            dashboard.table().table().unwrap().cell(0, "Worldwide gross"),
            Some(&Value::Integer(1))
        );
    }

    #[tokio::test]
    async fn test_edit_rejects_identifier_and_missing_table() {
        let (dashboard, _) = build(StaticSource::new(demo_records()));

        assert_eq!(
            dashboard.edit_cell(0, "Title", Value::from("x")),
            Err(TableError::NoTable)
        );

        dashboard.refresh().await;
        let before = dashboard.table();
        assert_eq!(
            dashboard.edit_cell(0, "_id", Value::from("x")),
            Err(TableError::NotEditable("_id".to_string()))
        );
        assert_eq!(dashboard.table(), before);
    }

    #[tokio::test]
    async fn test_refresh_replaces_edits() {
        let (dashboard, source) = build(StaticSource::new(demo_records()));
        dashboard.refresh().await;
        dashboard
            .edit_cell(0, "Title", Value::from("Edited"))
            .unwrap();

        source
            .set_records(vec![Record::new().field("_id", 1).field("Title", "Fresh")])
            .await;
        dashboard.refresh().await;

        let state = dashboard.table();
        let table = state.table().unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.cell(0, "Title"), Some(&Value::from("Fresh")));
        // Only two columns now; the histogram cannot be built
        assert_eq!(
            dashboard.charts().histogram.placeholder_message(),
            Some("Error creating histogram")
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_edits_keep_charts_in_step() {
        let (dashboard, _) = build(StaticSource::new(demo_records()));
        dashboard.refresh().await;
        let dashboard = Arc::new(dashboard);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let dashboard = Arc::clone(&dashboard);
                tokio::spawn(async move {
                    for round in 0..25 {
                        let gross = Value::Integer(i * 1000 + round);
                        dashboard
                            .edit_cell((i % 6) as usize, "Worldwide gross", gross)
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let state = dashboard.table();
        assert_eq!(
            dashboard.charts(),
            dashboard.updater.update_table(state.table())
        );
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let (dashboard, _) = build(StaticSource::new(demo_records()));
        let mut table_rx = dashboard.subscribe_table();
        let mut charts_rx = dashboard.subscribe_charts();

        dashboard.refresh().await;

        assert!(table_rx.has_changed().unwrap());
        assert!(charts_rx.has_changed().unwrap());
        assert!(table_rx.borrow_and_update().table().is_some());
        assert!(charts_rx.borrow_and_update().scatter.spec().is_some());
    }
}

//! Refresh Scheduler
//!
//! Drives refresh cycles on a fixed interval (weekly by default), optionally
//! running one as soon as it starts.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::dashboard::Dashboard;
use crate::config::RefreshConfig;

/// Periodic trigger for [`Dashboard::refresh`]
pub struct RefreshScheduler {
    dashboard: Arc<Dashboard>,
    interval: Duration,
    on_start: bool,
    shutdown_tx: watch::Sender<bool>,
}

impl RefreshScheduler {
    pub fn new(dashboard: Arc<Dashboard>, config: &RefreshConfig) -> Self {
        Self {
            dashboard,
            interval: config.interval(),
            on_start: config.on_start,
            shutdown_tx: watch::channel(false).0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start the scheduler background task
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            on_start = self.on_start,
            "Starting refresh scheduler"
        );

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // The first tick completes immediately
            if !self.on_start {
                ticker.tick().await;
            }

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        tracing::debug!("Running scheduled refresh");
                        self.dashboard.refresh().await;
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            tracing::info!("Refresh scheduler stopped");
        })
    }

    /// Stop the scheduler; an in-flight cycle finishes first
    pub fn stop(&self) {
        self.shutdown_tx.send_replace(true);
    }
}

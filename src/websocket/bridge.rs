//! Forwards pipeline state changes to WebSocket subscribers

use std::sync::Arc;
use tokio::task::JoinHandle;

use super::hub::ConnectionHub;
use super::messages::WsEvent;
use crate::pipeline::Dashboard;

/// Spawn a task that publishes every table, chart and cycle change to the hub.
///
/// Holds only the dashboard's receivers, so the task ends once the dashboard
/// is dropped.
pub fn spawn_bridge(dashboard: &Dashboard, hub: Arc<ConnectionHub>) -> JoinHandle<()> {
    let mut table_rx = dashboard.subscribe_table();
    let mut charts_rx = dashboard.subscribe_charts();
    let mut cycle_rx = dashboard.subscribe_cycles();

    tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                changed = table_rx.changed() => match changed {
                    Ok(()) => WsEvent::table(table_rx.borrow_and_update().clone()),
                    Err(_) => break,
                },
                changed = charts_rx.changed() => match changed {
                    Ok(()) => WsEvent::charts(charts_rx.borrow_and_update().clone()),
                    Err(_) => break,
                },
                changed = cycle_rx.changed() => match changed {
                    Ok(()) => match cycle_rx.borrow_and_update().clone() {
                        Some(report) => WsEvent::cycle(report),
                        None => continue,
                    },
                    Err(_) => break,
                },
            };

            hub.broadcast(&event).await;
        }

        tracing::debug!("WebSocket bridge stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::VisualizationUpdater;
    use crate::source::{demo_records, StaticSource};
    use crate::table::Materializer;
    use crate::websocket::{HubConfig, ServerMessage};
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_refresh_reaches_subscribers() {
        let dashboard = Dashboard::new(
            Arc::new(StaticSource::new(demo_records())),
            Materializer::default(),
            VisualizationUpdater::default(),
        );
        let hub = Arc::new(ConnectionHub::new(HubConfig::default()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = hub.register(tx).await.unwrap();
        hub.subscribe(&id, vec!["table".to_string()]).await.unwrap();

        let bridge = spawn_bridge(&dashboard, Arc::clone(&hub));
        dashboard.refresh().await;

        let msg = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no table update delivered")
            .unwrap();
        match msg {
            ServerMessage::Table { table } => assert!(table.table().is_some()),
            other => panic!("unexpected message {:?}", other),
        }

        drop(dashboard);
        tokio::time::timeout(Duration::from_secs(5), bridge)
            .await
            .expect("bridge did not stop")
            .unwrap();
    }
}

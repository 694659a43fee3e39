//! WebSocket Handler
//!
//! Handles WebSocket upgrade requests and manages the connection lifecycle.
//! A fresh subscription is answered with the current snapshot of each topic,
//! so clients never wait for the next change to draw something.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::hub::ConnectionHub;
use super::messages::{ClientMessage, ServerMessage, TOPIC_CHARTS, TOPIC_SYSTEM, TOPIC_TABLE};
use crate::api::AppState;
use crate::pipeline::Dashboard;

/// WebSocket upgrade handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    let hub = Arc::clone(&state.ws_hub);
    let dashboard = Arc::clone(&state.dashboard);
    ws.on_upgrade(move |socket| handle_socket(socket, hub, dashboard))
}

fn encode(message: &ServerMessage) -> Option<Message> {
    match serde_json::to_string(message) {
        Ok(text) => Some(Message::Text(text)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize message");
            None
        }
    }
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, hub: Arc<ConnectionHub>, dashboard: Arc<Dashboard>) {
    let (mut sender, mut receiver) = socket.split();

    // Create channel for sending messages to this connection
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let connection_id = match hub.register(tx).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, "Failed to register WebSocket connection");
            let error_msg = ServerMessage::Error {
                message: e.to_string(),
            };
            if let Some(msg) = encode(&error_msg) {
                let _ = sender.send(msg).await;
            }
            return;
        }
    };

    let connected_msg = ServerMessage::Connected {
        connection_id: connection_id.clone(),
    };
    let delivered = match encode(&connected_msg) {
        Some(msg) => sender.send(msg).await.is_ok(),
        None => false,
    };
    if !delivered {
        tracing::error!(connection_id = %connection_id, "Failed to send connected message");
        hub.unregister(&connection_id).await;
        return;
    }

    let conn_id_for_send = connection_id.clone();

    // Forward queued messages to the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let Some(frame) = encode(&msg) else { continue };
            if sender.send(frame).await.is_err() {
                tracing::debug!(
                    connection_id = %conn_id_for_send,
                    "WebSocket send failed, closing connection"
                );
                break;
            }
        }
    });

    let hub_for_recv = Arc::clone(&hub);
    let conn_id_for_recv = connection_id.clone();

    // Handle client messages
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(msg) => {
                    if !handle_ws_message(&hub_for_recv, &dashboard, &conn_id_for_recv, msg).await
                    {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %conn_id_for_recv,
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    hub.unregister(&connection_id).await;
}

/// Handle a received WebSocket message
///
/// Returns false if the connection should be closed.
async fn handle_ws_message(
    hub: &Arc<ConnectionHub>,
    dashboard: &Arc<Dashboard>,
    connection_id: &str,
    message: Message,
) -> bool {
    match message {
        Message::Text(text) => {
            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => {
                    handle_client_message(hub, dashboard, connection_id, client_msg).await;
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %connection_id,
                        error = %e,
                        "Invalid client message"
                    );
                    let error_msg = ServerMessage::Error {
                        message: format!("Invalid message format: {}", e),
                    };
                    let _ = hub.send_to(connection_id, error_msg).await;
                }
            }
            true
        }
        Message::Binary(_) => {
            let error_msg = ServerMessage::Error {
                message: "Binary messages not supported".to_string(),
            };
            let _ = hub.send_to(connection_id, error_msg).await;
            true
        }
        // Axum answers pings itself
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            tracing::debug!(connection_id = %connection_id, "Client requested close");
            false
        }
    }
}

/// Handle a parsed client message
async fn handle_client_message(
    hub: &Arc<ConnectionHub>,
    dashboard: &Arc<Dashboard>,
    connection_id: &str,
    message: ClientMessage,
) {
    match message {
        ClientMessage::Subscribe { topics } => match hub.subscribe(connection_id, topics).await {
            Ok(subscribed) => {
                let snapshots = snapshots_for(dashboard, &subscribed);
                let _ = hub
                    .send_to(connection_id, ServerMessage::Subscribed { topics: subscribed })
                    .await;
                for snapshot in snapshots {
                    let _ = hub.send_to(connection_id, snapshot).await;
                }
            }
            Err(e) => {
                tracing::error!(connection_id = %connection_id, error = %e, "Subscribe error");
                let _ = hub
                    .send_to(connection_id, ServerMessage::Error { message: e.to_string() })
                    .await;
            }
        },
        ClientMessage::Unsubscribe { topics } => {
            match hub.unsubscribe(connection_id, topics).await {
                Ok(unsubscribed) => {
                    let response = ServerMessage::Unsubscribed {
                        topics: unsubscribed,
                    };
                    let _ = hub.send_to(connection_id, response).await;
                }
                Err(e) => {
                    tracing::error!(
                        connection_id = %connection_id,
                        error = %e,
                        "Unsubscribe error"
                    );
                    let _ = hub
                        .send_to(connection_id, ServerMessage::Error { message: e.to_string() })
                        .await;
                }
            }
        }
        ClientMessage::Ping => {
            let _ = hub.send_to(connection_id, ServerMessage::Pong).await;
        }
    }
}

/// Current state of each subscribed topic
fn snapshots_for(dashboard: &Dashboard, topics: &[String]) -> Vec<ServerMessage> {
    let mut snapshots = Vec::new();
    for topic in topics {
        match topic.as_str() {
            TOPIC_TABLE => snapshots.push(ServerMessage::Table {
                table: dashboard.table(),
            }),
            TOPIC_CHARTS => snapshots.push(ServerMessage::Charts {
                charts: dashboard.charts(),
            }),
            TOPIC_SYSTEM => {
                if let Some(report) = dashboard.last_cycle() {
                    snapshots.push(ServerMessage::Cycle { report });
                }
            }
            _ => {}
        }
    }
    snapshots
}

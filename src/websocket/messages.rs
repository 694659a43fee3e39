//! WebSocket Message Types
//!
//! Defines all message types for WebSocket communication between
//! dashboard clients and the server.

use serde::{Deserialize, Serialize};

use crate::charts::ChartPair;
use crate::pipeline::{CycleReport, TableState};

/// Topic carrying table snapshots
pub const TOPIC_TABLE: &str = "table";
/// Topic carrying chart pairs
pub const TOPIC_CHARTS: &str = "charts";
/// Topic carrying refresh cycle reports
pub const TOPIC_SYSTEM: &str = "system";

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Subscribe to topics for real-time updates
    Subscribe {
        /// Topics to subscribe to: "table", "charts", "system"
        topics: Vec<String>,
    },
    /// Unsubscribe from topics
    Unsubscribe { topics: Vec<String> },
    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The table was replaced or edited
    Table { table: TableState },
    /// The charts were recomputed
    Charts { charts: ChartPair },
    /// A refresh cycle finished
    Cycle { report: CycleReport },
    /// Subscription confirmed
    Subscribed { topics: Vec<String> },
    /// Unsubscription confirmed
    Unsubscribed { topics: Vec<String> },
    /// Pong response to ping
    Pong,
    /// Error message
    Error { message: String },
    /// Connection established
    Connected { connection_id: String },
}

/// Internal event for broadcasting through the hub
#[derive(Debug, Clone)]
pub struct WsEvent {
    /// Topic this event belongs to
    pub topic: String,
    /// The message to send to subscribers
    pub message: ServerMessage,
}

impl WsEvent {
    pub fn table(table: TableState) -> Self {
        Self {
            topic: TOPIC_TABLE.to_string(),
            message: ServerMessage::Table { table },
        }
    }

    pub fn charts(charts: ChartPair) -> Self {
        Self {
            topic: TOPIC_CHARTS.to_string(),
            message: ServerMessage::Charts { charts },
        }
    }

    pub fn cycle(report: CycleReport) -> Self {
        Self {
            topic: TOPIC_SYSTEM.to_string(),
            message: ServerMessage::Cycle { report },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_parsing() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type": "subscribe", "topics": ["table", "charts"]}"#)
                .unwrap();
        match msg {
            ClientMessage::Subscribe { topics } => assert_eq!(topics, vec!["table", "charts"]),
            other => panic!("unexpected message {:?}", other),
        }

        let ping: ClientMessage = serde_json::from_str(r#"{"type": "ping"}"#).unwrap();
        assert!(matches!(ping, ClientMessage::Ping));
    }

    #[test]
    fn test_server_message_serialization() {
        let msg = WsEvent::table(TableState::Pending).message;
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "table");
        assert_eq!(json["table"]["state"], "pending");
    }
}

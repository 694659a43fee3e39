//! WebSocket Real-Time Streaming
//!
//! Pushes table and chart updates to dashboard clients as they happen.
//!
//! ## Architecture
//!
//! - **ConnectionHub**: Manages all active connections and subscriptions
//! - **Bridge**: Forwards pipeline state changes into the hub
//! - **Handler**: Handles WebSocket upgrade and message processing
//! - **Messages**: Defines client and server message formats
//!
//! ## Topics
//!
//! - `table` - Table snapshots (refresh or cell edit)
//! - `charts` - Recomputed chart pairs
//! - `system` - Refresh cycle reports
//!
//! ## Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:8050/ws');
//!
//! ws.onopen = () => {
//!   ws.send(JSON.stringify({type: 'subscribe', topics: ['table', 'charts']}));
//! };
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   console.log('Received:', msg);
//! };
//! ```

mod bridge;
mod handler;
mod hub;
mod messages;

pub use bridge::spawn_bridge;
pub use handler::websocket_handler;
pub use hub::{ConnectionHub, HubConfig, HubError};
pub use messages::{ClientMessage, ServerMessage, WsEvent, TOPIC_CHARTS, TOPIC_SYSTEM, TOPIC_TABLE};

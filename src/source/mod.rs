//! Data Source Adapter
//!
//! Reads the full contents of one document collection and hands it to the
//! materializer as a sequence of [`Record`]s.
//!
//! ## Architecture
//!
//! - **DocumentSource**: the injectable adapter trait the refresh pipeline
//!   depends on
//! - **MongoSource**: MongoDB implementation with a shared or per-refresh
//!   client
//! - **StaticSource**: in-memory implementation for tests and demo mode
//! - **RetryPolicy**: bounded retry budget shared by all implementations
//!
//! An empty collection is not an error: `fetch_all` returns an empty vector
//! and the materializer turns that into its "no data" sentinel.

mod error;
mod memory;
mod mongo;
mod record;
mod retry;

pub use error::{SourceError, SourceResult};
pub use memory::{demo_records, StaticSource};
pub use mongo::{record_from_document, redact_uri, ConnectionPolicy, MongoSource};
pub use record::{Record, Value};
pub use retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS};

use async_trait::async_trait;

/// Common trait for document collection readers
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Human-readable name of the collection being read (no credentials)
    fn name(&self) -> &str;

    /// Fetch every document in the collection.
    ///
    /// Fails with [`SourceError::Connection`] once the retry budget is spent;
    /// never returns partial data.
    async fn fetch_all(&self) -> SourceResult<Vec<Record>>;

    /// Fetch at most `limit` documents, with the same retry policy
    async fn sample(&self, limit: usize) -> SourceResult<Vec<Record>>;

    /// Release any held connection. Called once by the hosting process.
    async fn shutdown(&self) {}
}

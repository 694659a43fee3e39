//! In-memory document source
//!
//! Serves a fixed set of records through the same retry path as the
//! database-backed source. Can be told to fail its next N attempts, which
//! makes connection failures reproducible without a server.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::RwLock;

use super::error::{SourceError, SourceResult};
use super::record::{Record, Value};
use super::retry::RetryPolicy;
use super::DocumentSource;

/// Document source backed by a vector of records
pub struct StaticSource {
    name: String,
    records: RwLock<Vec<Record>>,
    retry: RetryPolicy,
    /// Remaining attempts that will fail with a transient error
    failures_remaining: AtomicU32,
    /// Total attempts made, successful or not
    attempts: AtomicU32,
}

impl StaticSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            name: "memory".to_string(),
            records: RwLock::new(records),
            retry: RetryPolicy::immediate(super::DEFAULT_MAX_ATTEMPTS),
            failures_remaining: AtomicU32::new(0),
            attempts: AtomicU32::new(0),
        }
    }

    /// A source for an empty collection
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Fail the next `count` attempts with a transient connection error
    pub fn failing(self, count: u32) -> Self {
        self.failures_remaining.store(count, Ordering::SeqCst);
        self
    }

    /// Schedule `count` more failing attempts on a live source
    pub fn fail_next(&self, count: u32) {
        self.failures_remaining.store(count, Ordering::SeqCst);
    }

    /// Replace the collection contents
    pub async fn set_records(&self, records: Vec<Record>) {
        *self.records.write().await = records;
    }

    /// Number of attempts made so far
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    async fn attempt(&self, limit: Option<usize>) -> SourceResult<Vec<Record>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let should_fail = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(SourceError::Transient("connection refused".to_string()));
        }

        let records = self.records.read().await;
        let take = limit.unwrap_or(records.len());
        Ok(records.iter().take(take).cloned().collect())
    }
}

#[async_trait]
impl DocumentSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_all(&self) -> SourceResult<Vec<Record>> {
        self.retry.run(&self.name, |_| self.attempt(None)).await
    }

    async fn sample(&self, limit: usize) -> SourceResult<Vec<Record>> {
        self.retry.run(&self.name, |_| self.attempt(Some(limit))).await
    }
}

/// A small animated-films collection used by demo mode
pub fn demo_records() -> Vec<Record> {
    let films: [(&str, &str, i64, i64); 6] = [
        ("65a1f0c2e4b0a1b2c3d4e501", "Frozen II", 2019, 1_450_026_933),
        ("65a1f0c2e4b0a1b2c3d4e502", "Frozen", 2013, 1_290_000_000),
        ("65a1f0c2e4b0a1b2c3d4e503", "Incredibles 2", 2018, 1_242_805_359),
        ("65a1f0c2e4b0a1b2c3d4e504", "Minions", 2015, 1_159_398_397),
        ("65a1f0c2e4b0a1b2c3d4e505", "Toy Story 4", 2019, 1_073_394_593),
        ("65a1f0c2e4b0a1b2c3d4e506", "Toy Story 3", 2010, 1_066_969_703),
    ];

    films
        .iter()
        .map(|(id, title, year, gross)| {
            Record::new()
                .field("_id", Value::Identifier(id.to_string()))
                .field("Title", *title)
                .field("Year", *year)
                .field("Worldwide gross", *gross)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_all_returns_every_record() {
        let source = StaticSource::new(demo_records());
        let records = source.fetch_all().await.unwrap();

        assert_eq!(records.len(), 6);
        assert_eq!(source.attempts(), 1);
    }

    #[tokio::test]
    async fn test_empty_collection_is_not_an_error() {
        let source = StaticSource::empty();
        let records = source.fetch_all().await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_fails_after_three_attempts() {
        let source = StaticSource::new(demo_records()).failing(3);

        let result = source.fetch_all().await;

        assert_eq!(source.attempts(), 3);
        match result {
            Err(SourceError::Connection { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected connection error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_recovers_within_budget() {
        let source = StaticSource::new(demo_records()).failing(2);

        let records = source.fetch_all().await.unwrap();

        assert_eq!(records.len(), 6);
        assert_eq!(source.attempts(), 3);
    }

    #[tokio::test]
    async fn test_sample_respects_limit() {
        let source = StaticSource::new(demo_records());
        let sample = source.sample(1).await.unwrap();

        assert_eq!(sample.len(), 1);
        assert_eq!(sample[0].get("Title"), Some(&Value::Text("Frozen II".into())));
    }
}

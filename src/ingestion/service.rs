//! One ingestion run: fetch, parse, reconcile.

use super::engine::{ReconciliationEngine, ReconciliationResult};
use crate::album_store::StoreError;
use crate::feed::{FeedError, FeedFetcher, FeedParser, FetchError};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Reconciliation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub struct IngestionService {
    fetcher: Arc<dyn FeedFetcher>,
    engine: ReconciliationEngine,
    run_lock: Mutex<()>,
}

impl IngestionService {
    pub fn new(fetcher: Arc<dyn FeedFetcher>, engine: ReconciliationEngine) -> Self {
        Self {
            fetcher,
            engine,
            run_lock: Mutex::new(()),
        }
    }

    /// Ingest the feed found at `location`.
    ///
    /// Runs are serialized. A fetch or feed error stops the run before the
    /// store is touched; a store error rolls the whole batch back.
    pub async fn run(&self, location: &str) -> Result<ReconciliationResult, IngestionError> {
        let _guard = self.run_lock.lock().await;
        let started = Instant::now();

        let result = self.ingest(location).await;
        match &result {
            Ok(summary) => info!(
                "Ingested {} in {:?}: {} created, {} updated, {} demoted",
                location,
                started.elapsed(),
                summary.created,
                summary.updated,
                summary.demoted
            ),
            Err(e) => error!("Ingestion of {} failed: {}", location, e),
        }
        result
    }

    async fn ingest(&self, location: &str) -> Result<ReconciliationResult, IngestionError> {
        let payload = self.fetcher.fetch(location).await?;
        let parsed = FeedParser::parse(&payload)?;
        let candidates = parsed.collect_candidates()?;

        let engine = self.engine.clone();
        let summary =
            tokio::task::spawn_blocking(move || engine.reconcile(&candidates)).await??;
        Ok(summary)
    }
}

use super::feed::FeedBuilder;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use top_albums::feed::FeedParser;
use top_albums::{
    QueryEngine, QueryError, QueryRequest, QueryResult, ReconciliationEngine,
    ReconciliationResult, SqliteAlbumStore,
};

/// A SQLite album catalog living in a temporary directory.
pub struct TestCatalog {
    pub store: Arc<SqliteAlbumStore>,
    temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestCatalog {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(SqliteAlbumStore::new(temp_dir.path().join("albums.db"), 4).unwrap());
        Self { store, temp_dir }
    }

    /// Parse `feed` and reconcile it, panicking on any error.
    pub fn ingest(&self, feed: &FeedBuilder) -> ReconciliationResult {
        let candidates = FeedParser::parse(&feed.to_bytes())
            .unwrap()
            .collect_candidates()
            .unwrap();
        ReconciliationEngine::new(self.store.clone())
            .reconcile(&candidates)
            .unwrap()
    }

    pub fn query(&self, request: &QueryRequest) -> Result<QueryResult, QueryError> {
        QueryEngine::new(self.store.clone()).query(request)
    }

    /// Ids of the albums returned by `request`, in result order.
    pub fn query_ids(&self, request: &QueryRequest) -> Vec<String> {
        self.query(request)
            .unwrap()
            .items
            .into_iter()
            .map(|album| album.id)
            .collect()
    }

    /// Write `feed` next to the database and return its path.
    pub fn write_feed_file(&self, feed: &FeedBuilder) -> PathBuf {
        let path = self.temp_dir.path().join("feed.json");
        std::fs::write(&path, feed.to_bytes()).unwrap();
        path
    }
}

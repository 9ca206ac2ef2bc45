//! Store abstractions consumed by reconciliation and querying.

use super::models::{Album, Category};
use crate::query::{Filter, SortKey};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Schema error: {0:#}")]
    Schema(anyhow::Error),

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error("Album '{0}' not found")]
    AlbumNotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// A validated album query: AND-combined filters, composite sort, window.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AlbumQuery {
    pub filters: Vec<Filter>,
    pub sort: Vec<SortKey>,
    pub offset: usize,
    /// `None` returns every row from `offset` on.
    pub limit: Option<usize>,
}

/// One window of matching albums plus the size of the whole match set.
#[derive(Clone, Debug, PartialEq)]
pub struct AlbumWindow {
    pub albums: Vec<Album>,
    pub total_count: usize,
}

/// Persistent storage of albums and categories.
///
/// Reads always observe committed state only, so a query running next to a
/// reconciliation sees the catalog either before or after the whole batch.
pub trait AlbumStore: Send + Sync {
    /// Opens the single write transaction. Dropping the returned value
    /// without calling [`AlbumWriteTransaction::commit`] rolls everything back.
    fn begin_write(&self) -> Result<Box<dyn AlbumWriteTransaction + '_>, StoreError>;

    /// Get an album by feed identifier, categories included.
    fn get_album(&self, id: &str) -> Result<Option<Album>, StoreError>;

    /// Run a filtered, sorted and windowed query.
    fn query_albums(&self, query: &AlbumQuery) -> Result<AlbumWindow, StoreError>;

    fn count_albums(&self) -> Result<usize, StoreError>;

    /// All categories, ordered by name.
    fn list_categories(&self) -> Result<Vec<Category>, StoreError>;

    /// Whether the backing database answers at all.
    fn health_check(&self) -> bool;
}

/// Write operations scoped to one all-or-nothing transaction.
pub trait AlbumWriteTransaction {
    fn get_album(&self, id: &str) -> Result<Option<Album>, StoreError>;

    /// Insert the album or overwrite every mutable field of the stored one.
    /// `album.categories` is ignored, see [`Self::set_album_categories`].
    fn upsert_album(&mut self, album: &Album) -> Result<(), StoreError>;

    fn set_album_top_flag(&mut self, id: &str, is_top: bool) -> Result<(), StoreError>;

    /// Identifiers of every album currently flagged as top.
    fn top_album_ids(&self) -> Result<Vec<String>, StoreError>;

    /// Look the category up by exact name and insert it only when missing.
    fn get_or_create_category(&mut self, name: &str) -> Result<Category, StoreError>;

    /// Replace the album's category links with `categories`, in order.
    fn set_album_categories(
        &mut self,
        album_id: &str,
        categories: &[Category],
    ) -> Result<(), StoreError>;

    fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

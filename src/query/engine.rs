//! Translates request parameters into a validated store query.

use super::error::QueryError;
use super::filter::Filter;
use super::page::{PageInfo, PageRequest, ValidatedPage};
use super::sort::SortKey;
use crate::album_store::{Album, AlbumQuery, AlbumStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Raw query parameters as received from a caller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryRequest {
    /// `(field[__op], value)` pairs, combined with AND.
    pub filters: Vec<(String, String)>,
    /// Sort keys in precedence order, `-field` for descending.
    pub sort: Vec<String>,
    pub page: PageRequest,
}

impl QueryRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }

    pub fn sort_asc(mut self, field: &str) -> Self {
        self.sort.push(field.to_string());
        self
    }

    pub fn sort_desc(mut self, field: &str) -> Self {
        self.sort.push(format!("-{}", field));
        self
    }

    /// Append every key of a comma-separated list such as `artist,-release_date`.
    pub fn sort_by(mut self, keys: &str) -> Self {
        if !keys.trim().is_empty() {
            self.sort.extend(keys.split(',').map(str::to_string));
        }
        self
    }

    pub fn page_size(mut self, page_size: i64) -> Self {
        self.page.page_size = Some(page_size);
        self
    }

    pub fn page_number(mut self, page_number: i64) -> Self {
        self.page.page_number = Some(page_number);
        self
    }
}

/// An ordered window of albums with its pagination metadata.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueryResult {
    pub items: Vec<Album>,
    #[serde(flatten)]
    pub page: PageInfo,
}

pub struct QueryEngine {
    store: Arc<dyn AlbumStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn AlbumStore>) -> Self {
        Self { store }
    }

    /// Validate `request` and run it. Nothing touches the store until every
    /// filter, sort key and page parameter has been accepted.
    pub fn query(&self, request: &QueryRequest) -> Result<QueryResult, QueryError> {
        let (query, page) = compile(request)?;
        debug!(
            "Querying albums: {} filters, {} sort keys, offset {}, limit {:?}",
            query.filters.len(),
            query.sort.len(),
            query.offset,
            query.limit
        );
        let window = self.store.query_albums(&query)?;
        Ok(QueryResult {
            items: window.albums,
            page: page.page_info(window.total_count),
        })
    }
}

fn compile(request: &QueryRequest) -> Result<(AlbumQuery, ValidatedPage), QueryError> {
    let filters = request
        .filters
        .iter()
        .map(|(key, value)| Filter::parse(key, value))
        .collect::<Result<Vec<_>, _>>()?;
    let sort = request
        .sort
        .iter()
        .map(|key| SortKey::parse(key))
        .collect::<Result<Vec<_>, _>>()?;
    let page = request.page.validate()?;
    let (offset, limit) = page.window();
    Ok((
        AlbumQuery {
            filters,
            sort,
            offset,
            limit,
        },
        page,
    ))
}

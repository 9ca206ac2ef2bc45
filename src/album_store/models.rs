//! Catalog entities persisted by the album store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One entry of the top albums catalog.
///
/// Albums are never deleted by ingestion: an album that drops off the chart
/// keeps every field, including its last `rank`, and only has `is_top`
/// cleared.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Album {
    /// Identifier assigned by the feed; immutable once stored.
    pub id: String,
    pub name: String,
    pub artist_name: String,
    pub artist_url: Option<String>,
    pub collection_name: String,
    pub release_date: NaiveDate,
    /// 1-based chart position, meaningful while `is_top` is set.
    pub rank: i64,
    pub is_top: bool,
    pub rights: String,
    pub track_count: Option<i64>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub store_url: Option<String>,
    pub images: AlbumImages,
    /// Category names, primary category first.
    pub categories: Vec<String>,
}

/// The three fixed image tiers published by the feed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumImages {
    pub small_url: Option<String>,
    pub medium_url: Option<String>,
    pub large_url: Option<String>,
}

/// A genre label, unique by (case-sensitive) name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

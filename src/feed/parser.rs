//! Normalization of the raw feed into ranked candidate records.

use super::error::FeedError;
use super::models::{number_value, FeedDocument, RawEntry, RawImage};
use crate::album_store::{Album, AlbumImages};
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{debug, warn};

const IMAGE_SLOTS: usize = 3;

/// One normalized feed entry, ready to be reconciled.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub artist_name: String,
    pub artist_url: Option<String>,
    pub collection_name: String,
    pub release_date: NaiveDate,
    pub rights: String,
    /// 1-based position of the entry in the feed.
    pub rank: i64,
    pub track_count: Option<i64>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub store_url: Option<String>,
    pub images: AlbumImages,
    /// Distinct category labels in feed order.
    pub categories: Vec<String>,
}

impl Candidate {
    /// The album this candidate describes, flagged as top.
    pub fn to_album(&self) -> Album {
        Album {
            id: self.id.clone(),
            name: self.name.clone(),
            artist_name: self.artist_name.clone(),
            artist_url: self.artist_url.clone(),
            collection_name: self.collection_name.clone(),
            release_date: self.release_date,
            rank: self.rank,
            is_top: true,
            rights: self.rights.clone(),
            track_count: self.track_count,
            price: self.price,
            currency: self.currency.clone(),
            store_url: self.store_url.clone(),
            images: self.images.clone(),
            categories: self.categories.clone(),
        }
    }
}

/// A feed whose entries passed the batch-level checks: non-empty, every
/// entry identified, no identifier repeated.
#[derive(Debug)]
pub struct ParsedFeed {
    entries: Vec<RawEntry>,
}

impl ParsedFeed {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Candidates in feed order. Normalization is lazy and the sequence can
    /// be walked again from the start by calling this once more.
    pub fn candidates(&self) -> impl Iterator<Item = Result<Candidate, FeedError>> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| normalize(index + 1, entry))
    }

    /// Every candidate, or the first malformed entry.
    pub fn collect_candidates(&self) -> Result<Vec<Candidate>, FeedError> {
        self.candidates().collect()
    }
}

pub struct FeedParser;

impl FeedParser {
    pub fn parse(payload: &[u8]) -> Result<ParsedFeed, FeedError> {
        let document: FeedDocument = serde_json::from_slice(payload)?;
        let entries = document
            .feed
            .entry
            .map(|entry| entry.into_vec())
            .unwrap_or_default();

        if entries.is_empty() {
            return Err(FeedError::Malformed("feed has no entries".to_string()));
        }

        let mut seen = HashSet::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let id = entry_id(entry).ok_or_else(|| FeedError::entry(index + 1, "missing id"))?;
            if !seen.insert(id) {
                return Err(FeedError::entry(
                    index + 1,
                    format!("duplicate id '{}'", id),
                ));
            }
        }

        debug!("Parsed feed with {} entries", entries.len());
        Ok(ParsedFeed { entries })
    }
}

fn entry_id(entry: &RawEntry) -> Option<&str> {
    entry
        .id
        .as_ref()?
        .attributes
        .as_ref()?
        .im_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn mandatory(
    position: usize,
    field: &str,
    value: Option<&str>,
) -> Result<String, FeedError> {
    value
        .and_then(non_empty)
        .ok_or_else(|| FeedError::entry(position, format!("missing {}", field)))
}

/// Calendar date of an RFC 3339 timestamp or a plain `YYYY-MM-DD`.
fn parse_release_date(position: usize, label: &str) -> Result<NaiveDate, FeedError> {
    let label = label.trim();
    let date_part = label.get(..10).unwrap_or(label);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| {
        FeedError::entry(position, format!("unparseable release date '{}'", label))
    })
}

fn image_height(image: &RawImage) -> Option<f64> {
    image
        .attributes
        .as_ref()
        .and_then(|attributes| attributes.height.as_ref())
        .and_then(number_value)
}

/// Nominal heights of the small, medium and large artwork tiers.
const TIER_HEIGHTS: [f64; IMAGE_SLOTS] = [55.0, 60.0, 170.0];

/// Slot of the tier whose nominal height is closest to `height`.
fn tier_for_height(height: f64) -> usize {
    let mut best = 0;
    for (slot, nominal) in TIER_HEIGHTS.iter().enumerate() {
        if (height - nominal).abs() < (height - TIER_HEIGHTS[best]).abs() {
            best = slot;
        }
    }
    best
}

fn images(id: &str, raw: &[RawImage]) -> AlbumImages {
    let mut slots: [Option<String>; IMAGE_SLOTS] = Default::default();
    for (position, image) in raw.iter().take(IMAGE_SLOTS).enumerate() {
        let Some(url) = non_empty(&image.label) else {
            continue;
        };
        // Undeclared heights keep their feed position
        let slot = image_height(image).map_or(position, tier_for_height);
        if slots[slot].is_some() {
            debug!("Album {} has more than one image for tier {}", id, slot);
            continue;
        }
        slots[slot] = Some(url);
    }

    let [small_url, medium_url, large_url] = slots;
    let images = AlbumImages {
        small_url,
        medium_url,
        large_url,
    };
    if images.small_url.is_none() || images.medium_url.is_none() || images.large_url.is_none() {
        warn!("Album {} is missing one or more image sizes", id);
    }
    images
}

fn categories(entry: &RawEntry) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let raw = entry
        .category
        .as_ref()
        .map(|category| category.as_slice())
        .unwrap_or_default();
    for category in raw {
        let Some(attributes) = category.attributes.as_ref() else {
            continue;
        };
        let name = attributes
            .term
            .as_deref()
            .and_then(non_empty)
            .or_else(|| attributes.label.as_deref().and_then(non_empty));
        if let Some(name) = name {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

fn normalize(position: usize, entry: &RawEntry) -> Result<Candidate, FeedError> {
    let id = mandatory(position, "id", entry_id(entry))?;
    let name = mandatory(
        position,
        "name",
        entry.name.as_ref().map(|l| l.label.as_str()),
    )?;
    let artist_name = mandatory(
        position,
        "artist",
        entry.artist.as_ref().map(|a| a.label.as_str()),
    )?;
    let release_label = mandatory(
        position,
        "release date",
        entry.release_date.as_ref().map(|l| l.label.as_str()),
    )?;
    let release_date = parse_release_date(position, &release_label)?;

    let artist_url = entry
        .artist
        .as_ref()
        .and_then(|artist| artist.attributes.as_ref())
        .and_then(|attributes| attributes.href.as_deref())
        .and_then(non_empty);
    let collection_name = entry
        .collection
        .as_ref()
        .and_then(|collection| collection.name.as_ref())
        .and_then(|label| non_empty(&label.label))
        .unwrap_or_else(|| name.clone());
    let rights = entry
        .rights
        .as_ref()
        .map(|rights| rights.label.trim().to_string())
        .unwrap_or_default();

    let track_count = entry.item_count.as_ref().and_then(|count| {
        let parsed = count.label.trim().parse::<i64>().ok();
        if parsed.is_none() {
            warn!("Album {} has unparseable track count '{}'", id, count.label);
        }
        parsed
    });

    let price_attributes = entry.price.as_ref().and_then(|p| p.attributes.as_ref());
    let price = price_attributes
        .and_then(|attributes| attributes.amount.as_ref())
        .and_then(|amount| {
            let parsed = number_value(amount).filter(|value| value.is_finite());
            if parsed.is_none() {
                warn!("Album {} has unparseable price {}", id, amount);
            }
            parsed
        });
    let currency = price_attributes
        .and_then(|attributes| attributes.currency.as_deref())
        .and_then(non_empty);

    let store_url = entry.link.as_ref().and_then(|links| {
        links
            .as_slice()
            .iter()
            .filter_map(|link| link.attributes.as_ref()?.href.as_deref())
            .find_map(non_empty)
    });

    Ok(Candidate {
        images: images(&id, &entry.images),
        categories: categories(entry),
        id,
        name,
        artist_name,
        artist_url,
        collection_name,
        release_date,
        rights,
        rank: position as i64,
        track_count,
        price,
        currency,
        store_url,
    })
}

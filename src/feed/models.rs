//! Serde shapes of the iTunes top albums RSS (JSON flavor).
//!
//! Every field is optional here; which ones are mandatory is decided by the
//! parser so that a missing value becomes a positioned feed error rather
//! than an opaque deserialization failure.

use serde::Deserialize;
use serde_json::Value;

/// Some feed nodes hold a single object where a list would be expected.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }

    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => std::slice::from_ref(item),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FeedDocument {
    pub feed: FeedBody,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedBody {
    pub entry: Option<OneOrMany<RawEntry>>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawEntry {
    pub id: Option<RawId>,
    #[serde(rename = "im:name")]
    pub name: Option<Label>,
    #[serde(rename = "im:artist")]
    pub artist: Option<LinkedLabel>,
    #[serde(rename = "im:collection")]
    pub collection: Option<RawCollection>,
    #[serde(rename = "im:releaseDate")]
    pub release_date: Option<Label>,
    pub rights: Option<Label>,
    pub category: Option<OneOrMany<RawCategory>>,
    #[serde(rename = "im:image", default)]
    pub images: Vec<RawImage>,
    #[serde(rename = "im:itemCount")]
    pub item_count: Option<Label>,
    #[serde(rename = "im:price")]
    pub price: Option<RawPrice>,
    pub link: Option<OneOrMany<RawLink>>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawId {
    #[serde(default)]
    pub label: String,
    pub attributes: Option<IdAttributes>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct IdAttributes {
    #[serde(rename = "im:id")]
    pub im_id: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct HrefAttributes {
    pub href: Option<String>,
}

/// A label that may carry a link, like the artist node.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LinkedLabel {
    #[serde(default)]
    pub label: String,
    pub attributes: Option<HrefAttributes>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawCollection {
    #[serde(rename = "im:name")]
    pub name: Option<Label>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawCategory {
    pub attributes: Option<CategoryAttributes>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct CategoryAttributes {
    pub term: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawImage {
    #[serde(default)]
    pub label: String,
    pub attributes: Option<ImageAttributes>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ImageAttributes {
    /// Published as a string ("55") but accepted as a number too.
    pub height: Option<Value>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawPrice {
    #[serde(default)]
    pub label: String,
    pub attributes: Option<PriceAttributes>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct PriceAttributes {
    pub amount: Option<Value>,
    pub currency: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawLink {
    pub attributes: Option<HrefAttributes>,
}

/// Numeric value of a node that the feed may encode as string or number.
pub(crate) fn number_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_or_many() {
        let one: OneOrMany<Label> = serde_json::from_str(r#"{"label": "Pop"}"#).unwrap();
        assert_eq!(one.as_slice().len(), 1);

        let many: OneOrMany<Label> =
            serde_json::from_str(r#"[{"label": "Pop"}, {"label": "Rock"}]"#).unwrap();
        let labels: Vec<String> = many.into_vec().into_iter().map(|l| l.label).collect();
        assert_eq!(labels, vec!["Pop", "Rock"]);
    }

    #[test]
    fn test_number_value() {
        assert_eq!(number_value(&Value::from("9.99")), Some(9.99));
        assert_eq!(number_value(&Value::from(170)), Some(170.0));
        assert_eq!(number_value(&Value::from("n/a")), None);
        assert_eq!(number_value(&Value::Null), None);
    }
}

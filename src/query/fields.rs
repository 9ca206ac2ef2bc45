//! The closed set of queryable album fields and the operators each accepts.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FieldType {
    Text,
    Integer,
    Real,
    Date,
    Boolean,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Id,
    Name,
    Artist,
    Collection,
    Rights,
    /// Matches any of the album's categories; sorts on the primary one.
    Category,
    ReleaseDate,
    Rank,
    TrackCount,
    Price,
    IsTop,
}

impl Field {
    pub const ALL: &'static [Field] = &[
        Field::Id,
        Field::Name,
        Field::Artist,
        Field::Collection,
        Field::Rights,
        Field::Category,
        Field::ReleaseDate,
        Field::Rank,
        Field::TrackCount,
        Field::Price,
        Field::IsTop,
    ];

    /// Resolve a request field name, accepting the documented aliases.
    pub fn from_name(name: &str) -> Option<Field> {
        match name {
            "id" => Some(Field::Id),
            "name" => Some(Field::Name),
            "artist" | "artist_name" => Some(Field::Artist),
            "collection" | "collection_name" => Some(Field::Collection),
            "rights" => Some(Field::Rights),
            "category" | "genre" => Some(Field::Category),
            "release_date" => Some(Field::ReleaseDate),
            "rank" => Some(Field::Rank),
            "track_count" => Some(Field::TrackCount),
            "price" => Some(Field::Price),
            "is_top" => Some(Field::IsTop),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Name => "name",
            Field::Artist => "artist",
            Field::Collection => "collection",
            Field::Rights => "rights",
            Field::Category => "category",
            Field::ReleaseDate => "release_date",
            Field::Rank => "rank",
            Field::TrackCount => "track_count",
            Field::Price => "price",
            Field::IsTop => "is_top",
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            Field::Id | Field::Name | Field::Artist | Field::Collection | Field::Rights => {
                FieldType::Text
            }
            Field::Category => FieldType::Text,
            Field::ReleaseDate => FieldType::Date,
            Field::Rank | Field::TrackCount => FieldType::Integer,
            Field::Price => FieldType::Real,
            Field::IsTop => FieldType::Boolean,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Ne,
    Contains,
    IContains,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl FilterOp {
    pub fn from_suffix(suffix: &str) -> Option<FilterOp> {
        match suffix {
            "eq" => Some(FilterOp::Eq),
            "ne" | "not" => Some(FilterOp::Ne),
            "contains" => Some(FilterOp::Contains),
            "icontains" => Some(FilterOp::IContains),
            "gt" => Some(FilterOp::Gt),
            "gte" => Some(FilterOp::Gte),
            "lt" => Some(FilterOp::Lt),
            "lte" => Some(FilterOp::Lte),
            "in" => Some(FilterOp::In),
            _ => None,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Ne => "ne",
            FilterOp::Contains => "contains",
            FilterOp::IContains => "icontains",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
            FilterOp::In => "in",
        }
    }

    pub fn supports(&self, field_type: FieldType) -> bool {
        match self {
            FilterOp::Eq | FilterOp::Ne => true,
            FilterOp::Contains | FilterOp::IContains => field_type == FieldType::Text,
            FilterOp::Gt | FilterOp::Gte | FilterOp::Lt | FilterOp::Lte => matches!(
                field_type,
                FieldType::Integer | FieldType::Real | FieldType::Date
            ),
            FilterOp::In => field_type != FieldType::Boolean,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_field_round_trips_through_its_name() {
        for field in Field::ALL {
            assert_eq!(Field::from_name(field.name()), Some(*field));
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!(Field::from_name("genre"), Some(Field::Category));
        assert_eq!(Field::from_name("artist_name"), Some(Field::Artist));
        assert_eq!(Field::from_name("collection_name"), Some(Field::Collection));
        assert_eq!(Field::from_name("foo"), None);
        assert_eq!(Field::from_name("Name"), None);
    }

    #[test]
    fn test_operator_compatibility() {
        assert!(FilterOp::Contains.supports(FieldType::Text));
        assert!(!FilterOp::Contains.supports(FieldType::Date));
        assert!(FilterOp::Gte.supports(FieldType::Date));
        assert!(FilterOp::Lt.supports(FieldType::Real));
        assert!(!FilterOp::Gt.supports(FieldType::Text));
        assert!(!FilterOp::Gt.supports(FieldType::Boolean));
        assert!(FilterOp::Eq.supports(FieldType::Boolean));
        assert!(!FilterOp::In.supports(FieldType::Boolean));
        assert!(FilterOp::In.supports(FieldType::Text));
    }

    #[test]
    fn test_not_is_an_alias_of_ne() {
        assert_eq!(FilterOp::from_suffix("not"), Some(FilterOp::Ne));
        assert_eq!(FilterOp::from_suffix("ne"), Some(FilterOp::Ne));
        assert_eq!(FilterOp::from_suffix("like"), None);
    }
}

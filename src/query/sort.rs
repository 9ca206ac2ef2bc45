use super::error::QueryError;
use super::fields::Field;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// One key of a composite ordering; earlier keys take precedence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SortKey {
    pub field: Field,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: Field) -> Self {
        SortKey {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: Field) -> Self {
        SortKey {
            field,
            direction: SortDirection::Desc,
        }
    }

    /// Parse a field name, descending when prefixed with `-`.
    pub fn parse(key: &str) -> Result<SortKey, QueryError> {
        let trimmed = key.trim();
        let (name, direction) = match trimmed.strip_prefix('-') {
            Some(name) => (name, SortDirection::Desc),
            None => (
                trimmed.strip_prefix('+').unwrap_or(trimmed),
                SortDirection::Asc,
            ),
        };
        if name.is_empty() {
            return Err(QueryError::sort(key, "empty sort field"));
        }
        let field = Field::from_name(name)
            .ok_or_else(|| QueryError::sort(key, format!("unknown field '{}'", name)))?;
        Ok(SortKey { field, direction })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_direction_prefix() {
        assert_eq!(SortKey::parse("artist").unwrap(), SortKey::asc(Field::Artist));
        assert_eq!(SortKey::parse("+name").unwrap(), SortKey::asc(Field::Name));
        assert_eq!(
            SortKey::parse("-release_date").unwrap(),
            SortKey::desc(Field::ReleaseDate)
        );
        assert_eq!(SortKey::parse(" -genre ").unwrap(), SortKey::desc(Field::Category));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = SortKey::parse("-popularity").unwrap_err();
        assert!(matches!(err, QueryError::InvalidSort { .. }));
        assert_eq!(err.param(), Some("-popularity"));
    }

    #[test]
    fn test_empty_field_is_rejected() {
        assert!(matches!(
            SortKey::parse(""),
            Err(QueryError::InvalidSort { .. })
        ));
        assert!(matches!(
            SortKey::parse("-"),
            Err(QueryError::InvalidSort { .. })
        ));
    }
}

//! Parsing and validation of `field[__op]=value` filters.

use super::error::QueryError;
use super::fields::{Field, FieldType, FilterOp};
use chrono::NaiveDate;

const OP_SEPARATOR: &str = "__";

#[derive(Clone, Debug, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Real(f64),
    Date(NaiveDate),
    Boolean(bool),
    List(Vec<FilterValue>),
}

/// A validated predicate on one album field.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    pub field: Field,
    pub op: FilterOp,
    pub value: FilterValue,
}

impl Filter {
    /// Parse a request filter such as `release_date__gte=2020-01-01`.
    ///
    /// A key without an operator suffix means equality. The value is
    /// converted to the field's type; `in` takes a comma-separated list.
    pub fn parse(key: &str, value: &str) -> Result<Filter, QueryError> {
        let (field_name, op) = match key.rsplit_once(OP_SEPARATOR) {
            Some((field_name, suffix)) => {
                let op = FilterOp::from_suffix(suffix).ok_or_else(|| {
                    QueryError::filter(key, format!("unknown operator '{}'", suffix))
                })?;
                (field_name, op)
            }
            None => (key, FilterOp::Eq),
        };

        let field = Field::from_name(field_name)
            .ok_or_else(|| QueryError::filter(key, format!("unknown field '{}'", field_name)))?;

        let field_type = field.field_type();
        if !op.supports(field_type) {
            return Err(QueryError::filter(
                key,
                format!(
                    "operator '{}' is not supported by {:?} field '{}'",
                    op.suffix(),
                    field_type,
                    field.name()
                ),
            ));
        }

        let value = if op == FilterOp::In {
            let items = value
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| parse_value(key, field_type, item))
                .collect::<Result<Vec<_>, _>>()?;
            if items.is_empty() {
                return Err(QueryError::filter(key, "'in' requires at least one value"));
            }
            FilterValue::List(items)
        } else {
            parse_value(key, field_type, value)?
        };

        Ok(Filter { field, op, value })
    }
}

fn parse_value(key: &str, field_type: FieldType, raw: &str) -> Result<FilterValue, QueryError> {
    let invalid = |expected: &str| {
        QueryError::filter(key, format!("'{}' is not a valid {}", raw, expected))
    };
    match field_type {
        FieldType::Text => Ok(FilterValue::Text(raw.to_string())),
        FieldType::Integer => raw
            .trim()
            .parse::<i64>()
            .map(FilterValue::Integer)
            .map_err(|_| invalid("integer")),
        FieldType::Real => match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(FilterValue::Real(v)),
            _ => Err(invalid("number")),
        },
        FieldType::Date => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(FilterValue::Date)
            .map_err(|_| invalid("date (YYYY-MM-DD)")),
        FieldType::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(FilterValue::Boolean(true)),
            "false" | "0" => Ok(FilterValue::Boolean(false)),
            _ => Err(invalid("boolean")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_without_suffix_is_equality() {
        let filter = Filter::parse("genre", "Pop").unwrap();
        assert_eq!(filter.field, Field::Category);
        assert_eq!(filter.op, FilterOp::Eq);
        assert_eq!(filter.value, FilterValue::Text("Pop".to_string()));
    }

    #[test]
    fn test_date_comparison() {
        let filter = Filter::parse("release_date__gte", "2020-01-01").unwrap();
        assert_eq!(filter.field, Field::ReleaseDate);
        assert_eq!(filter.op, FilterOp::Gte);
        assert_eq!(
            filter.value,
            FilterValue::Date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())
        );
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = Filter::parse("foo__eq", "x").unwrap_err();
        assert!(matches!(err, QueryError::InvalidFilter { .. }));
        assert_eq!(err.param(), Some("foo__eq"));
    }

    #[test]
    fn test_unknown_operator_is_rejected() {
        let err = Filter::parse("name__regex", "x").unwrap_err();
        assert!(matches!(err, QueryError::InvalidFilter { .. }));
        assert!(err.to_string().contains("unknown operator"));
    }

    #[test]
    fn test_incompatible_operator_is_rejected() {
        assert!(matches!(
            Filter::parse("artist__gt", "M"),
            Err(QueryError::InvalidFilter { .. })
        ));
        assert!(matches!(
            Filter::parse("release_date__contains", "2020"),
            Err(QueryError::InvalidFilter { .. })
        ));
        assert!(matches!(
            Filter::parse("is_top__in", "true"),
            Err(QueryError::InvalidFilter { .. })
        ));
    }

    #[test]
    fn test_values_are_type_checked() {
        assert!(Filter::parse("rank__lt", "ten").is_err());
        assert!(Filter::parse("price__lt", "NaN").is_err());
        assert!(Filter::parse("release_date", "2020/01/01").is_err());
        assert!(Filter::parse("is_top", "yes").is_err());

        let filter = Filter::parse("price__lt", "12.00").unwrap();
        assert_eq!(filter.value, FilterValue::Real(12.0));
        let filter = Filter::parse("is_top", "FALSE").unwrap();
        assert_eq!(filter.value, FilterValue::Boolean(false));
    }

    #[test]
    fn test_in_list() {
        let filter = Filter::parse("rank__in", "1, 2,3").unwrap();
        assert_eq!(
            filter.value,
            FilterValue::List(vec![
                FilterValue::Integer(1),
                FilterValue::Integer(2),
                FilterValue::Integer(3),
            ])
        );

        let filter = Filter::parse("category__in", "Pop,Rock").unwrap();
        assert_eq!(
            filter.value,
            FilterValue::List(vec![
                FilterValue::Text("Pop".to_string()),
                FilterValue::Text("Rock".to_string()),
            ])
        );

        assert!(Filter::parse("rank__in", " , ").is_err());
        assert!(Filter::parse("rank__in", "1,x").is_err());
    }

    #[test]
    fn test_text_values_are_kept_verbatim() {
        let filter = Filter::parse("artist__not", " Various Artists").unwrap();
        assert_eq!(filter.op, FilterOp::Ne);
        assert_eq!(
            filter.value,
            FilterValue::Text(" Various Artists".to_string())
        );
    }
}

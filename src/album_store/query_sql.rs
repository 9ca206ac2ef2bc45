//! Translation of validated filters and sort keys into SQL fragments.

use super::store::UNICODE_LOWER;
use crate::query::{Field, Filter, FilterOp, FilterValue, SortKey};
use rusqlite::types::Value;

const CATEGORY_MATCH: &str = "SELECT 1 FROM album_categories ac
     JOIN categories c ON c.rowid = ac.category_rowid
     WHERE ac.album_rowid = a.rowid AND ";

const PRIMARY_CATEGORY: &str = "(SELECT c.name FROM album_categories ac
     JOIN categories c ON c.rowid = ac.category_rowid
     WHERE ac.album_rowid = a.rowid ORDER BY ac.position LIMIT 1)";

/// Column expression of a plain (non-category) field on the `a` alias.
fn column(field: Field) -> &'static str {
    match field {
        Field::Id => "a.id",
        Field::Name => "a.name",
        Field::Artist => "a.artist_name",
        Field::Collection => "a.collection_name",
        Field::Rights => "a.rights",
        Field::ReleaseDate => "a.release_date",
        Field::Rank => "a.rank",
        Field::TrackCount => "a.track_count",
        Field::Price => "a.price",
        Field::IsTop => "a.is_top",
        Field::Category => PRIMARY_CATEGORY,
    }
}

fn to_sql_value(value: &FilterValue) -> Value {
    match value {
        FilterValue::Text(s) => Value::Text(s.clone()),
        FilterValue::Integer(i) => Value::Integer(*i),
        FilterValue::Real(r) => Value::Real(*r),
        FilterValue::Date(d) => Value::Text(d.format("%Y-%m-%d").to_string()),
        FilterValue::Boolean(b) => Value::Integer(i64::from(*b)),
        // Lists only appear under `in`, which flattens them itself
        FilterValue::List(_) => Value::Null,
    }
}

/// Comparison of `expr` against bound parameters, pushing them to `params`.
fn comparison(expr: &str, filter: &Filter, params: &mut Vec<Value>) -> String {
    match (&filter.op, &filter.value) {
        (FilterOp::In, FilterValue::List(items)) => {
            params.extend(items.iter().map(to_sql_value));
            let placeholders = vec!["?"; items.len()].join(", ");
            format!("{} IN ({})", expr, placeholders)
        }
        (op, value) => {
            params.push(to_sql_value(value));
            match op {
                FilterOp::Eq | FilterOp::In => format!("{} = ?", expr),
                FilterOp::Ne => format!("{} IS NOT ?", expr),
                FilterOp::Contains => format!("instr({}, ?) > 0", expr),
                FilterOp::IContains => format!(
                    "instr({lower}({}), {lower}(?)) > 0",
                    expr,
                    lower = UNICODE_LOWER
                ),
                FilterOp::Gt => format!("{} > ?", expr),
                FilterOp::Gte => format!("{} >= ?", expr),
                FilterOp::Lt => format!("{} < ?", expr),
                FilterOp::Lte => format!("{} <= ?", expr),
            }
        }
    }
}

fn predicate(filter: &Filter, params: &mut Vec<Value>) -> String {
    if filter.field != Field::Category {
        return comparison(column(filter.field), filter, params);
    }
    // Category filters test the album's whole category set: `ne` excludes
    // albums carrying the category, everything else asks for any match.
    match filter.op {
        FilterOp::Ne => {
            let eq = Filter {
                op: FilterOp::Eq,
                ..filter.clone()
            };
            format!(
                "NOT EXISTS ({}{})",
                CATEGORY_MATCH,
                comparison("c.name", &eq, params)
            )
        }
        _ => format!(
            "EXISTS ({}{})",
            CATEGORY_MATCH,
            comparison("c.name", filter, params)
        ),
    }
}

/// `WHERE` clause (empty when unfiltered) and its parameters.
pub(super) fn where_clause(filters: &[Filter]) -> (String, Vec<Value>) {
    if filters.is_empty() {
        return (String::new(), Vec::new());
    }
    let mut params = Vec::new();
    let predicates: Vec<String> = filters
        .iter()
        .map(|filter| predicate(filter, &mut params))
        .collect();
    (format!(" WHERE {}", predicates.join(" AND ")), params)
}

/// `ORDER BY` clause; rank then id always close it so equal rows keep a
/// stable order across pages.
pub(super) fn order_by_clause(sort: &[SortKey]) -> String {
    let mut keys: Vec<String> = sort
        .iter()
        .map(|key| format!("{} {}", column(key.field), key.direction.as_sql()))
        .collect();
    keys.push("a.rank ASC".to_string());
    keys.push("a.id ASC".to_string());
    format!(" ORDER BY {}", keys.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_where_clause_and_params() {
        let filters = vec![
            Filter::parse("genre", "Pop").unwrap(),
            Filter::parse("release_date__gte", "2020-01-01").unwrap(),
            Filter::parse("rank__in", "1,2").unwrap(),
        ];
        let (sql, params) = where_clause(&filters);

        assert!(sql.starts_with(" WHERE EXISTS ("));
        assert!(sql.contains("c.name = ?"));
        assert!(sql.contains("a.release_date >= ?"));
        assert!(sql.contains("a.rank IN (?, ?)"));
        assert_eq!(
            params,
            vec![
                Value::Text("Pop".to_string()),
                Value::Text("2020-01-01".to_string()),
                Value::Integer(1),
                Value::Integer(2),
            ]
        );
    }

    #[test]
    fn test_negated_category_uses_not_exists() {
        let (sql, params) = where_clause(&[Filter::parse("category__not", "Rock").unwrap()]);
        assert!(sql.contains("NOT EXISTS ("));
        assert!(sql.contains("c.name = ?"));
        assert_eq!(params, vec![Value::Text("Rock".to_string())]);
    }

    #[test]
    fn test_unfiltered_query_has_no_where() {
        let (sql, params) = where_clause(&[]);
        assert!(sql.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn test_order_by_appends_tie_breakers() {
        let sql = order_by_clause(&[
            SortKey::parse("artist").unwrap(),
            SortKey::parse("-name").unwrap(),
        ]);
        assert_eq!(
            sql,
            " ORDER BY a.artist_name ASC, a.name DESC, a.rank ASC, a.id ASC"
        );
    }
}

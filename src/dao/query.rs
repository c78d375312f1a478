//! Backend-neutral description of table queries.

use std::cmp::Ordering;

use serde_json::{Map, Value};

/// A row as exchanged with the backend.
pub type Row = Map<String, Value>;

/// Tables known to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// Playing fields.
    Fields,
    /// Scheduled matches.
    Matches,
    /// Player registrations to matches.
    Enrollments,
    /// Recorded game results.
    Games,
    /// Player profiles.
    Profiles,
}

impl Table {
    /// Every table, in a stable order.
    pub const ALL: [Table; 5] = [
        Table::Fields,
        Table::Matches,
        Table::Enrollments,
        Table::Games,
        Table::Profiles,
    ];

    /// Backend name of the table.
    pub fn name(self) -> &'static str {
        match self {
            Table::Fields => "fields",
            Table::Matches => "matches",
            Table::Enrollments => "enrollments",
            Table::Games => "games",
            Table::Profiles => "profiles",
        }
    }
}

/// Comparison applied by a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Equal (`null` matches missing or null columns).
    Eq,
    /// Not equal.
    Neq,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Contained in the given array.
    In,
}

/// A single column predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Column the predicate applies to.
    pub column: String,
    /// Comparison operator.
    pub op: FilterOp,
    /// Operand; an array for [`FilterOp::In`].
    pub value: Value,
}

impl Filter {
    fn new(column: &str, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            column: column.to_owned(),
            op,
            value: value.into(),
        }
    }

    /// `column = value`
    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Self::new(column, FilterOp::Eq, value)
    }

    /// `column <> value`
    pub fn neq(column: &str, value: impl Into<Value>) -> Self {
        Self::new(column, FilterOp::Neq, value)
    }

    /// `column > value`
    pub fn gt(column: &str, value: impl Into<Value>) -> Self {
        Self::new(column, FilterOp::Gt, value)
    }

    /// `column >= value`
    pub fn gte(column: &str, value: impl Into<Value>) -> Self {
        Self::new(column, FilterOp::Gte, value)
    }

    /// `column < value`
    pub fn lt(column: &str, value: impl Into<Value>) -> Self {
        Self::new(column, FilterOp::Lt, value)
    }

    /// `column <= value`
    pub fn lte(column: &str, value: impl Into<Value>) -> Self {
        Self::new(column, FilterOp::Lte, value)
    }

    /// `column in (values...)`
    pub fn is_in<I, V>(column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect::<Vec<Value>>();
        Self::new(column, FilterOp::In, Value::Array(values))
    }

    /// Evaluate the predicate against an in-memory row.
    pub fn matches(&self, row: &Row) -> bool {
        let actual = row.get(&self.column).unwrap_or(&Value::Null);
        match self.op {
            FilterOp::Eq => values_equal(actual, &self.value),
            FilterOp::Neq => !values_equal(actual, &self.value),
            FilterOp::Gt => compare_values(actual, &self.value) == Some(Ordering::Greater),
            FilterOp::Gte => matches!(
                compare_values(actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Lt => compare_values(actual, &self.value) == Some(Ordering::Less),
            FilterOp::Lte => matches!(
                compare_values(actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOp::In => self
                .value
                .as_array()
                .is_some_and(|values| values.iter().any(|v| values_equal(actual, v))),
        }
    }
}

/// Ordering on one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Column to order on.
    pub column: String,
    /// Ascending when true.
    pub ascending: bool,
}

/// Select query against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Target table.
    pub table: Table,
    /// Predicates, all of which must hold.
    pub filters: Vec<Filter>,
    /// Ordering columns, most significant first.
    pub order: Vec<Order>,
    /// Maximum number of rows returned.
    pub limit: Option<usize>,
}

impl Query {
    /// Select every row of `table`.
    pub fn from(table: Table) -> Self {
        Self {
            table,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    /// Add a predicate.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Order ascending on `column` after any previous ordering.
    pub fn order_asc(mut self, column: &str) -> Self {
        self.order.push(Order {
            column: column.to_owned(),
            ascending: true,
        });
        self
    }

    /// Order descending on `column` after any previous ordering.
    pub fn order_desc(mut self, column: &str) -> Self {
        self.order.push(Order {
            column: column.to_owned(),
            ascending: false,
        });
        self
    }

    /// Cap the number of returned rows.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `row` satisfies every filter.
    pub fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|filter| filter.matches(row))
    }

    /// Apply ordering and limit to rows that already passed the filters.
    pub fn arrange(&self, mut rows: Vec<Row>) -> Vec<Row> {
        rows.sort_by(|a, b| {
            self.order.iter().fold(Ordering::Equal, |acc, order| {
                acc.then_with(|| {
                    let left = a.get(&order.column).unwrap_or(&Value::Null);
                    let right = b.get(&order.column).unwrap_or(&Value::Null);
                    let ord = compare_values(left, right).unwrap_or(Ordering::Equal);
                    if order.ascending { ord } else { ord.reverse() }
                })
            })
        });
        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }
        rows
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(_), Value::Number(_)) => compare_values(left, right) == Some(Ordering::Equal),
        _ => left == right,
    }
}

/// Compare two scalar JSON values. Numbers compare numerically, strings lexically (which
/// orders RFC 3339 timestamps chronologically), `null` sorts first.
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Null, _) => Some(Ordering::Less),
        (_, Value::Null) => Some(Ordering::Greater),
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
                Some(a.cmp(&b))
            } else {
                a.as_f64()?.partial_cmp(&b.as_f64()?)
            }
        }
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test rows are objects"),
        }
    }

    #[test]
    fn filters_evaluate_against_rows() {
        let r = row(json!({"id": "a", "score": 3, "paid": true, "team": null}));

        assert!(Filter::eq("id", "a").matches(&r));
        assert!(Filter::neq("id", "b").matches(&r));
        assert!(Filter::gt("score", 2).matches(&r));
        assert!(Filter::gte("score", 3.0).matches(&r));
        assert!(!Filter::lt("score", 3).matches(&r));
        assert!(Filter::lte("score", 3).matches(&r));
        assert!(Filter::eq("paid", true).matches(&r));
        assert!(Filter::eq("team", Value::Null).matches(&r));
        assert!(Filter::eq("missing", Value::Null).matches(&r));
        assert!(Filter::is_in("id", ["x", "a"]).matches(&r));
        assert!(!Filter::is_in("id", Vec::<String>::new()).matches(&r));
    }

    #[test]
    fn arrange_orders_by_several_columns_then_limits() {
        let query = Query::from(Table::Games)
            .order_asc("match")
            .order_desc("created_at")
            .limit(3);
        let rows = vec![
            row(json!({"match": 2, "created_at": "2026-01-01T10:00:00Z"})),
            row(json!({"match": 1, "created_at": "2026-01-01T09:00:00Z"})),
            row(json!({"match": 1, "created_at": "2026-01-01T11:00:00Z"})),
            row(json!({"match": 3, "created_at": "2026-01-01T08:00:00Z"})),
        ];

        let arranged = query.arrange(rows);
        let keys: Vec<_> = arranged
            .iter()
            .map(|r| (r["match"].as_i64().unwrap(), r["created_at"].as_str().unwrap()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (1, "2026-01-01T11:00:00Z"),
                (1, "2026-01-01T09:00:00Z"),
                (2, "2026-01-01T10:00:00Z"),
            ]
        );
    }
}

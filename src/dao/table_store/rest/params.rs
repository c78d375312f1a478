//! Translation of [`Query`] values into PostgREST query-string parameters.

use serde_json::Value;

use crate::dao::query::{Filter, FilterOp, Order, Query};

fn literal(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn list_item(value: &Value) -> String {
    match value {
        Value::String(text) => format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\"")),
        other => literal(other),
    }
}

/// `column=op.value` pair for one filter.
pub fn filter_param(filter: &Filter) -> (String, String) {
    let value = match (filter.op, &filter.value) {
        (FilterOp::Eq, Value::Null) => "is.null".to_owned(),
        (FilterOp::Neq, Value::Null) => "not.is.null".to_owned(),
        (FilterOp::Eq, value) => format!("eq.{}", literal(value)),
        (FilterOp::Neq, value) => format!("neq.{}", literal(value)),
        (FilterOp::Gt, value) => format!("gt.{}", literal(value)),
        (FilterOp::Gte, value) => format!("gte.{}", literal(value)),
        (FilterOp::Lt, value) => format!("lt.{}", literal(value)),
        (FilterOp::Lte, value) => format!("lte.{}", literal(value)),
        (FilterOp::In, value) => {
            let items = value
                .as_array()
                .map(|values| values.iter().map(list_item).collect::<Vec<_>>().join(","))
                .unwrap_or_default();
            format!("in.({items})")
        }
    };
    (filter.column.clone(), value)
}

/// Parameters for a set of filters.
pub fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters.iter().map(filter_param).collect()
}

fn order_param(order: &[Order]) -> Option<(String, String)> {
    if order.is_empty() {
        return None;
    }
    let columns = order
        .iter()
        .map(|order| {
            let direction = if order.ascending { "asc" } else { "desc" };
            format!("{}.{direction}", order.column)
        })
        .collect::<Vec<_>>()
        .join(",");
    Some(("order".to_owned(), columns))
}

/// Full parameter list of a select request.
pub fn select_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_owned(), "*".to_owned())];
    params.extend(filter_params(&query.filters));
    params.extend(order_param(&query.order));
    if let Some(limit) = query.limit {
        params.push(("limit".to_owned(), limit.to_string()));
    }
    params
}

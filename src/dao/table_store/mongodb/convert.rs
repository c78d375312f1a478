//! Conversions between JSON rows and BSON documents.

use mongodb::bson::{Bson, Document, doc};
use serde_json::{Number, Value};

use crate::dao::query::{Filter, FilterOp, Order, Row};

const MONGO_ID: &str = "_id";

pub fn value_to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(flag) => Bson::Boolean(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(int) => Bson::Int64(int),
            None => Bson::Double(number.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(text) => Bson::String(text.clone()),
        Value::Array(items) => Bson::Array(items.iter().map(value_to_bson).collect()),
        Value::Object(map) => Bson::Document(row_to_document(map)),
    }
}

pub fn bson_to_value(value: Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(flag) => Value::Bool(flag),
        Bson::Int32(int) => Value::from(int),
        Bson::Int64(int) => Value::from(int),
        Bson::Double(float) => Number::from_f64(float).map_or(Value::Null, Value::Number),
        Bson::String(text) => Value::String(text),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_value).collect()),
        Bson::Document(document) => Value::Object(document_to_row(document)),
        other => Value::String(other.to_string()),
    }
}

pub fn row_to_document(row: &Row) -> Document {
    row.iter()
        .map(|(key, value)| (key.clone(), value_to_bson(value)))
        .collect()
}

/// Convert a stored document back into a row, dropping Mongo's own `_id`.
pub fn document_to_row(document: Document) -> Row {
    document
        .into_iter()
        .filter(|(key, _)| key != MONGO_ID)
        .map(|(key, value)| (key, bson_to_value(value)))
        .collect()
}

fn filter_clause(filter: &Filter) -> Document {
    let operator = match filter.op {
        FilterOp::Eq => "$eq",
        FilterOp::Neq => "$ne",
        FilterOp::Gt => "$gt",
        FilterOp::Gte => "$gte",
        FilterOp::Lt => "$lt",
        FilterOp::Lte => "$lte",
        FilterOp::In => "$in",
    };
    let mut condition = Document::new();
    condition.insert(operator, value_to_bson(&filter.value));
    let mut clause = Document::new();
    clause.insert(filter.column.clone(), condition);
    clause
}

/// Filter document requiring every filter to hold.
pub fn filters_to_document(filters: &[Filter]) -> Document {
    match filters {
        [] => Document::new(),
        [single] => filter_clause(single),
        many => doc! { "$and": many.iter().map(filter_clause).collect::<Vec<_>>() },
    }
}

pub fn sort_document(order: &[Order]) -> Document {
    order
        .iter()
        .map(|order| {
            let direction = if order.ascending { 1 } else { -1 };
            (order.column.clone(), Bson::Int32(direction))
        })
        .collect()
}

//! Field access and ordering over untyped records.
//!
//! Sorting is always a stable ascending sort on a single key. Descending
//! order is the full reversal of that result, so records with equal keys
//! come out in reverse of their original order.

use serde_json::Value;
use std::cmp::Ordering;

use crate::models::{Record, SortOrder};

/// String value of `key`, or `""` when missing or not a string.
pub fn field_str<'a>(record: &'a Record, key: &str) -> &'a str {
    record.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

/// Renders a scalar the way a user would type it: strings without quotes,
/// numbers in their JSON form, null as empty.
pub fn plain_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Whether the string form of `record[key]` equals `expected`.
pub fn field_equals_str(record: &Record, key: &str, expected: &str) -> bool {
    record
        .get(key)
        .map(|v| plain_string(v) == expected)
        .unwrap_or(false)
}

/// A filter value that is present and not empty.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Case-insensitive equality between `record[key]` (as a string) and `expected`.
pub fn field_eq_ignore_case(record: &Record, key: &str, expected: &str) -> bool {
    field_str(record, key).to_lowercase() == expected.to_lowercase()
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values: numbers numerically, strings
/// lexicographically, booleans false-first, otherwise by kind.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

/// Sorts by an arbitrary key, stable ascending then reversed for `Desc`.
pub fn sort_records_by<K, F>(records: &mut [Record], key: F, order: SortOrder)
where
    F: Fn(&Record) -> K,
    K: Ord,
{
    records.sort_by(|a, b| key(a).cmp(&key(b)));
    if order == SortOrder::Desc {
        records.reverse();
    }
}

/// Sorts by the value of `field`. Records missing the field sort as `""`.
pub fn sort_by_field(records: &mut [Record], field: &str, order: SortOrder) {
    let empty = Value::String(String::new());
    records.sort_by(|a, b| {
        let va = a.get(field).unwrap_or(&empty);
        let vb = b.get(field).unwrap_or(&empty);
        compare_values(va, vb)
    });
    if order == SortOrder::Desc {
        records.reverse();
    }
}

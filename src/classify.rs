//! Heuristic classification of result-set shape.
//!
//! Only the first record is inspected. A record with both a date-like and
//! a value-like field is a time series; otherwise narrow records (three
//! fields or fewer) are key-value and anything wider is tabular.

use crate::models::{DataType, Record};

const DATE_KEYS: [&str; 4] = ["date", "timestamp", "created_at", "time"];
const METRIC_KEYS: [&str; 4] = ["value", "count", "metric", "amount"];
const KEY_VALUE_MAX_FIELDS: usize = 3;

pub fn identify_data_type(records: &[Record]) -> DataType {
    let Some(sample) = records.first() else {
        return DataType::Empty;
    };

    let has_date = DATE_KEYS.iter().any(|k| sample.contains_key(*k));
    let has_metric = METRIC_KEYS.iter().any(|k| sample.contains_key(*k));

    if has_date && has_metric {
        DataType::TimeSeries
    } else if sample.len() <= KEY_VALUE_MAX_FIELDS {
        DataType::KeyValue
    } else {
        DataType::Tabular
    }
}

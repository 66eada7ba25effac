//! Analytics connector: daily metric time series.
//!
//! Reads `analytics.json`, whose records carry `metric`, `date`
//! (`YYYY-MM-DD`) and `value`. Date bounds compare as plain strings, which
//! is correct for zero-padded ISO dates.

use serde::{Deserialize, Serialize};

use crate::models::{DataType, Record, SortSpec};
use crate::params::{ParamSpec, SORT_ORDER};
use crate::records::{field_eq_ignore_case, field_str, non_empty, sort_by_field};
use crate::store::RecordStore;
use crate::traits::Connector;

const DEFAULT_SORT_FIELD: &str = "date";

/// Filters accepted by [`AnalyticsConnector`]. All optional, AND-combined.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsFilters {
    #[serde(default)]
    pub metric: Option<String>,
    /// Inclusive lower bound on `date`.
    #[serde(default)]
    pub date_from: Option<String>,
    /// Inclusive upper bound on `date`.
    #[serde(default)]
    pub date_to: Option<String>,
}

pub struct AnalyticsConnector {
    store: RecordStore,
}

impl AnalyticsConnector {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }
}

impl Connector for AnalyticsConnector {
    type Filters = AnalyticsFilters;

    const BLOB: &'static str = "analytics.json";

    const PARAMETERS: &'static [ParamSpec] = &[
        ParamSpec::string("metric", "Filter by metric name"),
        ParamSpec::string("date_from", "Start date (YYYY-MM-DD)"),
        ParamSpec::string("date_to", "End date (YYYY-MM-DD)"),
        ParamSpec::string("sort_by", "Sort field").with_default(DEFAULT_SORT_FIELD),
        SORT_ORDER,
    ];

    fn name(&self) -> &str {
        "analytics"
    }

    fn description(&self) -> &str {
        "Retrieve analytics time-series data with optional filters."
    }

    fn data_type(&self) -> DataType {
        DataType::TimeSeries
    }

    fn store(&self) -> &RecordStore {
        &self.store
    }

    fn fetch(&self, filters: &AnalyticsFilters, sort: &SortSpec) -> Vec<Record> {
        let mut records = self.store.load(Self::BLOB);

        if let Some(metric) = non_empty(&filters.metric) {
            records.retain(|r| field_eq_ignore_case(r, "metric", metric));
        }

        if let Some(from) = non_empty(&filters.date_from) {
            records.retain(|r| field_str(r, "date") >= from);
        }

        if let Some(to) = non_empty(&filters.date_to) {
            records.retain(|r| field_str(r, "date") <= to);
        }

        let field = sort.sort_by.as_deref().unwrap_or(DEFAULT_SORT_FIELD);
        sort_by_field(&mut records, field, sort.sort_order);

        tracing::info!(source = "analytics", results = records.len(), ?filters, "fetch");
        records
    }
}

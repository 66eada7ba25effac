//! CRM connector: customer accounts.
//!
//! Reads `customers.json`, whose records carry `customer_id`, `name`,
//! `email`, `created_at` and `status`. Newest accounts come first by default.

use serde::{Deserialize, Serialize};

use crate::models::{DataType, Record, SortSpec};
use crate::params::{ParamSpec, SORT_ORDER};
use crate::records::{field_eq_ignore_case, field_equals_str, field_str, non_empty, sort_by_field};
use crate::store::RecordStore;
use crate::traits::Connector;

const DEFAULT_SORT_FIELD: &str = "created_at";

/// Filters accepted by [`CrmConnector`]. All optional, AND-combined.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrmFilters {
    /// Case-insensitive exact match on `status`.
    #[serde(default)]
    pub status: Option<String>,
    /// Compared against the string form of `customer_id`.
    #[serde(default)]
    pub customer_id: Option<i64>,
    /// Case-insensitive substring of `name` or `email`.
    #[serde(default)]
    pub search: Option<String>,
}

pub struct CrmConnector {
    store: RecordStore,
}

impl CrmConnector {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }
}

fn matches_search(record: &Record, term: &str) -> bool {
    let term = term.to_lowercase();
    field_str(record, "name").to_lowercase().contains(&term)
        || field_str(record, "email").to_lowercase().contains(&term)
}

impl Connector for CrmConnector {
    type Filters = CrmFilters;

    const BLOB: &'static str = "customers.json";

    const PARAMETERS: &'static [ParamSpec] = &[
        ParamSpec::string("status", "Filter by status").one_of(&["active", "inactive"]),
        ParamSpec::integer("customer_id", "Filter by customer ID"),
        ParamSpec::string("search", "Search name or email"),
        ParamSpec::string("sort_by", "Sort field").with_default(DEFAULT_SORT_FIELD),
        SORT_ORDER,
    ];

    fn name(&self) -> &str {
        "crm"
    }

    fn description(&self) -> &str {
        "Retrieve CRM customer data with optional filters."
    }

    fn data_type(&self) -> DataType {
        DataType::Tabular
    }

    fn store(&self) -> &RecordStore {
        &self.store
    }

    fn fetch(&self, filters: &CrmFilters, sort: &SortSpec) -> Vec<Record> {
        let mut records = self.store.load(Self::BLOB);

        if let Some(status) = non_empty(&filters.status) {
            records.retain(|r| field_eq_ignore_case(r, "status", status));
        }

        if let Some(cid) = filters.customer_id {
            let cid = cid.to_string();
            records.retain(|r| field_equals_str(r, "customer_id", &cid));
        }

        if let Some(term) = non_empty(&filters.search) {
            records.retain(|r| matches_search(r, term));
        }

        let field = sort.sort_by.as_deref().unwrap_or(DEFAULT_SORT_FIELD);
        sort_by_field(&mut records, field, sort.sort_order);

        tracing::info!(source = "crm", results = records.len(), ?filters, "fetch");
        records
    }
}

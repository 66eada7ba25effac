//! Support connector: tickets.
//!
//! Reads `support_tickets.json`, whose records carry `ticket_id`,
//! `customer_id`, `subject`, `priority`, `created_at` and `status`.
//!
//! # Priority ordering
//!
//! Sorting on `priority` uses urgency rank rather than the string value:
//! `high` = 0, `medium` = 1, `low` = 2, anything else (or missing) = 99.
//! The default `desc` direction means "most urgent first", which is
//! ascending rank. `asc` is the full reversal of that.

use serde::{Deserialize, Serialize};

use crate::models::{DataType, Record, SortOrder, SortSpec};
use crate::params::{ParamSpec, SORT_ORDER};
use crate::records::{
    field_eq_ignore_case, field_equals_str, field_str, non_empty, sort_by_field, sort_records_by,
};
use crate::store::RecordStore;
use crate::traits::Connector;

const DEFAULT_SORT_FIELD: &str = "priority";
const UNRANKED: u8 = 99;

/// Filters accepted by [`SupportConnector`]. All optional, AND-combined.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupportFilters {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub customer_id: Option<i64>,
}

pub struct SupportConnector {
    store: RecordStore,
}

impl SupportConnector {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }
}

/// Urgency rank of a ticket; lower is more urgent.
pub fn priority_rank(record: &Record) -> u8 {
    match field_str(record, "priority").to_lowercase().as_str() {
        "high" => 0,
        "medium" => 1,
        "low" => 2,
        _ => UNRANKED,
    }
}

impl Connector for SupportConnector {
    type Filters = SupportFilters;

    const BLOB: &'static str = "support_tickets.json";

    const PARAMETERS: &'static [ParamSpec] = &[
        ParamSpec::string("status", "Filter by status").one_of(&["open", "closed"]),
        ParamSpec::string("priority", "Filter by priority").one_of(&["high", "medium", "low"]),
        ParamSpec::integer("customer_id", "Filter by customer ID"),
        ParamSpec::string("sort_by", "Sort field").with_default(DEFAULT_SORT_FIELD),
        SORT_ORDER,
    ];

    fn name(&self) -> &str {
        "support"
    }

    fn description(&self) -> &str {
        "Retrieve support tickets with optional filters."
    }

    fn data_type(&self) -> DataType {
        DataType::Tabular
    }

    fn store(&self) -> &RecordStore {
        &self.store
    }

    fn fetch(&self, filters: &SupportFilters, sort: &SortSpec) -> Vec<Record> {
        let mut records = self.store.load(Self::BLOB);

        if let Some(status) = non_empty(&filters.status) {
            records.retain(|r| field_eq_ignore_case(r, "status", status));
        }

        if let Some(priority) = non_empty(&filters.priority) {
            records.retain(|r| field_eq_ignore_case(r, "priority", priority));
        }

        if let Some(cid) = filters.customer_id {
            let cid = cid.to_string();
            records.retain(|r| field_equals_str(r, "customer_id", &cid));
        }

        let field = sort.sort_by.as_deref().unwrap_or(DEFAULT_SORT_FIELD);
        if field == "priority" {
            let by_rank = match sort.sort_order {
                SortOrder::Desc => SortOrder::Asc,
                SortOrder::Asc => SortOrder::Desc,
            };
            sort_records_by(&mut records, priority_rank, by_rank);
        } else {
            sort_by_field(&mut records, field, sort.sort_order);
        }

        tracing::info!(source = "support", results = records.len(), ?filters, "fetch");
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryBlobStore;
    use std::sync::Arc;

    const TICKETS: &str = r#"[
        {"ticket_id": 1, "customer_id": 5, "subject": "Cannot log in", "priority": "low", "created_at": "2026-02-01T10:00:00", "status": "open"},
        {"ticket_id": 2, "customer_id": 7, "subject": "Billing discrepancy", "priority": "high", "created_at": "2026-02-02T10:00:00", "status": "closed"},
        {"ticket_id": 3, "customer_id": 5, "subject": "Dark mode", "priority": "medium", "created_at": "2026-02-03T10:00:00", "status": "open"},
        {"ticket_id": 4, "customer_id": 9, "subject": "API rate limit", "priority": "High", "created_at": "2026-02-04T10:00:00", "status": "open"},
        {"ticket_id": 5, "customer_id": 7, "subject": "Export failed", "priority": "urgent", "created_at": "2026-02-05T10:00:00", "status": "OPEN"},
        {"ticket_id": 6, "customer_id": 5, "subject": "Slow pages", "priority": "high", "created_at": "2026-02-06T10:00:00", "status": "open"}
    ]"#;

    fn connector() -> SupportConnector {
        let blobs = InMemoryBlobStore::new().with_blob("support_tickets.json", TICKETS);
        SupportConnector::new(RecordStore::new(Arc::new(blobs)))
    }

    fn ids(records: &[Record]) -> Vec<i64> {
        records
            .iter()
            .map(|r| r["ticket_id"].as_i64().unwrap())
            .collect()
    }

    #[test]
    fn test_default_sort_puts_high_priority_first() {
        let records = connector().fetch(&SupportFilters::default(), &SortSpec::default());
        // high (stable: 2, 4, 6), medium, low, then unranked.
        assert_eq!(ids(&records), vec![2, 4, 6, 3, 1, 5]);
        let ranks: Vec<u8> = records.iter().map(priority_rank).collect();
        assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_priority_asc_is_reversal_of_desc() {
        let asc = SortSpec {
            sort_by: Some("priority".into()),
            sort_order: SortOrder::Asc,
        };
        let mut desc = ids(&connector().fetch(&SupportFilters::default(), &SortSpec::default()));
        desc.reverse();
        assert_eq!(ids(&connector().fetch(&SupportFilters::default(), &asc)), desc);
    }

    #[test]
    fn test_combined_status_and_priority() {
        let filters = SupportFilters {
            status: Some("open".into()),
            priority: Some("high".into()),
            ..Default::default()
        };
        let records = connector().fetch(&filters, &SortSpec::default());
        assert_eq!(ids(&records), vec![4, 6]);
        for r in &records {
            assert_eq!(field_str(r, "status").to_lowercase(), "open");
            assert_eq!(field_str(r, "priority").to_lowercase(), "high");
        }
    }

    #[test]
    fn test_filter_customer_id() {
        let filters = SupportFilters {
            customer_id: Some(5),
            ..Default::default()
        };
        let records = connector().fetch(&filters, &SortSpec::default());
        assert_eq!(ids(&records), vec![6, 3, 1]);
        assert!(records.iter().all(|r| r["customer_id"] == 5));
    }

    #[test]
    fn test_sort_by_other_field() {
        let sort = SortSpec {
            sort_by: Some("created_at".into()),
            sort_order: SortOrder::Desc,
        };
        let records = connector().fetch(&SupportFilters::default(), &sort);
        assert_eq!(ids(&records), vec![6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_priority_rank_values() {
        let rec = |p: &str| {
            serde_json::json!({ "priority": p })
                .as_object()
                .unwrap()
                .clone()
        };
        assert_eq!(priority_rank(&rec("high")), 0);
        assert_eq!(priority_rank(&rec("Medium")), 1);
        assert_eq!(priority_rank(&rec("low")), 2);
        assert_eq!(priority_rank(&rec("whenever")), 99);
        assert_eq!(priority_rank(&Record::new()), 99);
    }
}

//! Query orchestration.
//!
//! [`DataService`] runs the full read path shared by the HTTP server and the
//! CLI:
//!
//! ```text
//! source + params ─▶ connector fetch ─▶ classify ─▶ paginate ─▶ narrate ─▶ envelope
//! ```
//!
//! The service is immutable once built and is shared across requests
//! behind an `Arc`.

use chrono::Utc;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::classify::identify_data_type;
use crate::config::Config;
use crate::models::{DataResponse, DataSourceInfo, Metadata};
use crate::params::FunctionSchema;
use crate::rules::PaginationEngine;
use crate::store::RecordStore;
use crate::traits::SourceRegistry;
use crate::voice::VoiceOptimizer;

/// Largest page size a caller may request. The configured maximum still
/// applies on top of this.
pub const PAGE_SIZE_LIMIT: usize = 100;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Unknown source '{name}'. Available: {}", available.join(", "))]
    UnknownSource {
        name: String,
        available: Vec<String>,
    },

    #[error("{0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Pagination and voice options for one query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
    #[serde(default)]
    pub voice_mode: Option<bool>,
}

impl PageRequest {
    /// Rejects a zero page and page sizes outside `1..=100`.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.page == Some(0) {
            return Err(QueryError::InvalidParams(
                "page must be greater than or equal to 1".to_string(),
            ));
        }
        if let Some(size) = self.page_size {
            if !(1..=PAGE_SIZE_LIMIT).contains(&size) {
                return Err(QueryError::InvalidParams(format!(
                    "page_size must be between 1 and {}",
                    PAGE_SIZE_LIMIT
                )));
            }
        }
        Ok(())
    }
}

/// Splits a tool-call body into filter parameters and page options.
pub fn split_call_params(body: &Value) -> Result<(Value, PageRequest), QueryError> {
    let Value::Object(map) = body else {
        if body.is_null() {
            return Ok((Value::Object(Map::new()), PageRequest::default()));
        }
        return Err(QueryError::InvalidParams(
            "request body must be a JSON object".to_string(),
        ));
    };

    let mut params = map.clone();
    let mut page_fields = Map::new();
    for key in ["page", "page_size", "voice_mode"] {
        if let Some(v) = params.remove(key) {
            page_fields.insert(key.to_string(), v);
        }
    }

    let page: PageRequest = serde_json::from_value(Value::Object(page_fields))
        .map_err(|e| QueryError::InvalidParams(e.to_string()))?;

    Ok((Value::Object(params), page))
}

pub struct DataService {
    registry: SourceRegistry,
    rules: PaginationEngine,
    voice: VoiceOptimizer,
    default_voice_mode: bool,
}

impl DataService {
    pub fn new(registry: SourceRegistry, rules: PaginationEngine, default_voice_mode: bool) -> Self {
        Self {
            registry,
            rules,
            voice: VoiceOptimizer::new(),
            default_voice_mode,
        }
    }

    /// Service over the built-in sources in the configured data directory.
    pub fn from_config(config: &Config) -> Self {
        let store = RecordStore::from_dir(config.data.dir.clone());
        Self::new(
            SourceRegistry::with_builtins(store),
            PaginationEngine::from_config(&config.limits),
            config.voice.default_mode,
        )
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn function_schemas(&self) -> Vec<FunctionSchema> {
        self.registry.function_schemas()
    }

    fn unknown_source(&self, name: &str) -> QueryError {
        QueryError::UnknownSource {
            name: name.to_string(),
            available: self
                .registry
                .names()
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    /// Query a source by function name (`query_<source>`).
    pub fn call_function(
        &self,
        function: &str,
        params: &Value,
        page: &PageRequest,
    ) -> Result<DataResponse, QueryError> {
        let source = self
            .registry
            .find_function(function)
            .ok_or_else(|| self.unknown_source(function))?;
        let name = source.name().to_string();
        self.query(&name, params, page)
    }

    /// Query `source_name` with raw filter/sort parameters.
    ///
    /// Parameters the source does not declare are dropped.
    pub fn query(
        &self,
        source_name: &str,
        params: &Value,
        page: &PageRequest,
    ) -> Result<DataResponse, QueryError> {
        let source = self
            .registry
            .find(source_name)
            .ok_or_else(|| self.unknown_source(source_name))?;
        page.validate()?;

        let result = source
            .query(params)
            .map_err(|e| QueryError::InvalidParams(format!("{:#}", e)))?;

        let total = result.records.len();
        let data_type = identify_data_type(&result.records);
        let voice_mode = page.voice_mode.unwrap_or(self.default_voice_mode);

        let paged = self
            .rules
            .apply(&result.records, page.page, page.page_size, voice_mode);
        let returned = paged.items.len();

        let voice_context = voice_mode.then(|| {
            self.voice
                .build_voice_context(&paged.items, source.name(), total, returned)
        });

        let metadata = Metadata {
            total_results: total,
            returned_results: returned,
            data_type,
            data_freshness: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            source: DataSourceInfo {
                name: source.name().to_string(),
                description: source.description().to_string(),
                record_count: total,
            },
            pagination: paged.pagination,
            voice_context,
            filters_applied: result.filters_applied,
            message: paged.message,
        };

        Ok(DataResponse {
            success: true,
            data: paged.items,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DataType;
    use crate::store::InMemoryBlobStore;
    use serde_json::json;
    use std::sync::Arc;

    fn service() -> DataService {
        let customers: Vec<Value> = (1..=12)
            .map(|i| {
                json!({
                    "customer_id": i,
                    "name": format!("Customer {}", i),
                    "email": format!("c{}@example.com", i),
                    "created_at": format!("2026-01-{:02}T09:00:00", i),
                    "status": if i % 3 == 0 { "inactive" } else { "active" }
                })
            })
            .collect();
        let blobs = InMemoryBlobStore::new()
            .with_blob("customers.json", serde_json::to_string(&customers).unwrap())
            .with_blob("support_tickets.json", "[]")
            .with_blob("analytics.json", "oops");
        let registry = SourceRegistry::with_builtins(RecordStore::new(Arc::new(blobs)));
        DataService::new(registry, PaginationEngine::new(10, 10), true)
    }

    #[test]
    fn test_query_envelope() {
        let resp = service()
            .query("crm", &json!({"status": "active"}), &PageRequest::default())
            .unwrap();
        assert!(resp.success);
        assert_eq!(resp.metadata.total_results, 8);
        assert_eq!(resp.metadata.returned_results, 8);
        assert_eq!(resp.metadata.data_type, DataType::Tabular);
        assert_eq!(resp.metadata.source.name, "crm");
        assert_eq!(resp.metadata.filters_applied["status"], "active");
        assert!(!resp.metadata.filters_applied.contains_key("sort_by"));
        let voice = resp.metadata.voice_context.unwrap();
        assert!(voice.summary.contains("8 active"));
        assert!(voice.summary.contains("0 inactive"));
        assert!(resp.data.iter().all(|r| r["status"] == "active"));
    }

    #[test]
    fn test_pagination_and_voice_off() {
        let page = PageRequest {
            page: Some(1),
            page_size: Some(3),
            voice_mode: Some(false),
        };
        let resp = service().query("crm", &json!({}), &page).unwrap();
        assert_eq!(resp.data.len(), 3);
        assert!(resp.metadata.pagination.has_next);
        assert_eq!(resp.metadata.pagination.total_pages, 4);
        assert!(resp.metadata.voice_context.is_none());
        assert_eq!(resp.metadata.message, "Showing 3 of 12 results (page 1/4).");
    }

    #[test]
    fn test_empty_and_malformed_sources_degrade() {
        let svc = service();
        for name in ["support", "analytics"] {
            let resp = svc.query(name, &json!({}), &PageRequest::default()).unwrap();
            assert_eq!(resp.metadata.total_results, 0);
            assert_eq!(resp.metadata.data_type, DataType::Empty);
            assert_eq!(resp.metadata.pagination.total_pages, 1);
            let voice = resp.metadata.voice_context.expect("voice context on empty results");
            assert_eq!(voice.summary, format!("No {} records found.", name));
        }
    }

    #[test]
    fn test_unknown_source() {
        let err = service()
            .query("invalid_source", &json!({}), &PageRequest::default())
            .unwrap_err();
        assert!(matches!(err, QueryError::UnknownSource { .. }));
        assert_eq!(
            err.to_string(),
            "Unknown source 'invalid_source'. Available: crm, support, analytics"
        );
    }

    #[test]
    fn test_invalid_page_params() {
        let svc = service();
        let zero = PageRequest {
            page: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            svc.query("crm", &json!({}), &zero),
            Err(QueryError::InvalidParams(_))
        ));
        let huge = PageRequest {
            page_size: Some(101),
            ..Default::default()
        };
        assert!(matches!(
            svc.query("crm", &json!({}), &huge),
            Err(QueryError::InvalidParams(_))
        ));
        assert!(matches!(
            svc.query("crm", &json!({"status": "sleeping"}), &PageRequest::default()),
            Err(QueryError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_call_function_with_page_fields_in_body() {
        let svc = service();
        let body = json!({"status": "inactive", "page_size": 2, "voice_mode": false});
        let (params, page) = split_call_params(&body).unwrap();
        let resp = svc.call_function("query_crm", &params, &page).unwrap();
        assert_eq!(resp.metadata.total_results, 4);
        assert_eq!(resp.data.len(), 2);
        assert!(resp.metadata.voice_context.is_none());

        assert!(matches!(
            svc.call_function("query_billing", &json!({}), &PageRequest::default()),
            Err(QueryError::UnknownSource { .. })
        ));
    }

    #[test]
    fn test_split_call_params_rejects_bad_types() {
        assert!(split_call_params(&json!({"page": "two"})).is_err());
        assert!(split_call_params(&json!([1])).is_err());
        let (params, page) = split_call_params(&Value::Null).unwrap();
        assert_eq!(params, json!({}));
        assert!(page.page.is_none());
    }

    #[test]
    fn test_idempotent_queries() {
        let svc = service();
        let params = json!({"search": "customer 1"});
        let a = svc.query("crm", &params, &PageRequest::default()).unwrap();
        let b = svc.query("crm", &params, &PageRequest::default()).unwrap();
        assert_eq!(a.data, b.data);
        assert_eq!(a.metadata.pagination, b.metadata.pagination);
    }
}

//! Connector traits and the source registry.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │             SourceRegistry               │
//! │  ┌─────────┐ ┌─────────┐ ┌────────────┐  │
//! │  │   crm   │ │ support │ │ analytics  │  │
//! │  └─────────┘ └─────────┘ └────────────┘  │
//! └──────────────┬───────────────────────────┘
//!                ▼
//!       DataService::query() → response envelope
//! ```
//!
//! A [`Connector`] is written against its own strongly-typed filter struct
//! and a declarative parameter list. Every connector is automatically a
//! [`Source`], the object-safe view the registry and request boundary work
//! with: it validates raw JSON parameters against the declared list,
//! deserializes them into the typed filters, and fetches.
//!
//! # Example
//!
//! ```rust
//! use data_connector::models::{Record, SortSpec};
//! use data_connector::params::{ParamSpec, SORT_ORDER};
//! use data_connector::store::RecordStore;
//! use data_connector::traits::Connector;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! pub struct InventoryFilters {
//!     pub sku: Option<String>,
//! }
//!
//! pub struct InventoryConnector {
//!     store: RecordStore,
//! }
//!
//! impl Connector for InventoryConnector {
//!     type Filters = InventoryFilters;
//!
//!     const BLOB: &'static str = "inventory.json";
//!     const PARAMETERS: &'static [ParamSpec] = &[
//!         ParamSpec::string("sku", "Filter by SKU"),
//!         SORT_ORDER,
//!     ];
//!
//!     fn name(&self) -> &str { "inventory" }
//!     fn description(&self) -> &str { "Retrieve inventory levels." }
//!     fn store(&self) -> &RecordStore { &self.store }
//!
//!     fn fetch(&self, filters: &InventoryFilters, _sort: &SortSpec) -> Vec<Record> {
//!         let records = self.store.load(Self::BLOB);
//!         match &filters.sku {
//!             Some(sku) => records
//!                 .into_iter()
//!                 .filter(|r| r.get("sku").and_then(|v| v.as_str()) == Some(sku.as_str()))
//!                 .collect(),
//!             None => records,
//!         }
//!     }
//! }
//! ```

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::connector_analytics::AnalyticsConnector;
use crate::connector_crm::CrmConnector;
use crate::connector_support::SupportConnector;
use crate::models::{DataType, Record, SortSpec};
use crate::params::{parameters_schema, validate_params, FunctionSchema, ParamSpec};
use crate::store::RecordStore;

/// Parameter keys that control ordering rather than filtering.
const SORT_KEYS: [&str; 2] = ["sort_by", "sort_order"];

// ═══════════════════════════════════════════════════════════════════════
// Connector Trait
// ═══════════════════════════════════════════════════════════════════════

/// A read-only data source with source-specific filtering and sorting.
///
/// Implementations trust the filters they are given: validation against
/// [`PARAMETERS`](Connector::PARAMETERS) happens at the boundary, in the
/// blanket [`Source`] implementation.
pub trait Connector: Send + Sync {
    /// Typed filter set. Missing keys deserialize to `None`.
    type Filters: DeserializeOwned + Serialize + Default + std::fmt::Debug;

    /// Name of the backing blob in the record store.
    const BLOB: &'static str;

    /// Accepted parameters, including `sort_by` and `sort_order`.
    const PARAMETERS: &'static [ParamSpec];

    /// Wire name of the source (e.g. `"crm"`).
    fn name(&self) -> &str;

    /// One-line description, reused as the function description.
    fn description(&self) -> &str;

    /// Shape the connector declares for its data.
    fn data_type(&self) -> DataType {
        DataType::Unknown
    }

    fn store(&self) -> &RecordStore;

    /// Load, filter and sort the full record set. Filters are AND-combined
    /// and applied before sorting.
    fn fetch(&self, filters: &Self::Filters, sort: &SortSpec) -> Vec<Record>;
}

// ═══════════════════════════════════════════════════════════════════════
// Source Trait
// ═══════════════════════════════════════════════════════════════════════

/// Records returned by [`Source::query`] plus the filters that produced them.
#[derive(Debug, Clone)]
pub struct SourceResult {
    pub records: Vec<Record>,
    /// Validated parameters minus sort keys, echoed in response metadata.
    pub filters_applied: Map<String, Value>,
}

/// Object-safe view of a connector, used by the registry and boundaries.
pub trait Source: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn data_type(&self) -> DataType;

    /// Declared parameters, including the sort keys.
    fn parameters(&self) -> &'static [ParamSpec];

    /// `query_<name>` function-calling schema.
    fn function_schema(&self) -> FunctionSchema;

    /// Validate raw parameters and fetch.
    ///
    /// Fails only on parameter validation errors.
    fn query(&self, params: &Value) -> Result<SourceResult>;

    /// Number of records with no filters applied.
    fn record_count(&self) -> usize;

    /// Whether the backing blob exists.
    fn is_available(&self) -> bool;
}

impl<C: Connector> Source for C {
    fn name(&self) -> &str {
        Connector::name(self)
    }

    fn description(&self) -> &str {
        Connector::description(self)
    }

    fn data_type(&self) -> DataType {
        Connector::data_type(self)
    }

    fn parameters(&self) -> &'static [ParamSpec] {
        C::PARAMETERS
    }

    fn function_schema(&self) -> FunctionSchema {
        FunctionSchema {
            name: format!("query_{}", Connector::name(self)),
            description: Connector::description(self).to_string(),
            parameters: parameters_schema(C::PARAMETERS),
        }
    }

    fn query(&self, params: &Value) -> Result<SourceResult> {
        let validated = validate_params(C::PARAMETERS, params)?;

        let sort_params: Map<String, Value> = validated
            .iter()
            .filter(|(k, _)| SORT_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let sort: SortSpec = serde_json::from_value(Value::Object(sort_params))
            .context("invalid sort parameters")?;

        let mut filters_applied = validated;
        for key in SORT_KEYS {
            filters_applied.remove(key);
        }
        let filters: C::Filters = serde_json::from_value(Value::Object(filters_applied.clone()))
            .context("invalid filter parameters")?;

        let records = self.fetch(&filters, &sort);

        Ok(SourceResult {
            records,
            filters_applied,
        })
    }

    fn record_count(&self) -> usize {
        self.fetch(&C::Filters::default(), &SortSpec::default()).len()
    }

    fn is_available(&self) -> bool {
        self.store().is_available(C::BLOB)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════

/// Explicit name → source mapping, built once at startup.
///
/// # Example
///
/// ```rust
/// use data_connector::store::RecordStore;
/// use data_connector::traits::SourceRegistry;
///
/// let registry = SourceRegistry::with_builtins(RecordStore::from_dir("./data"));
/// assert_eq!(registry.names(), vec!["crm", "support", "analytics"]);
/// ```
pub struct SourceRegistry {
    sources: Vec<Box<dyn Source>>,
}

impl SourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Registry with the crm, support and analytics connectors over `store`.
    pub fn with_builtins(store: RecordStore) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(CrmConnector::new(store.clone())));
        registry.register(Box::new(SupportConnector::new(store.clone())));
        registry.register(Box::new(AnalyticsConnector::new(store)));
        registry
    }

    /// Register a source. Lookups return the first source with a given name.
    pub fn register(&mut self, source: Box<dyn Source>) {
        self.sources.push(source);
    }

    pub fn sources(&self) -> &[Box<dyn Source>] {
        &self.sources
    }

    /// Find a source by wire name.
    pub fn find(&self, name: &str) -> Option<&dyn Source> {
        self.sources
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.as_ref())
    }

    /// Find a source by its function name (`query_<name>`).
    pub fn find_function(&self, function: &str) -> Option<&dyn Source> {
        function
            .strip_prefix("query_")
            .and_then(|name| self.find(name))
    }

    /// Source names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Function-calling schemas for every source.
    pub fn function_schemas(&self) -> Vec<FunctionSchema> {
        self.sources.iter().map(|s| s.function_schema()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

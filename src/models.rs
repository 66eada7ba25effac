//! Core data models used throughout the connector.
//!
//! Records are untyped: each source's schema varies and the core never
//! needs more than field lookup. Everything else here is the response
//! envelope built fresh for each query.

use serde::{Deserialize, Serialize};

/// One record loaded from a backing blob. Field order is preserved.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Heuristic shape of a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Tabular,
    TimeSeries,
    KeyValue,
    Empty,
    /// Only ever declared by a connector, never produced by classification.
    Unknown,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Tabular => "tabular",
            DataType::TimeSeries => "time_series",
            DataType::KeyValue => "key_value",
            DataType::Empty => "empty",
            DataType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Sort field plus direction. A `None` field means the connector's default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: SortOrder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    /// 1-based, clamped into `[1, total_pages]`.
    pub current_page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceContext {
    /// One-line spoken summary.
    pub summary: String,
    pub freshness: String,
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceInfo {
    pub name: String,
    pub description: String,
    pub record_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub total_results: usize,
    pub returned_results: usize,
    pub data_type: DataType,
    pub data_freshness: String,
    pub source: DataSourceInfo,
    pub pagination: PaginationInfo,
    pub voice_context: Option<VoiceContext>,
    pub filters_applied: serde_json::Map<String, serde_json::Value>,
    /// Count message from the pagination engine ("Showing all 3 results.").
    pub message: String,
}

/// Response envelope returned by every query boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse {
    pub success: bool,
    pub data: Vec<Record>,
    pub metadata: Metadata,
}

//! Read-only record storage.
//!
//! The [`BlobStore`] trait is the raw backend: named blobs of text, read
//! wholesale. [`RecordStore`] sits on top and turns a blob into an ordered
//! sequence of records. It never fails: a missing or malformed blob is
//! logged and yields an empty sequence, which every downstream stage treats
//! as an ordinary "no results" case.
//!
//! Nothing is cached. Each [`RecordStore::load`] re-reads the blob.

pub mod memory;

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use crate::models::Record;

pub use memory::InMemoryBlobStore;

/// A read-only key-value store of named text blobs.
///
/// Implementations must be `Send + Sync`; a single instance is shared by
/// every connector and every request.
pub trait BlobStore: Send + Sync {
    /// Read the blob named `name`. Returns `Ok(None)` if it does not exist.
    fn read(&self, name: &str) -> Result<Option<String>>;

    /// Whether a blob named `name` exists.
    fn exists(&self, name: &str) -> bool;

    /// Human-readable location of `name`, for diagnostics.
    fn locate(&self, name: &str) -> String {
        name.to_string()
    }
}

/// Blob store backed by files in a single directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl BlobStore for FsBlobStore {
    fn read(&self, name: &str) -> Result<Option<String>> {
        let path = self.root.join(name);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    fn exists(&self, name: &str) -> bool {
        self.root.join(name).is_file()
    }

    fn locate(&self, name: &str) -> String {
        self.root.join(name).display().to_string()
    }
}

/// Loads record sets from a [`BlobStore`].
#[derive(Clone)]
pub struct RecordStore {
    blobs: Arc<dyn BlobStore>,
}

impl RecordStore {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self { blobs }
    }

    /// Record store over a data directory on disk.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FsBlobStore::new(dir)))
    }

    /// Load every record in `name`, in blob order.
    ///
    /// The blob must hold a JSON array of objects. Non-object elements are
    /// skipped with a warning; anything else degrades to an empty sequence.
    pub fn load(&self, name: &str) -> Vec<Record> {
        let content = match self.blobs.read(name) {
            Ok(Some(content)) => content,
            Ok(None) => {
                tracing::error!(blob = %self.blobs.locate(name), "data file not found");
                return Vec::new();
            }
            Err(e) => {
                tracing::error!(blob = %self.blobs.locate(name), error = %e, "failed to read data file");
                return Vec::new();
            }
        };

        let values: Vec<serde_json::Value> = match serde_json::from_str(&content) {
            Ok(values) => values,
            Err(e) => {
                tracing::error!(blob = %self.blobs.locate(name), error = %e, "invalid JSON in data file");
                return Vec::new();
            }
        };

        let total = values.len();
        let records: Vec<Record> = values
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();

        if records.len() < total {
            tracing::warn!(
                blob = name,
                skipped = total - records.len(),
                "skipped non-object entries"
            );
        }
        tracing::debug!(blob = name, records = records.len(), "loaded records");

        records
    }

    /// Whether the backing blob for `name` exists at all.
    pub fn is_available(&self, name: &str) -> bool {
        self.blobs.exists(name)
    }
}

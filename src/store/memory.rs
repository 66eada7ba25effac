//! In-memory [`BlobStore`] implementation for tests and embedding.
//!
//! Uses a `HashMap` behind `std::sync::RwLock` so blobs can be swapped
//! while connectors hold a shared reference.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;

use super::BlobStore;

/// In-memory blob store.
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, String>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Builder-style insert.
    pub fn with_blob(self, name: &str, content: impl Into<String>) -> Self {
        self.insert(name, content);
        self
    }

    /// Insert or replace a blob.
    pub fn insert(&self, name: &str, content: impl Into<String>) {
        let mut blobs = self.blobs.write().unwrap_or_else(|e| e.into_inner());
        blobs.insert(name.to_string(), content.into());
    }

    /// Remove a blob, returning its previous content.
    pub fn remove(&self, name: &str) -> Option<String> {
        let mut blobs = self.blobs.write().unwrap_or_else(|e| e.into_inner());
        blobs.remove(name)
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn read(&self, name: &str) -> Result<Option<String>> {
        let blobs = self.blobs.read().unwrap_or_else(|e| e.into_inner());
        Ok(blobs.get(name).cloned())
    }

    fn exists(&self, name: &str) -> bool {
        let blobs = self.blobs.read().unwrap_or_else(|e| e.into_inner());
        blobs.contains_key(name)
    }

    fn locate(&self, name: &str) -> String {
        format!("memory:{}", name)
    }
}

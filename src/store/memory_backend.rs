//! In-Memory Document Store Backend
//!
//! Keeps collections in process memory. Used for local runs without a
//! database and as the test double for the HTTP layer.

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::traits::{Document, DocumentStore, Filter, StoreResult, ID_FIELD};

/// In-memory document store
///
/// Records are kept per collection in insertion order; identifiers use the
/// same ObjectId format as the real store.
pub struct MemoryStore {
    database_name: String,
    collections: RwLock<BTreeMap<String, Vec<Document>>>,
}

impl MemoryStore {
    /// Create an empty in-memory store
    pub fn new(database_name: &str) -> Self {
        Self {
            database_name: database_name.to_string(),
            collections: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of records in a collection
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("memory")
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_type(&self) -> &'static str {
        "memory"
    }

    fn database_name(&self) -> &str {
        &self.database_name
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn insert(&self, collection: &str, mut document: Document) -> StoreResult<String> {
        let id = ObjectId::new().to_hex();
        document.insert(ID_FIELD.to_string(), Value::String(id.clone()));

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(document);

        Ok(id)
    }

    async fn query(
        &self,
        collection: &str,
        filter: &Filter,
        limit: usize,
    ) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let Some(records) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        Ok(records
            .iter()
            .filter(|doc| filter.matches(doc))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn list_collections(&self) -> StoreResult<Vec<String>> {
        Ok(self.collections.read().await.keys().cloned().collect())
    }
}

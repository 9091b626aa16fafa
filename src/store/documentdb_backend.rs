//! DocumentDB/MongoDB Store Backend
//!
//! Production backend for the coaching collections. Records cross this
//! boundary as JSON maps; BSON is confined to this file.
//!
//! ```rust,no_run
//! use coachnotes::store::DocumentDbStore;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let store = DocumentDbStore::new("mongodb://localhost:27017", "coaching").await?;
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{self, doc, Bson, Document as BsonDocument},
    options::{ClientOptions, FindOptions},
    Client, Collection, Database,
};
use serde_json::Value;
use tracing::debug;

use super::traits::{
    Condition, Document, DocumentStore, Filter, StoreError, StoreResult, ID_FIELD,
};

/// DocumentDB/MongoDB store backend
pub struct DocumentDbStore {
    database: Database,
    database_name: String,
}

impl DocumentDbStore {
    /// Create a new DocumentDB store backend
    ///
    /// The driver connects lazily, so an unreachable server surfaces on the
    /// first operation rather than here.
    ///
    /// # Arguments
    /// * `connection_string` - MongoDB/DocumentDB connection string
    /// * `database` - Database name
    pub async fn new(connection_string: &str, database: &str) -> StoreResult<Self> {
        let client_options = ClientOptions::parse(connection_string)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let client = Client::with_options(client_options)
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self {
            database: client.database(database),
            database_name: database.to_string(),
        })
    }

    fn collection(&self, name: &str) -> Collection<BsonDocument> {
        self.database.collection::<BsonDocument>(name)
    }
}

/// Translate an equality/membership filter into a BSON query document.
pub(crate) fn filter_to_bson(filter: &Filter) -> StoreResult<BsonDocument> {
    let mut query = BsonDocument::new();
    for (field, condition) in filter.conditions() {
        let clause = match condition {
            Condition::Eq(value) => to_bson(value)?,
            Condition::In(values) => {
                let set = values.iter().map(to_bson).collect::<StoreResult<Vec<_>>>()?;
                Bson::Document(doc! { "$in": set })
            }
        };
        query.insert(field, clause);
    }
    Ok(query)
}

fn to_bson(value: &Value) -> StoreResult<Bson> {
    bson::to_bson(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Convert a stored BSON record into a JSON record with a string `_id`.
pub(crate) fn record_from_bson(mut raw: BsonDocument) -> StoreResult<Document> {
    let id = match raw.remove(ID_FIELD) {
        Some(Bson::ObjectId(oid)) => Some(oid.to_hex()),
        Some(Bson::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
        None => None,
    };

    let mut record = match Bson::Document(raw).into_relaxed_extjson() {
        Value::Object(map) => map,
        _ => {
            return Err(StoreError::Serialization(
                "stored record is not a document".to_string(),
            ))
        }
    };

    if let Some(id) = id {
        record.insert(ID_FIELD.to_string(), Value::String(id));
    }
    Ok(record)
}

#[async_trait]
impl DocumentStore for DocumentDbStore {
    fn backend_type(&self) -> &'static str {
        "documentdb"
    }

    fn database_name(&self) -> &str {
        &self.database_name
    }

    async fn is_available(&self) -> bool {
        self.database.run_command(doc! { "ping": 1 }).await.is_ok()
    }

    async fn insert(&self, collection: &str, document: Document) -> StoreResult<String> {
        let raw =
            bson::to_document(&document).map_err(|e| StoreError::Serialization(e.to_string()))?;

        let result = self
            .collection(collection)
            .insert_one(raw)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let id = match result.inserted_id {
            Bson::ObjectId(oid) => oid.to_hex(),
            Bson::String(s) => s,
            other => other.to_string(),
        };
        debug!(collection, id = %id, "inserted record");
        Ok(id)
    }

    async fn query(
        &self,
        collection: &str,
        filter: &Filter,
        limit: usize,
    ) -> StoreResult<Vec<Document>> {
        let query = filter_to_bson(filter)?;
        let find_options = FindOptions::builder()
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .build();

        let mut cursor = self
            .collection(collection)
            .find(query)
            .with_options(find_options)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut records = Vec::new();
        while let Some(raw) = cursor
            .try_next()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
        {
            if records.len() >= limit {
                break;
            }
            records.push(record_from_bson(raw)?);
        }

        Ok(records)
    }

    async fn list_collections(&self) -> StoreResult<Vec<String>> {
        self.database
            .list_collection_names()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;
    use serde_json::json;

    #[test]
    fn test_filter_to_bson() {
        let filter = Filter::new()
            .equals("athlete_id", "65a1f0c2b3d4e5f601234567")
            .is_in("tags", ["sprinter"]);
        let query = filter_to_bson(&filter).unwrap();

        assert_eq!(
            query.get_str("athlete_id").unwrap(),
            "65a1f0c2b3d4e5f601234567"
        );
        let tags = query.get_document("tags").unwrap();
        let set = tags.get_array("$in").unwrap();
        assert_eq!(set, &vec![Bson::String("sprinter".to_string())]);
    }

    #[test]
    fn test_empty_filter_is_empty_query() {
        assert!(filter_to_bson(&Filter::new()).unwrap().is_empty());
    }

    #[test]
    fn test_record_from_bson_stringifies_object_id() {
        let oid = ObjectId::new();
        let raw = doc! {
            "_id": oid,
            "first_name": "Ana",
            "age": 21_i64,
            "tags": ["sprinter"],
            "team": Bson::Null,
        };

        let record = record_from_bson(raw).unwrap();
        assert_eq!(record.get(ID_FIELD), Some(&json!(oid.to_hex())));
        assert_eq!(record.get("first_name"), Some(&json!("Ana")));
        assert_eq!(record.get("age"), Some(&json!(21)));
        assert_eq!(record.get("tags"), Some(&json!(["sprinter"])));
        assert_eq!(record.get("team"), Some(&Value::Null));
    }

    // Tests below require a running MongoDB instance
    // Run with: cargo test -- --ignored

    #[tokio::test]
    #[ignore] // Requires MongoDB instance
    async fn test_documentdb_backend_basic() {
        let store = DocumentDbStore::new("mongodb://localhost:27017", "test_coaching")
            .await
            .expect("Failed to connect to MongoDB");

        assert!(store.is_available().await);
        assert_eq!(store.backend_type(), "documentdb");
        assert_eq!(store.database_name(), "test_coaching");
    }
}

//! Process-wide database handle.
//!
//! Opened once at startup and shared by every request. A handle without a
//! backend models the degraded "store unavailable" state: reads and writes
//! fail with [`StoreError::Unavailable`] while the status probe keeps working.

use chrono::{SecondsFormat, Utc};
use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::documentdb_backend::DocumentDbStore;
use super::memory_backend::MemoryStore;
use super::traits::{Document, DocumentStore, Filter, StoreError, StoreResult, ID_FIELD};

/// Connection string selecting the in-process store
pub const MEMORY_URL: &str = "memory://";

/// Maximum number of collection names reported by [`Database::status`].
pub const STATUS_COLLECTION_LIMIT: usize = 10;

const STATUS_ERROR_CHARS: usize = 80;

/// Check that `text` is a syntactically valid store identifier.
///
/// Only the format is checked; the referenced record may not exist.
pub fn is_valid_id(text: &str) -> bool {
    ObjectId::parse_str(text).is_ok()
}

/// Shared handle to the document store
#[derive(Clone)]
pub struct Database {
    backend: Option<Arc<dyn DocumentStore>>,
    url_configured: bool,
}

/// Store reachability as reported by the status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct StoreStatus {
    /// Server liveness marker
    pub backend: String,
    /// Store reachability summary
    pub database: String,
    /// Whether a connection string was configured
    pub database_url: Option<String>,
    /// Name of the connected database
    pub database_name: Option<String>,
    /// `Connected` or `Not Connected`
    pub connection_status: String,
    /// Up to [`STATUS_COLLECTION_LIMIT`] collection names
    pub collections: Vec<String>,
}

impl Database {
    /// Handle backed by a connected store
    pub fn connected(backend: Arc<dyn DocumentStore>, url_configured: bool) -> Self {
        Self {
            backend: Some(backend),
            url_configured,
        }
    }

    /// Handle with no store behind it
    pub fn disconnected(url_configured: bool) -> Self {
        Self {
            backend: None,
            url_configured,
        }
    }

    /// Open the store named by `url`.
    ///
    /// Never fails: a missing url or a failed connection leaves the handle
    /// disconnected so the process can still report its status.
    pub async fn open(url: Option<&str>, database_name: &str) -> Self {
        let Some(url) = url.filter(|u| !u.trim().is_empty()) else {
            warn!("DATABASE_URL not set; store unavailable");
            return Self::disconnected(false);
        };

        if url.starts_with(MEMORY_URL) {
            info!(database = database_name, "using in-memory store");
            return Self::connected(Arc::new(MemoryStore::new(database_name)), true);
        }

        match DocumentDbStore::new(url, database_name).await {
            Ok(store) => {
                info!(database = database_name, "document store configured");
                Self::connected(Arc::new(store), true)
            }
            Err(e) => {
                error!(error = %e, "document store connection failed; store unavailable");
                Self::disconnected(true)
            }
        }
    }

    /// Whether a backend is attached
    pub fn is_connected(&self) -> bool {
        self.backend.is_some()
    }

    fn backend(&self) -> StoreResult<&Arc<dyn DocumentStore>> {
        self.backend.as_ref().ok_or(StoreError::Unavailable)
    }

    /// Insert a record into `collection` and return its new identifier.
    ///
    /// Client-supplied identity is dropped and `created_at`/`updated_at`
    /// are stamped with the current UTC time.
    pub async fn insert(&self, collection: &str, mut record: Document) -> StoreResult<String> {
        let backend = self.backend()?;

        record.remove(ID_FIELD);
        record.remove("id");
        let now = Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
        record.insert("created_at".to_string(), now.clone());
        record.insert("updated_at".to_string(), now);

        let id = backend.insert(collection, record).await?;
        debug!(collection, id = %id, "record created");
        Ok(id)
    }

    /// Fetch up to `limit` records of `collection` matching `filter`.
    pub async fn query(
        &self,
        collection: &str,
        filter: &Filter,
        limit: usize,
    ) -> StoreResult<Vec<Document>> {
        let backend = self.backend()?;
        let records = backend.query(collection, filter, limit).await?;
        debug!(collection, limit, found = records.len(), "records fetched");
        Ok(records)
    }

    /// Describe store connectivity. Never fails; problems become text.
    pub async fn status(&self) -> StoreStatus {
        let mut status = StoreStatus {
            backend: "✅ Running".to_string(),
            database: "⚠️ Available but not initialized".to_string(),
            database_url: None,
            database_name: None,
            connection_status: "Not Connected".to_string(),
            collections: Vec::new(),
        };

        let Some(backend) = &self.backend else {
            return status;
        };

        status.database = "✅ Available".to_string();
        status.database_url = Some(if self.url_configured {
            "✅ Set".to_string()
        } else {
            "❌ Not Set".to_string()
        });
        status.database_name = Some(backend.database_name().to_string());
        status.connection_status = "Connected".to_string();

        match backend.list_collections().await {
            Ok(mut names) => {
                names.truncate(STATUS_COLLECTION_LIMIT);
                status.collections = names;
                status.database = "✅ Connected & Working".to_string();
            }
            Err(e) => {
                warn!(error = %e, "collection listing failed");
                status.database = format!(
                    "⚠️ Connected but Error: {}",
                    truncate_chars(&e.to_string(), STATUS_ERROR_CHARS)
                );
            }
        }

        status
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct BrokenStore;

    #[async_trait]
    impl DocumentStore for BrokenStore {
        fn backend_type(&self) -> &'static str {
            "broken"
        }

        fn database_name(&self) -> &str {
            "broken_db"
        }

        async fn is_available(&self) -> bool {
            false
        }

        async fn insert(&self, _collection: &str, _document: Document) -> StoreResult<String> {
            Err(StoreError::Backend("server selection timeout".to_string()))
        }

        async fn query(
            &self,
            _collection: &str,
            _filter: &Filter,
            _limit: usize,
        ) -> StoreResult<Vec<Document>> {
            Err(StoreError::Backend("server selection timeout".to_string()))
        }

        async fn list_collections(&self) -> StoreResult<Vec<String>> {
            Err(StoreError::Backend("x".repeat(200)))
        }
    }

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_is_valid_id() {
        assert!(is_valid_id("65a1f0c2b3d4e5f601234567"));
        assert!(is_valid_id(&ObjectId::new().to_hex()));
        assert!(!is_valid_id("not-an-id"));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("65a1f0c2b3d4e5f60123456"));
        assert!(!is_valid_id("65a1f0c2b3d4e5f60123456z"));
    }

    #[tokio::test]
    async fn test_open_without_url_is_degraded() {
        let db = Database::open(None, "coaching").await;
        assert!(!db.is_connected());
        let db = Database::open(Some("  "), "coaching").await;
        assert!(!db.is_connected());
    }

    #[tokio::test]
    async fn test_open_memory_url() {
        let db = Database::open(Some(MEMORY_URL), "coaching").await;
        assert!(db.is_connected());
        let status = db.status().await;
        assert_eq!(status.database_name.as_deref(), Some("coaching"));
        assert_eq!(status.database_url.as_deref(), Some("✅ Set"));
    }

    #[tokio::test]
    async fn test_open_malformed_url_is_degraded() {
        let db = Database::open(Some("definitely not a uri"), "coaching").await;
        assert!(!db.is_connected());
        let status = db.status().await;
        assert_eq!(status.connection_status, "Not Connected");
    }

    #[tokio::test]
    async fn test_disconnected_rejects_reads_and_writes() {
        let db = Database::disconnected(false);
        assert!(!db.is_connected());

        let err = db.insert("athlete", Document::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable));

        let err = db.query("athlete", &Filter::new(), 10).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable));
    }

    #[tokio::test]
    async fn test_insert_strips_identity_and_stamps_times() {
        let db = Database::connected(Arc::new(MemoryStore::default()), true);
        let id = db
            .insert(
                "athlete",
                doc(json!({"_id": "client", "id": "client", "first_name": "Ana"})),
            )
            .await
            .unwrap();

        let records = db.query("athlete", &Filter::new(), 10).await.unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.get(ID_FIELD), Some(&json!(id)));
        assert!(record.get("id").is_none());
        assert_eq!(record.get("first_name"), Some(&json!("Ana")));
        assert!(record.get("created_at").is_some());
        assert_eq!(record.get("created_at"), record.get("updated_at"));
    }

    #[tokio::test]
    async fn test_status_when_disconnected() {
        let status = Database::disconnected(false).status().await;
        assert_eq!(status.backend, "✅ Running");
        assert_eq!(status.database, "⚠️ Available but not initialized");
        assert_eq!(status.connection_status, "Not Connected");
        assert!(status.database_url.is_none());
        assert!(status.database_name.is_none());
        assert!(status.collections.is_empty());
    }

    #[tokio::test]
    async fn test_status_caps_collection_names() {
        let store = Arc::new(MemoryStore::new("coaching"));
        for i in 0..12 {
            store
                .insert(&format!("c{:02}", i), Document::new())
                .await
                .unwrap();
        }

        let status = Database::connected(store, true).status().await;
        assert_eq!(status.database, "✅ Connected & Working");
        assert_eq!(status.database_url.as_deref(), Some("✅ Set"));
        assert_eq!(status.database_name.as_deref(), Some("coaching"));
        assert_eq!(status.connection_status, "Connected");
        assert_eq!(status.collections.len(), STATUS_COLLECTION_LIMIT);
    }

    #[tokio::test]
    async fn test_status_reports_listing_errors_as_text() {
        let status = Database::connected(Arc::new(BrokenStore), false)
            .status()
            .await;
        assert!(status.database.starts_with("⚠️ Connected but Error: Backend error: "));
        let detail = status
            .database
            .trim_start_matches("⚠️ Connected but Error: ");
        assert_eq!(detail.chars().count(), STATUS_ERROR_CHARS);
        assert_eq!(status.database_url.as_deref(), Some("❌ Not Set"));
        assert!(status.collections.is_empty());
    }
}

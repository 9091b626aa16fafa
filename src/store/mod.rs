//! Document Store Adapter
//!
//! This module hides the document database behind a narrow async trait so the
//! request handlers never see driver types.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │      Database       │
//! │ (process-wide handle)│
//! └──────────┬──────────┘
//!            │
//! ┌──────────▼──────────┐
//! │   DocumentStore     │  <-- Trait
//! │      (async)        │
//! └──────────┬──────────┘
//!            │
//!     ┌──────┴──────┐
//!     │             │
//! ┌───▼────┐  ┌─────▼─────┐
//! │ Memory │  │ DocumentDB│
//! │ Store  │  │   Store   │
//! └────────┘  └───────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use coachnotes::store::{Database, Filter, MemoryStore};
//! use std::sync::Arc;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let db = Database::connected(Arc::new(MemoryStore::default()), false);
//!     let id = db.insert("athlete", serde_json::Map::new()).await?;
//!     let records = db.query("athlete", &Filter::new(), 50).await?;
//!     Ok(())
//! }
//! ```

mod database;
mod documentdb_backend;
mod memory_backend;
mod traits;

pub use database::{is_valid_id, Database, StoreStatus, MEMORY_URL, STATUS_COLLECTION_LIMIT};
pub use documentdb_backend::DocumentDbStore;
pub use memory_backend::MemoryStore;
pub use traits::*;

//! Sports coaching notes API.
//!
//! Stores athlete profiles, coaching notes and skill-development plans in a
//! document store and serves them over HTTP:
//!
//! - **`store`** - Document store adapter (MongoDB/DocumentDB or in-memory)
//! - **`schema`** - Declarative entity schemas and validation
//! - **`api`** - axum router, handlers and error mapping
//! - **`config`** - TOML + environment configuration
//! - **`observability`** - Structured logging setup
//!
//! # Example
//!
//! ```no_run
//! use coachnotes::api::{build_router, AppState};
//! use coachnotes::store::{Database, MEMORY_URL};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let db = Database::open(Some(MEMORY_URL), "coaching").await;
//!     let app = build_router(AppState::new(db));
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// HTTP routes and handlers
pub mod api;

/// Configuration management
pub mod config;

/// Logging setup
pub mod observability;

/// Entity schemas and validation
pub mod schema;

/// Document store adapter
pub mod store;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::api::{build_router, ApiError, AppState};
    pub use crate::config::{Configuration, ConfigurationLoader, EnvironmentLoader};
    pub use crate::schema::{Athlete, Note, SkillPlan, ValidationError};
    pub use crate::store::{Database, DocumentStore, Filter, StoreError};
}

//! HTTP API.
//!
//! Routes, shared state and error mapping. Handlers validate input against
//! the entity schemas, call the [`Database`] handle and reshape records for
//! the wire.

pub mod error;
mod handlers;
pub mod middleware;

pub use error::{ApiError, ApiResult};
pub use handlers::{DEFAULT_ATHLETE_LIMIT, DEFAULT_RECORD_LIMIT};

use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;

use crate::store::Database;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Handle to the document store
    pub db: Database,
}

impl AppState {
    /// Wrap an opened database handle
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

/// Assemble every route with CORS and request logging applied.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/test", get(handlers::status_handler))
        .route("/schema", get(handlers::schema_handler))
        .route(
            "/api/athletes",
            get(handlers::list_athletes_handler).post(handlers::create_athlete_handler),
        )
        .route(
            "/api/notes",
            get(handlers::list_notes_handler).post(handlers::create_note_handler),
        )
        .route(
            "/api/skill-plans",
            get(handlers::list_skill_plans_handler).post(handlers::create_skill_plan_handler),
        )
        .layer(from_fn(middleware::cors_middleware))
        .layer(from_fn(middleware::request_log_middleware))
        .with_state(state)
}

//! Observability utilities.
//!
//! Structured logging via `tracing`, rendered either as human-readable lines
//! or as one JSON object per event.
//!
//! # Example
//!
//! ```no_run
//! use coachnotes::config::LoggingConfig;
//! use coachnotes::observability::init_logging;
//!
//! init_logging(&LoggingConfig::default()).unwrap();
//! tracing::info!("server starting");
//! ```

pub mod logger;

// Re-export main types for convenience
pub use logger::{build_subscriber, env_filter, init_logging};

//! Configuration management for the API server.
//!
//! Settings come from an optional TOML file, overlaid by host environment
//! variables (optionally loaded from a `.env` file).
//!
//! # Example
//!
//! ```no_run
//! use coachnotes::config::{ConfigurationLoader, EnvironmentLoader};
//!
//! let env = EnvironmentLoader::new(None);
//! let mut loader = ConfigurationLoader::new(None).unwrap();
//! for rejected in loader.apply_environment(&env) {
//!     eprintln!("{rejected}");
//! }
//!
//! println!("Listening on {}", loader.config.server.bind_addr());
//! ```

pub mod config;
pub mod environment;

pub use self::config::{
    Configuration, ConfigurationLoader, DatabaseConfig, LogFormat, LoggingConfig, ServerConfig,
};
pub use self::environment::{EnvironmentLoader, RejectedSetting};

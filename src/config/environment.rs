//! Environment variable loading and management.
//!
//! Host-level settings only: where the store lives, which port to bind and
//! how loudly to log.

use std::env;
use std::fmt;
use std::path::Path;

use super::config::LogFormat;

/// Document store connection string
pub const DATABASE_URL: &str = "DATABASE_URL";
/// Database name
pub const DATABASE_NAME: &str = "DATABASE_NAME";
/// Listen port
pub const PORT: &str = "PORT";
/// Log level or filter directive
pub const LOG_LEVEL: &str = "LOG_LEVEL";
/// Log format (`pretty` or `json`)
pub const LOG_FORMAT: &str = "LOG_FORMAT";

/// A host setting that was set but could not be used.
///
/// Configuration is read before logging exists, so rejected values are
/// handed back to the caller to report once a subscriber is installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedSetting {
    /// Environment variable name
    pub name: &'static str,
    /// The raw value that was ignored
    pub value: String,
}

impl fmt::Display for RejectedSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ignoring invalid {}: {:?}", self.name, self.value)
    }
}

/// Loads environment variables from .env file and system environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentLoader;

impl EnvironmentLoader {
    /// Initialize the environment loader.
    ///
    /// # Arguments
    /// * `env_file` - Path to .env file. Only an explicit path is loaded.
    pub fn new(env_file: Option<&Path>) -> Self {
        if let Some(path) = env_file {
            if path.exists() {
                if let Err(e) = dotenv::from_path(path) {
                    eprintln!("Warning: Failed to load .env file: {}", e);
                }
            } else {
                eprintln!("Warning: .env file not found: {}", path.display());
            }
        }
        Self
    }

    /// Document store connection string
    pub fn database_url(&self) -> Option<String> {
        non_empty(DATABASE_URL)
    }

    /// Database name override
    pub fn database_name(&self) -> Option<String> {
        non_empty(DATABASE_NAME)
    }

    /// Listen port override
    pub fn port(&self) -> Result<Option<u16>, RejectedSetting> {
        parse_setting(PORT, |raw| raw.trim().parse::<u16>().ok())
    }

    /// Log level / filter directive override
    pub fn log_level(&self) -> Option<String> {
        non_empty(LOG_LEVEL)
    }

    /// Log format override
    pub fn log_format(&self) -> Result<Option<LogFormat>, RejectedSetting> {
        parse_setting(LOG_FORMAT, |raw| raw.parse().ok())
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_setting<T>(
    name: &'static str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<Option<T>, RejectedSetting> {
    let Some(raw) = non_empty(name) else {
        return Ok(None);
    };
    match parse(&raw) {
        Some(value) => Ok(Some(value)),
        None => Err(RejectedSetting { name, value: raw }),
    }
}

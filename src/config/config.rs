//! TOML configuration parsing and management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::environment::{EnvironmentLoader, RejectedSetting};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Configuration {
    /// HTTP listener
    #[serde(default)]
    pub server: ServerConfig,
    /// Document store connection
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection string. `memory://` selects the in-process store.
    pub url: Option<String>,
    /// Database holding the coaching collections
    #[serde(default = "default_database_name")]
    pub name: String,
}

fn default_database_name() -> String {
    "coaching".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            name: default_database_name(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level or `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Line format
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Loads and manages TOML configuration.
#[derive(Debug)]
pub struct ConfigurationLoader {
    /// The effective configuration
    pub config: Configuration,
}

impl ConfigurationLoader {
    /// Initialize configuration loader.
    ///
    /// # Arguments
    /// * `config_path` - Path to TOML config file. If None, uses `config/coachnotes.toml`
    ///   when present and built-in defaults otherwise.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let explicit = config_path.is_some();
        let config_path = config_path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("config/coachnotes.toml"));

        let config = if config_path.exists() {
            Self::load_config(&config_path)?
        } else if explicit {
            anyhow::bail!("Config file not found: {}", config_path.display());
        } else {
            Configuration::default()
        };

        Ok(Self { config })
    }

    /// Create a configuration loader from a pre-parsed Configuration.
    pub fn from_config(config: Configuration) -> Self {
        Self { config }
    }

    /// Load configuration from TOML file.
    fn load_config(path: &Path) -> Result<Configuration> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
    }

    /// Overlay host environment values on top of the file configuration.
    ///
    /// Values that are set but unusable keep the file setting and are
    /// returned so the caller can report them once logging is up.
    pub fn apply_environment(&mut self, env: &EnvironmentLoader) -> Vec<RejectedSetting> {
        let mut rejected = Vec::new();
        if let Some(url) = env.database_url() {
            self.config.database.url = Some(url);
        }
        if let Some(name) = env.database_name() {
            self.config.database.name = name;
        }
        match env.port() {
            Ok(Some(port)) => self.config.server.port = port,
            Ok(None) => {}
            Err(setting) => rejected.push(setting),
        }
        if let Some(level) = env.log_level() {
            self.config.logging.level = level;
        }
        match env.log_format() {
            Ok(Some(format)) => self.config.logging.format = format,
            Ok(None) => {}
            Err(setting) => rejected.push(setting),
        }
        rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Configuration::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.bind_addr(), "0.0.0.0:8000");
        assert!(config.database.url.is_none());
        assert_eq!(config.database.name, "coaching");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_config_from_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9100

[database]
url = "mongodb://localhost:27017"
name = "club"

[logging]
format = "json"
"#
        )
        .unwrap();

        let loader = ConfigurationLoader::new(Some(file.path())).unwrap();
        assert_eq!(loader.config.server.port, 9100);
        assert_eq!(loader.config.server.host, "0.0.0.0");
        assert_eq!(
            loader.config.database.url.as_deref(),
            Some("mongodb://localhost:27017")
        );
        assert_eq!(loader.config.database.name, "club");
        assert_eq!(loader.config.logging.format, LogFormat::Json);
        assert_eq!(loader.config.logging.level, "info");
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigurationLoader::new(Some(&dir.path().join("absent.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = ").unwrap();
        let err = ConfigurationLoader::new(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML config"));
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
    }
}

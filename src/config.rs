use crate::error::{RegistrationError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Service configuration, loaded from TOML. Every section and field is
/// optional; command-line flags override what the file sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Persistent database directory. In-memory storage when unset.
    pub db_path: Option<PathBuf>,
}

/// CSV files used to populate students and courses at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub students: Option<PathBuf>,
    pub courses: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, used when `RUST_LOG` is not set.
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "course_registration=info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.server.addr.parse::<SocketAddr>().map_err(|e| {
            RegistrationError::ConfigError(format!(
                "invalid server address '{}': {}",
                self.server.addr, e
            ))
        })?;
        if self.logging.filter.trim().is_empty() {
            return Err(RegistrationError::ConfigError(
                "logging filter must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.server.addr, "127.0.0.1:8080");
        assert!(config.storage.db_path.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let config = AppConfig::from_toml_str(
            r#"
            [server]
            addr = "0.0.0.0:9000"

            [catalog]
            courses = "data/courses.csv"

            [logging]
            json = true
            "#,
        )
        .unwrap();

        assert_eq!(config.server.addr, "0.0.0.0:9000");
        assert_eq!(config.catalog.courses, Some(PathBuf::from("data/courses.csv")));
        assert!(config.catalog.students.is_none());
        assert!(config.logging.json);
        assert_eq!(config.logging.filter, "course_registration=info");
    }

    #[test]
    fn test_invalid_addr_rejected() {
        let result = AppConfig::from_toml_str("[server]\naddr = \"localhost\"");
        assert!(matches!(result, Err(RegistrationError::ConfigError(_))));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let result = AppConfig::from_toml_str("[server\naddr = 1");
        assert!(matches!(result, Err(RegistrationError::ConfigError(_))));
    }
}

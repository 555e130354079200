//! Application configuration.
//!
//! Settings come from two places: `config.toml` (server options and the
//! public catalog seed) and environment variables loaded through `.env`
//! (`DATABASE_URL`, `JWT_SECRET`, `BIND_ADDR`, `CONFIG_PATH`). Environment
//! variables win over the file.

/// Public catalog seed configuration
pub mod catalog;

/// Database configuration and connection management
pub mod database;

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

pub use catalog::CatalogConfig;

const DEFAULT_CONFIG_PATH: &str = "config.toml";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize, Clone)]
pub struct AppConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Public catalog to seed on start
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// The `[server]` section of config.toml
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Socket address the API listens on
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Origins allowed by CORS; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            cors_origins: Vec::new(),
        }
    }
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

/// Loads the application configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read, the TOML syntax is invalid,
/// or required fields are missing.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads the configuration for the running server.
///
/// Reads the file named by `CONFIG_PATH` (default `config.toml`). A missing
/// file is not an error: defaults are used and an empty catalog is seeded.
/// `BIND_ADDR` overrides `server.bind_addr`.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let mut config = if Path::new(&path).exists() {
        let config = load_config(&path)?;
        tracing::info!(
            "Loaded {path}: {} catalog materials, {} catalog items",
            config.catalog.materials.len(),
            config.catalog.items.len()
        );
        config
    } else {
        tracing::warn!("{path} not found, using default configuration");
        AppConfig::default()
    };

    if let Ok(bind_addr) = std::env::var("BIND_ADDR") {
        config.server.bind_addr = bind_addr;
    }

    Ok(config)
}

/// Reads the secret used to sign and verify access tokens.
pub fn jwt_secret() -> Result<String> {
    let secret = std::env::var("JWT_SECRET")?;
    if secret.trim().is_empty() {
        return Err(Error::Config {
            message: "JWT_SECRET must not be empty".to_string(),
        });
    }
    Ok(secret)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_app_config() {
        let toml_str = r#"
            [server]
            bind_addr = "127.0.0.1:8080"
            cors_origins = ["http://localhost:3000"]

            [[catalog.materials]]
            name = "Ladrillo"
            unit = "unidad"
            base_price = 0.4
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.server.cors_origins.len(), 1);
        assert_eq!(config.catalog.materials[0].name, "Ladrillo");
        assert!(config.catalog.items.is_empty());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.bind_addr, DEFAULT_BIND_ADDR);
        assert!(config.server.cors_origins.is_empty());
        assert!(config.catalog.materials.is_empty());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("definitely/not/here.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}

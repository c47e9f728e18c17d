use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::mowen::DEFAULT_BASE_URL;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub mowen: MowenConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct MowenConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for MowenConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

// Keeps the key out of logs and panic messages.
impl std::fmt::Debug for MowenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MowenConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "mowen-mcp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load from `MOWEN_MCP_CONFIG` (or `config.toml`), apply environment
    /// overrides and validate.
    ///
    /// A missing file falls back to defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var("MOWEN_MCP_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if Path::new(&path).exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        toml::from_str(&content).context("Failed to parse config file")
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("MOWEN_API_KEY").filter(|key| !key.is_empty()) {
            self.mowen.api_key = key;
        }
        if let Some(url) = lookup("MOWEN_BASE_URL").filter(|url| !url.is_empty()) {
            self.mowen.base_url = url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.mowen.api_key.trim().is_empty() {
            anyhow::bail!("MOWEN_API_KEY environment variable is required");
        }
        if self.mowen.timeout_secs == 0 {
            anyhow::bail!("mowen.timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parsing() {
        let toml_str = r#"
            [mowen]
            api_key = "file_key"
            base_url = "http://localhost:9000"
            timeout_secs = 10

            [server]
            name = "notes"
            version = "9.9.9"

            [logging]
            level = "debug"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.mowen.api_key, "file_key");
        assert_eq!(config.mowen.base_url, "http://localhost:9000");
        assert_eq!(config.mowen.timeout_secs, 10);
        assert_eq!(config.server.name, "notes");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[logging]\nlevel = \"warn\"").unwrap();
        assert_eq!(config.mowen.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.mowen.timeout_secs, 30);
        assert_eq!(config.server.name, "mowen-mcp");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config: Config = toml::from_str("[mowen]\napi_key = \"file_key\"").unwrap();
        config.apply_overrides(|name| match name {
            "MOWEN_API_KEY" => Some("env_key".to_string()),
            "MOWEN_BASE_URL" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.mowen.api_key, "env_key");
        assert_eq!(config.mowen.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let err = Config::default().validate().unwrap_err();
        assert!(err.to_string().contains("MOWEN_API_KEY"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.mowen.api_key = "k".to_string();
        config.mowen.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[mowen]\napi_key = \"k\"").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.mowen.api_key, "k");

        assert!(Config::from_file(dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let mut config = MowenConfig::default();
        config.api_key = "secret".to_string();
        assert!(!format!("{:?}", config).contains("secret"));
    }
}

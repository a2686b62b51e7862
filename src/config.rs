//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every section except `[app]` has defaults, so a minimal file only needs
//! the application name and currency.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

use crate::extraction::keyword::KeywordConfig;
use crate::types::AxiomaError;
use crate::valuation::engine::EngineConfig;

/// Default config file, overridable with `AXIOMA_CONFIG`.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSection,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub extraction: KeywordConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
    /// ISO code used when formatting amounts in reports.
    pub currency: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "axioma_store.json".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 8080,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        if config.app.currency.trim().is_empty() {
            return Err(AxiomaError::Config("app.currency is empty".into()).into());
        }
        config.engine.validate()?;
        Ok(config)
    }

    /// Path from `AXIOMA_CONFIG`, falling back to `config.toml`.
    pub fn default_path() -> String {
        std::env::var("AXIOMA_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }
}

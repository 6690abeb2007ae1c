use crate::common::error::{BackendError, Result};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub npi: NpiConfig,
    pub cms: CmsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Page size used when a request omits or mangles `pageSize`.
    pub page_size: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NpiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Cap on concurrent registry lookups within one request.
    pub max_concurrent_lookups: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CmsConfig {
    pub dataset_url: String,
    pub timeout_secs: u64,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            BackendError::Config(format!("Failed to read config file '{path}': {e}"))
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

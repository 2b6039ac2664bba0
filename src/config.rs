use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub providers: ProviderConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub stream: StreamConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProviderConfig {
    pub alchemy_base_url: String,
    pub alchemy_api_key: Option<String>,
    pub oku_base_url: String,
    pub zerox_base_url: String,
    pub zerox_api_key: Option<String>,
    pub metrics_base_url: String,
    pub chain: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub metrics_concurrency: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            alchemy_base_url: "https://eth-mainnet.g.alchemy.com/v2".to_string(),
            alchemy_api_key: None,
            oku_base_url: "https://omni.icarus.tools".to_string(),
            zerox_base_url: "https://api.0x.org".to_string(),
            zerox_api_key: None,
            metrics_base_url: "https://omni.icarus.tools".to_string(),
            chain: "ethereum".to_string(),
            timeout_secs: 10,
            max_retries: 3,
            retry_delay_ms: 1000,
            metrics_concurrency: 8,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: default_ttl() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StreamConfig {
    #[serde(default = "default_update_interval")]
    pub update_interval: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self { update_interval: default_update_interval() }
    }
}

fn default_cors_origin() -> String { "http://localhost:5173".to_string() }
fn default_ttl() -> u64 { 60 }
fn default_update_interval() -> u64 { 30 }

impl Config {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let mut config = Self::parse(&content)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// API keys from the environment win over the file.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("ALCHEMY_API_KEY").filter(|k| !k.is_empty()) {
            self.providers.alchemy_api_key = Some(key);
        }
        if let Some(key) = lookup("ZEROX_API_KEY").filter(|k| !k.is_empty()) {
            self.providers.zerox_api_key = Some(key);
        }
    }
}

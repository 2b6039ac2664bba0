pub mod alchemy;
pub mod metrics;
pub mod oku;
pub mod zerox;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;
use crate::models::{RawPoolRecord, RawTokenMetrics, TokenBalance};

/// Which pool listing to pull from the pool-data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolListKind {
    Top,
    Trending,
}

impl PoolListKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolListKind::Top => "top",
            PoolListKind::Trending => "trending",
        }
    }
}

#[async_trait]
pub trait PoolSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn fetch_pools(&self, kind: PoolListKind) -> Result<Vec<RawPoolRecord>, SourceError>;
}

#[async_trait]
pub trait TokenMetricsSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn fetch_metrics(&self, contract: &str) -> Result<RawTokenMetrics, SourceError>;
}

#[async_trait]
pub trait WalletSource: Send + Sync {
    async fn token_balances(&self, address: &str) -> Result<Vec<TokenBalance>, SourceError>;
    /// Native balance in ether, formatted as a decimal string.
    async fn account_balance(&self, address: &str) -> Result<String, SourceError>;
}

#[derive(Debug)]
pub enum SourceError {
    Network(String),
    Parse(String),
    RateLimit,
    Http { status: u16, message: String },
    Rpc(String),
    MissingApiKey(&'static str),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Network(e) => write!(f, "Network error: {}", e),
            SourceError::Parse(e) => write!(f, "Parse error: {}", e),
            SourceError::RateLimit => write!(f, "Rate limited"),
            SourceError::Http { status, message } => write!(f, "HTTP error! status: {}, message: {}", status, message),
            SourceError::Rpc(e) => write!(f, "RPC error: {}", e),
            SourceError::MissingApiKey(provider) => write!(f, "{} API key is required", provider),
        }
    }
}

impl std::error::Error for SourceError {}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SourceError::Parse(e.to_string())
        } else {
            SourceError::Network(e.to_string())
        }
    }
}

/// Retry policy shared by the provider clients.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay_ms: u64) -> Self {
        Self { max_retries, delay: Duration::from_millis(delay_ms) }
    }

    /// Sends the request built by `build`, retrying on transport errors and 429.
    pub async fn send(
        &self,
        provider: &str,
        build: impl Fn() -> RequestBuilder,
    ) -> Result<Response, SourceError> {
        let mut attempt = 0;
        loop {
            let outcome = build().send().await;
            let retryable = match &outcome {
                Ok(resp) => resp.status() == StatusCode::TOO_MANY_REQUESTS,
                Err(_) => true,
            };
            if !retryable || attempt >= self.max_retries {
                return match outcome {
                    Ok(resp) if resp.status() == StatusCode::TOO_MANY_REQUESTS => Err(SourceError::RateLimit),
                    Ok(resp) => Ok(resp),
                    Err(e) => Err(e.into()),
                };
            }
            attempt += 1;
            match &outcome {
                Ok(_) => tracing::debug!("{} rate limited, retrying ({}/{})", provider, attempt, self.max_retries),
                Err(e) => tracing::warn!("{} request failed: {}, retrying ({}/{})", provider, e, attempt, self.max_retries),
            }
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Turns a non-success response into `SourceError::Http`, keeping the provider's message.
pub async fn ensure_success(resp: Response) -> Result<Response, SourceError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.json::<serde_json::Value>().await.unwrap_or_default();
    let message = body["message"]
        .as_str()
        .or_else(|| body["reason"].as_str())
        .unwrap_or("Unknown error")
        .to_string();
    Err(SourceError::Http { status: status.as_u16(), message })
}

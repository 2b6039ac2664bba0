use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use crate::models::RawTokenMetrics;
use super::{ensure_success, RetryPolicy, SourceError, TokenMetricsSource};

/// Per-token market metrics over HTTP: `GET {base}/{chain}/token/{contract}`.
pub struct HttpMetricsSource {
    client: Client,
    base_url: String,
    chain: String,
    retry: RetryPolicy,
}

impl HttpMetricsSource {
    pub fn new(base_url: &str, chain: &str, timeout_secs: u64, retry: RetryPolicy) -> Result<Self, SourceError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            chain: chain.to_string(),
            retry,
        })
    }

    fn url(&self, contract: &str) -> String {
        format!("{}/{}/token/{}", self.base_url, self.chain, contract)
    }
}

#[async_trait]
impl TokenMetricsSource for HttpMetricsSource {
    fn name(&self) -> &'static str {
        "TokenMetrics"
    }

    async fn fetch_metrics(&self, contract: &str) -> Result<RawTokenMetrics, SourceError> {
        let url = self.url(contract);
        let resp = self.retry
            .send(self.name(), || self.client.get(&url).header("Accept", "application/json"))
            .await?;
        let resp = ensure_success(resp).await?;

        let mut metrics: RawTokenMetrics = resp.json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;
        if metrics.contract.is_none() {
            metrics.contract = Some(contract.to_string());
        }
        Ok(metrics)
    }
}

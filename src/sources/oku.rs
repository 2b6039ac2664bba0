use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use crate::models::RawPoolRecord;
use super::{ensure_success, PoolListKind, PoolSource, RetryPolicy, SourceError};

/// Oku / Icarus Tools pool listings.
pub struct OkuClient {
    client: Client,
    base_url: String,
    chain: String,
    retry: RetryPolicy,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PoolsResponse {
    Wrapped { result: PoolList },
    Bare(PoolList),
    List(Vec<serde_json::Value>),
}

#[derive(Debug, Deserialize)]
struct PoolList {
    pools: Vec<serde_json::Value>,
}

impl PoolsResponse {
    fn into_values(self) -> Vec<serde_json::Value> {
        match self {
            PoolsResponse::Wrapped { result } => result.pools,
            PoolsResponse::Bare(list) => list.pools,
            PoolsResponse::List(values) => values,
        }
    }
}

impl OkuClient {
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

    fn url(&self, kind: PoolListKind) -> String {
        let endpoint = match kind {
            PoolListKind::Top => "topPools",
            PoolListKind::Trending => "trendingPools",
        };
        format!(
            "{}/{}/cush/{}?limit=50&orderBy=total_fees_usd_desc&minTvl=100000",
            self.base_url, self.chain, endpoint
        )
    }
}

/// Decodes each pool on its own so one odd record does not sink the listing.
fn decode_pools(values: Vec<serde_json::Value>) -> Vec<RawPoolRecord> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RawPoolRecord>(value) {
            Ok(pool) => Some(pool),
            Err(e) => {
                tracing::warn!("Skipping undecodable pool record: {}", e);
                None
            }
        })
        .collect()
}

#[async_trait]
impl PoolSource for OkuClient {
    fn name(&self) -> &'static str {
        "Oku"
    }

    async fn fetch_pools(&self, kind: PoolListKind) -> Result<Vec<RawPoolRecord>, SourceError> {
        let url = self.url(kind);
        tracing::debug!("Fetching {} pools from {}", kind.as_str(), url);

        let resp = self.retry
            .send(self.name(), || self.client.get(&url).header("Content-Type", "application/json"))
            .await?;
        let resp = ensure_success(resp).await?;

        let data: PoolsResponse = resp.json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        Ok(decode_pools(data.into_values()))
    }
}

use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use super::{ensure_success, RetryPolicy, SourceError};

/// 0x gasless swap relay: indicative price, firm quote, and submission.
pub struct ZeroXClient {
    client: Client,
    base_url: String,
    api_key: String,
    retry: RetryPolicy,
}

impl ZeroXClient {
    pub fn new(base_url: &str, api_key: Option<&str>, timeout_secs: u64, retry: RetryPolicy) -> Result<Self, SourceError> {
        let api_key = api_key
            .filter(|k| !k.is_empty())
            .ok_or(SourceError::MissingApiKey("0x"))?;
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            retry,
        })
    }

    fn get(&self, endpoint: &str, params: &HashMap<String, String>) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, endpoint))
            .query(params)
            .header("0x-api-key", &self.api_key)
            .header("0x-version", "v2")
    }

    async fn read(resp: reqwest::Response) -> Result<Value, SourceError> {
        ensure_success(resp)
            .await?
            .json::<Value>()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))
    }

    pub async fn gasless_price(&self, sell_token: &str, buy_token: &str, chain_id: &str) -> Result<Value, SourceError> {
        let params = HashMap::from([
            ("sellToken".to_string(), sell_token.to_string()),
            ("buyToken".to_string(), buy_token.to_string()),
            ("chainId".to_string(), chain_id.to_string()),
        ]);
        let resp = self.retry.send("0x", || self.get("/gasless/price", &params)).await?;
        Self::read(resp).await
    }

    pub async fn gasless_quote(&self, params: &HashMap<String, String>) -> Result<Value, SourceError> {
        let resp = self.retry.send("0x", || self.get("/gasless/quote", params)).await?;
        Self::read(resp).await
    }

    pub async fn submit_gasless(&self, body: &Value) -> Result<Value, SourceError> {
        let url = format!("{}/gasless/submit", self.base_url);
        let resp = self.retry
            .send("0x", || {
                self.client
                    .post(&url)
                    .json(body)
                    .header("0x-api-key", &self.api_key)
                    .header("0x-version", "v2")
            })
            .await?;
        Self::read(resp).await
    }
}

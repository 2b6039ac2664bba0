use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use crate::models::TokenBalance;
use super::{ensure_success, RetryPolicy, SourceError, WalletSource};

const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// Alchemy JSON-RPC client for native and ERC-20 balances.
pub struct AlchemyClient {
    client: Client,
    endpoint: String,
    retry: RetryPolicy,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenBalancesResult {
    token_balances: Vec<RawTokenBalance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTokenBalance {
    contract_address: String,
    token_balance: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenMetadata {
    name: Option<String>,
    symbol: Option<String>,
    decimals: Option<u32>,
    logo: Option<String>,
}

impl AlchemyClient {
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64, retry: RetryPolicy) -> Result<Self, SourceError> {
        if api_key.is_empty() {
            return Err(SourceError::MissingApiKey("Alchemy"));
        }
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()?,
            endpoint: format!("{}/{}", base_url.trim_end_matches('/'), api_key),
            retry,
        })
    }

    async fn request<T: DeserializeOwned>(&self, method: &str, params: serde_json::Value) -> Result<T, SourceError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let resp = self.retry
            .send("Alchemy", || self.client.post(&self.endpoint).json(&body))
            .await?;
        let resp = ensure_success(resp).await?;

        let data: RpcResponse<T> = resp.json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        if let Some(err) = data.error {
            return Err(SourceError::Rpc(format!("{} (code: {})", err.message, err.code)));
        }
        data.result
            .ok_or_else(|| SourceError::Parse(format!("{} returned no result", method)))
    }
}

#[async_trait]
impl WalletSource for AlchemyClient {
    async fn token_balances(&self, address: &str) -> Result<Vec<TokenBalance>, SourceError> {
        let result: TokenBalancesResult = self
            .request("alchemy_getTokenBalances", serde_json::json!([address, "erc20"]))
            .await?;

        let mut balances = Vec::new();
        for token in result.token_balances {
            let Some(balance) = token.token_balance.filter(|b| is_nonzero_hex(b)) else {
                continue;
            };

            let metadata: TokenMetadata = match self
                .request("alchemy_getTokenMetadata", serde_json::json!([token.contract_address]))
                .await
            {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!("Metadata lookup failed for {}: {}", token.contract_address, e);
                    continue;
                }
            };

            if let Some(entry) = to_balance(token.contract_address, balance, metadata) {
                balances.push(entry);
            }
        }

        tracing::debug!("{} non-zero token balances for {}", balances.len(), address);
        Ok(balances)
    }

    async fn account_balance(&self, address: &str) -> Result<String, SourceError> {
        let wei_hex: String = self
            .request("eth_getBalance", serde_json::json!([address, "latest"]))
            .await?;
        let wei = parse_hex_u128(&wei_hex)
            .ok_or_else(|| SourceError::Parse(format!("invalid balance {}", wei_hex)))?;
        Ok(format_ether(wei))
    }
}

/// Keeps tokens with a usable name and symbol; dotted names are typically spam airdrops.
fn to_balance(contract_address: String, balance: String, metadata: TokenMetadata) -> Option<TokenBalance> {
    let name = metadata.name.filter(|n| !n.is_empty() && !n.contains('.'))?;
    let symbol = metadata.symbol.filter(|s| !s.is_empty() && !s.contains('.'))?;
    Some(TokenBalance {
        contract_address,
        token_name: name,
        token_symbol: symbol,
        balance,
        decimals: metadata.decimals.unwrap_or(18),
        logo: metadata.logo,
    })
}

fn is_nonzero_hex(value: &str) -> bool {
    let digits = value.trim_start_matches("0x");
    digits.chars().all(|c| c.is_ascii_hexdigit()) && digits.chars().any(|c| c != '0')
}

fn parse_hex_u128(value: &str) -> Option<u128> {
    let digits = value.trim_start_matches("0x");
    if digits.is_empty() {
        return Some(0);
    }
    u128::from_str_radix(digits, 16).ok()
}

/// Wei to ether: trailing fractional zeros trimmed, at least one fractional digit kept.
pub fn format_ether(wei: u128) -> String {
    let whole = wei / WEI_PER_ETHER;
    let frac = format!("{:018}", wei % WEI_PER_ETHER);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, frac)
    }
}

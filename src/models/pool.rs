use serde::{Deserialize, Serialize};
use super::RawNumber;

/// Pool record as returned by the pool-data provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPoolRecord {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub t0_symbol: String,
    #[serde(default)]
    pub t0_name: String,
    #[serde(default)]
    pub t1_symbol: String,
    #[serde(default)]
    pub t1_name: String,
    pub tvl_usd: Option<RawNumber>,
    pub total_fees_usd: Option<RawNumber>,
    pub t0_volume_usd: Option<RawNumber>,
    pub total_volume_7d_usd: Option<RawNumber>,
    pub t0_volume_change_7d: Option<RawNumber>,
}

/// Normalized pool statistics served to the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStats {
    pub address: String,
    pub token_one_name: String,
    pub token_one_symbol: String,
    pub token_two_name: String,
    pub token_two_symbol: String,
    pub volume7d: f64,
    pub apy7d: f64,
    pub apy24h: f64,
    pub fees_per_million: i64,
    pub v_tvl_ratio: f64,
    pub volume_growth7d: f64,
    pub is_stable_pair: bool,
    pub is_high_liquidity: bool,
    pub opportunity_score: u8,
}

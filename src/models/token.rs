use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use super::RawNumber;

/// Market metrics for one token, current values alongside their 30-day baselines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTokenMetrics {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contract: Option<String>,
    pub price: Option<RawNumber>,
    pub price_30d: Option<RawNumber>,
    pub tvl: Option<RawNumber>,
    pub tvl_30d: Option<RawNumber>,
    pub volume_24h: Option<RawNumber>,
    pub volume_30d: Option<RawNumber>,
    pub fees_24h: Option<RawNumber>,
    pub fees_30d: Option<RawNumber>,
    pub change_4h: Option<RawNumber>,
    pub change_24h: Option<RawNumber>,
    pub change_7d: Option<RawNumber>,
    pub change_30d: Option<RawNumber>,
    pub tx_24h: Option<RawNumber>,
    pub tx_30d: Option<RawNumber>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalKind {
    #[serde(rename = "Liquidity Momentum")]
    LiquidityMomentum,
    #[serde(rename = "Volume Divergence")]
    VolumeDivergence,
    #[serde(rename = "Fee Efficiency")]
    FeeEfficiency,
    #[serde(rename = "Price Momentum")]
    PriceMomentum,
    #[serde(rename = "On-chain Activity")]
    OnChainActivity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSignal {
    #[serde(rename = "type")]
    pub kind: SignalKind,
    pub message: String,
    pub details: BTreeMap<String, f64>,
}

impl TokenSignal {
    pub fn new(kind: SignalKind, message: &str, details: &[(&str, f64)]) -> Self {
        Self {
            kind,
            message: message.to_string(),
            details: details.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenAnalytics {
    pub token: String,
    pub name: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract: Option<String>,
    pub signals: Vec<TokenSignal>,
}

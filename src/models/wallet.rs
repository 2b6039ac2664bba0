use serde::{Deserialize, Serialize};

/// Non-zero ERC-20 holding with its token metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub contract_address: String,
    pub token_name: String,
    pub token_symbol: String,
    /// Raw hex balance as reported by the node.
    pub balance: String,
    pub decimals: u32,
    pub logo: Option<String>,
}

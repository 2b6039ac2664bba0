use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use crate::api::error::ApiError;
use crate::api::websocket::ws_handler;
use crate::models::{PoolStats, TokenAnalytics, TokenBalance};
use crate::services::{AnalyticsCollector, PoolListCache};
use crate::sources::{zerox::ZeroXClient, PoolListKind, WalletSource};

/// Explicitly constructed provider clients, shared by every handler.
pub struct AppState {
    pub collector: Arc<AnalyticsCollector>,
    pub cache: Arc<PoolListCache>,
    pub wallet: Option<Arc<dyn WalletSource>>,
    pub zerox: Option<Arc<ZeroXClient>>,
    pub update_interval: u64,
}

impl AppState {
    fn wallet(&self) -> Result<&Arc<dyn WalletSource>, ApiError> {
        self.wallet.as_ref().ok_or(ApiError::Unavailable("Alchemy wallet provider"))
    }

    fn zerox(&self) -> Result<&Arc<ZeroXClient>, ApiError> {
        self.zerox.as_ref().ok_or(ApiError::Unavailable("0x gasless relay"))
    }
}

#[derive(Debug, Serialize)]
pub struct PoolsResponse {
    pub pools: Vec<PoolStats>,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub analytics: Vec<TokenAnalytics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuery {
    pub sell_token: String,
    pub buy_token: String,
    pub chain_id: String,
}

/// `0x` followed by 40 hex digits.
pub fn validate_address(address: &str) -> Result<(), ApiError> {
    let valid = address.len() == 42
        && address.starts_with("0x")
        && address[2..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!("invalid wallet address: {}", address)))
    }
}

/// GET /api/health
async fn health() -> Json<Value> {
    Json(serde_json::json!({
        "status": "Server is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// GET /api/stats
async fn stats(State(state): State<Arc<AppState>>) -> Json<Value> {
    let stats = state.collector.get_stats();
    Json(serde_json::json!({
        "cached_listings": state.cache.len(),
        "provider_requests": stats.provider_requests.load(Ordering::Relaxed),
        "cache_hits": stats.cache_hits.load(Ordering::Relaxed),
        "pools_analyzed": stats.pools_analyzed.load(Ordering::Relaxed),
        "pools_skipped": stats.pools_skipped.load(Ordering::Relaxed),
        "tokens_analyzed": stats.tokens_analyzed.load(Ordering::Relaxed),
        "tokens_skipped": stats.tokens_skipped.load(Ordering::Relaxed),
    }))
}

/// GET /api/token-balances/:address
async fn token_balances(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<Vec<TokenBalance>>, ApiError> {
    validate_address(&address)?;
    let balances = state.wallet()?
        .token_balances(&address)
        .await
        .map_err(ApiError::upstream("Failed to fetch token balances"))?;
    Ok(Json(balances))
}

/// GET /api/account-balance/:address
async fn account_balance(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<Value>, ApiError> {
    validate_address(&address)?;
    let balance = state.wallet()?
        .account_balance(&address)
        .await
        .map_err(ApiError::upstream("Failed to fetch account balance"))?;
    Ok(Json(serde_json::json!({ "balance": balance })))
}

async fn pools_for(state: &AppState, kind: PoolListKind) -> Result<Json<PoolsResponse>, ApiError> {
    let pools = state.collector
        .pool_stats(kind)
        .await
        .map_err(ApiError::upstream("Failed to fetch pool analytics"))?;
    Ok(Json(PoolsResponse { pools }))
}

/// GET /api/pool-analytics
async fn pool_analytics(State(state): State<Arc<AppState>>) -> Result<Json<PoolsResponse>, ApiError> {
    pools_for(&state, PoolListKind::Top).await
}

/// GET /api/pool-analytics/trending
async fn trending_pool_analytics(State(state): State<Arc<AppState>>) -> Result<Json<PoolsResponse>, ApiError> {
    pools_for(&state, PoolListKind::Trending).await
}

/// GET /api/token-analytics/:address
async fn token_analytics(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    validate_address(&address)?;
    let balances = state.wallet()?
        .token_balances(&address)
        .await
        .map_err(ApiError::upstream("Failed to fetch token balances"))?;
    let analytics = state.collector.token_analytics(&balances).await;
    tracing::info!("{} of {} held tokens analyzed for {}", analytics.len(), balances.len(), address);
    Ok(Json(AnalyticsResponse { analytics }))
}

/// GET /api/gasless/price
async fn gasless_price(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PriceQuery>,
) -> Result<Json<Value>, ApiError> {
    let price = state.zerox()?
        .gasless_price(&query.sell_token, &query.buy_token, &query.chain_id)
        .await
        .map_err(ApiError::upstream("Failed to fetch gasless price"))?;
    Ok(Json(price))
}

/// GET /api/gasless/quote
async fn gasless_quote(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let quote = state.zerox()?
        .gasless_quote(&params)
        .await
        .map_err(ApiError::upstream("Failed to fetch gasless quote"))?;
    Ok(Json(quote))
}

/// POST /api/gasless/submit
async fn gasless_submit(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let receipt = state.zerox()?
        .submit_gasless(&body)
        .await
        .map_err(ApiError::upstream("Failed to submit gasless transaction"))?;
    Ok(Json(receipt))
}

pub fn create_rest_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/stats", get(stats))
        .route("/api/token-balances/:address", get(token_balances))
        .route("/api/account-balance/:address", get(account_balance))
        .route("/api/pool-analytics", get(pool_analytics))
        .route("/api/pool-analytics/trending", get(trending_pool_analytics))
        .route("/api/token-analytics/:address", get(token_analytics))
        .route("/api/gasless/price", get(gasless_price))
        .route("/api/gasless/quote", get(gasless_quote))
        .route("/api/gasless/submit", post(gasless_submit))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

use crate::models::{RawTokenMetrics, SignalKind, TokenAnalytics, TokenSignal};
use super::error::{denominator, finite, ratio, require, AnalyticsError};

const MOMENTUM_THRESHOLD: f64 = 10.0;

/// Runs the five signal rules over one token's metrics.
///
/// Rules are evaluated in a fixed order and each appends at most one signal, so the
/// resulting sequence is deterministic for a given input. A zero or missing denominator
/// anywhere fails the whole token, as does any ratio that overflows, so no detail value
/// is ever infinite.
pub fn analyze_token_metrics(raw: &RawTokenMetrics) -> Result<TokenAnalytics, AnalyticsError> {
    let price = require("price", &raw.price)?;
    let mut signals = Vec::new();

    // Liquidity momentum
    let tvl = denominator("tvl", &raw.tvl)?;
    let tvl_30d = denominator("tvl_30d", &raw.tvl_30d)?;
    let price_30d = denominator("price_30d", &raw.price_30d)?;
    let tvl_growth_30d = ratio(tvl - tvl_30d, tvl_30d, "tvl_30d")?;
    let price_growth_30d = ratio(price - price_30d, price_30d, "price_30d")?;
    if tvl_growth_30d > price_growth_30d * 1.5 {
        signals.push(TokenSignal::new(
            SignalKind::LiquidityMomentum,
            "Bullish liquidity inflow: TVL growth outpacing price growth.",
            &[("tvlGrowth30d", tvl_growth_30d), ("priceGrowth30d", price_growth_30d)],
        ));
    }

    // Volume divergence
    let volume_24h = denominator("volume_24h", &raw.volume_24h)?;
    let volume_30d = denominator("volume_30d", &raw.volume_30d)?;
    let volume_decay_ratio = ratio(volume_24h, volume_30d / 30.0, "volume_30d")?;
    if volume_decay_ratio < 0.5 {
        signals.push(TokenSignal::new(
            SignalKind::VolumeDivergence,
            "Short-term trading volume cooling compared to monthly average.",
            &[("volumeDecayRatio", volume_decay_ratio)],
        ));
    }

    // Fee efficiency
    let fees_24h = require("fees_24h", &raw.fees_24h)?;
    let fees_30d = require("fees_30d", &raw.fees_30d)?;
    let fee_efficiency_24h = ratio(fees_24h, volume_24h, "volume_24h")?;
    let fee_efficiency_30d = ratio(fees_30d, volume_30d, "volume_30d")?;
    let efficiency_change = ratio(
        fee_efficiency_24h - fee_efficiency_30d,
        fee_efficiency_30d,
        "fee_efficiency_30d",
    )?;
    if efficiency_change > 0.2 {
        signals.push(TokenSignal::new(
            SignalKind::FeeEfficiency,
            "Fee efficiency improving: protocol generating more revenue per dollar traded.",
            &[("efficiencyChange", efficiency_change)],
        ));
    }

    // Price momentum, at most one direction
    let momentum_sum = require("change_4h", &raw.change_4h)?
        + require("change_24h", &raw.change_24h)?
        + require("change_7d", &raw.change_7d)?
        + require("change_30d", &raw.change_30d)?;
    let avg_momentum = finite("avg_momentum", momentum_sum / 4.0)?;
    let momentum_message = if avg_momentum > MOMENTUM_THRESHOLD {
        Some("Strong upward momentum detected across timeframes.")
    } else if avg_momentum < -MOMENTUM_THRESHOLD {
        Some("Strong downward momentum detected across timeframes.")
    } else {
        None
    };
    if let Some(message) = momentum_message {
        signals.push(TokenSignal::new(
            SignalKind::PriceMomentum,
            message,
            &[("avgMomentum", avg_momentum)],
        ));
    }

    // On-chain activity
    let tx_24h = require("tx_24h", &raw.tx_24h)?;
    let tx_30d = require("tx_30d", &raw.tx_30d)?;
    let tx_per_tvl_24h = ratio(tx_24h, tvl, "tvl")?;
    let baseline_tx_per_tvl = ratio(tx_30d / 30.0, tvl_30d, "tvl_30d")?;
    let activity_ratio = ratio(tx_per_tvl_24h, baseline_tx_per_tvl, "baseline_tx_per_tvl")?;
    let activity_message = if activity_ratio < 0.5 {
        Some("Decreasing on-chain engagement: fewer transactions per unit of TVL.")
    } else if activity_ratio > 1.5 {
        Some("High on-chain activity: increasing user engagement relative to liquidity.")
    } else {
        None
    };
    if let Some(message) = activity_message {
        signals.push(TokenSignal::new(
            SignalKind::OnChainActivity,
            message,
            &[("activityRatio", activity_ratio)],
        ));
    }

    Ok(TokenAnalytics {
        token: raw.symbol.clone(),
        name: raw.name.clone(),
        price,
        contract: raw.contract.clone(),
        signals,
    })
}

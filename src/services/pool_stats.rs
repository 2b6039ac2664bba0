use crate::models::{PoolStats, RawPoolRecord};
use super::error::{denominator, finite, ratio, require, round_to, AnalyticsError};

const STABLES: &[&str] = &["USDC", "USDT", "DAI"];
const HIGH_LIQUIDITY_TVL: f64 = 5_000_000.0;
const DEEP_LIQUIDITY_TVL: f64 = 10_000_000.0;

pub fn is_stable(symbol: &str) -> bool {
    STABLES.contains(&symbol)
}

/// Derives APYs, utilization and the opportunity score for one pool.
///
/// A missing or zero TVL is a `DivisionByZero`; any other missing financial field is
/// `MalformedInput`, and a yield that overflows is `NonFinite`. Either way no partial stats are produced.
pub fn compute_pool_stats(raw: &RawPoolRecord) -> Result<PoolStats, AnalyticsError> {
    let tvl = denominator("tvl_usd", &raw.tvl_usd)?;
    let fees_24h = require("total_fees_usd", &raw.total_fees_usd)?;
    let volume_24h = require("t0_volume_usd", &raw.t0_volume_usd)?;
    let volume_7d = require("total_volume_7d_usd", &raw.total_volume_7d_usd)?;
    let volume_change_7d = require("t0_volume_change_7d", &raw.t0_volume_change_7d)?;

    let weekly_yield = finite("apy7d", ratio(fees_24h * 52.0, tvl, "tvl_usd")? * 100.0)?;
    let daily_yield = finite("apy24h", ratio(fees_24h * 365.0, tvl, "tvl_usd")? * 100.0)?;
    let volume_growth = finite("volume_growth7d", volume_change_7d * 100.0)?;
    let fees_per_million = ratio(fees_24h, tvl / 1_000_000.0, "tvl_usd")?;
    let utilization = ratio(volume_24h, tvl, "tvl_usd")?;

    let yield_band = if weekly_yield > 20.0 { 40 } else { 20 };
    let utilization_band = if utilization > 15.0 { 30 } else { 15 };
    let depth_band = if tvl > DEEP_LIQUIDITY_TVL { 30 } else { 10 };
    let score: u32 = yield_band + utilization_band + depth_band;

    Ok(PoolStats {
        address: raw.address.clone(),
        token_one_name: raw.t0_name.clone(),
        token_one_symbol: raw.t0_symbol.clone(),
        token_two_name: raw.t1_name.clone(),
        token_two_symbol: raw.t1_symbol.clone(),
        volume7d: volume_7d,
        apy7d: round_to(weekly_yield, 2),
        apy24h: round_to(daily_yield, 2),
        fees_per_million: round_to(fees_per_million, 0) as i64,
        v_tvl_ratio: round_to(utilization, 2),
        volume_growth7d: round_to(volume_growth, 1),
        is_stable_pair: is_stable(&raw.t0_symbol) && is_stable(&raw.t1_symbol),
        is_high_liquidity: tvl > HIGH_LIQUIDITY_TVL,
        opportunity_score: score.min(100) as u8,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawNumber;

    fn pool(tvl: f64, fees: f64, volume: f64, t0: &str, t1: &str) -> RawPoolRecord {
        RawPoolRecord {
            address: "0x88e6a0c2ddd26feeb64f039a2c41296fcb3f5640".into(),
            t0_symbol: t0.into(),
            t0_name: format!("{} token", t0),
            t1_symbol: t1.into(),
            t1_name: format!("{} token", t1),
            tvl_usd: Some(tvl.into()),
            total_fees_usd: Some(fees.into()),
            t0_volume_usd: Some(volume.into()),
            total_volume_7d_usd: Some(1_000_000.0.into()),
            t0_volume_change_7d: Some(0.3.into()),
        }
    }

    #[test]
    fn weth_usdc_reference_pool() {
        let stats = compute_pool_stats(&pool(10_000_000.0, 5000.0, 200_000.0, "WETH", "USDC")).unwrap();
        assert_eq!(stats.apy7d, 2.6);
        assert_eq!(stats.apy24h, 18.25);
        assert_eq!(stats.fees_per_million, 500);
        assert_eq!(stats.v_tvl_ratio, 0.02);
        assert_eq!(stats.volume_growth7d, 30.0);
        assert_eq!(stats.volume7d, 1_000_000.0);
        assert!(!stats.is_stable_pair);
        assert!(stats.is_high_liquidity);
        // 10M is not strictly above the deep-liquidity threshold
        assert_eq!(stats.opportunity_score, 45);
        assert_eq!(stats.token_one_symbol, "WETH");
        assert_eq!(stats.token_two_name, "USDC token");
    }

    #[test]
    fn top_bands_sum_to_hundred() {
        // weekly yield 52%, utilization 20x, tvl 20M
        let stats = compute_pool_stats(&pool(20_000_000.0, 200_000.0, 400_000_000.0, "WETH", "WBTC")).unwrap();
        assert_eq!(stats.opportunity_score, 100);
    }

    #[test]
    fn score_stays_within_bounds() {
        for tvl in [1.0, 5_000_000.0, 10_000_001.0, 1e12] {
            for fees in [0.0, 10.0, 1e9] {
                for volume in [0.0, 1e6, 1e15] {
                    let s = compute_pool_stats(&pool(tvl, fees, volume, "A", "B")).unwrap();
                    assert!(s.opportunity_score <= 100);
                    assert!(s.opportunity_score >= 45);
                }
            }
        }
    }

    #[test]
    fn apy_ratio_follows_annualization_factors() {
        let stats = compute_pool_stats(&pool(3_000_000.0, 12_345.0, 1.0, "A", "B")).unwrap();
        let expected = 365.0 / 52.0;
        assert!((stats.apy24h / stats.apy7d - expected).abs() < 0.01);
    }

    #[test]
    fn stable_pair_is_case_sensitive() {
        let s = |a, b| compute_pool_stats(&pool(1e6, 1.0, 1.0, a, b)).unwrap().is_stable_pair;
        assert!(s("USDC", "USDT"));
        assert!(s("DAI", "USDC"));
        assert!(!s("usdc", "USDT"));
        assert!(!s("USDC", "WETH"));
        assert!(!s("FRAX", "DAI"));
    }

    #[test]
    fn zero_or_missing_tvl_is_division_by_zero() {
        let err = compute_pool_stats(&pool(0.0, 5000.0, 1.0, "A", "B")).unwrap_err();
        assert_eq!(err, AnalyticsError::DivisionByZero { denominator: "tvl_usd" });

        let mut raw = pool(1.0, 1.0, 1.0, "A", "B");
        raw.tvl_usd = None;
        assert_eq!(
            compute_pool_stats(&raw).unwrap_err(),
            AnalyticsError::DivisionByZero { denominator: "tvl_usd" }
        );
    }

    #[test]
    fn unparsable_tvl_is_malformed() {
        let mut raw = pool(1e6, 1.0, 1.0, "A", "B");
        raw.tvl_usd = Some(RawNumber::Text("".into()));
        assert_eq!(
            compute_pool_stats(&raw).unwrap_err(),
            AnalyticsError::MalformedInput { field: "tvl_usd" }
        );
    }

    #[test]
    fn half_way_apy_follows_exact_binary_value() {
        let apy7d = |fees| compute_pool_stats(&pool(2_000_000.0, fees, 1.0, "A", "B")).unwrap().apy7d;
        assert_eq!(apy7d(225.0), 0.58);
        assert_eq!(apy7d(275.0), 0.71);
        assert_eq!(apy7d(425.0), 1.1);
    }

    #[test]
    fn overflowing_yield_is_rejected() {
        let err = compute_pool_stats(&pool(1e-300, 1e300, 1.0, "A", "B")).unwrap_err();
        assert_eq!(err, AnalyticsError::NonFinite { quantity: "tvl_usd" });

        let err = compute_pool_stats(&pool(1.0, 1e306, 1.0, "A", "B")).unwrap_err();
        assert_eq!(err, AnalyticsError::NonFinite { quantity: "apy7d" });
    }

    #[test]
    fn non_numeric_fees_are_malformed() {
        let mut raw = pool(1e6, 1.0, 1.0, "A", "B");
        raw.total_fees_usd = Some(RawNumber::Text("lots".into()));
        assert_eq!(
            compute_pool_stats(&raw).unwrap_err(),
            AnalyticsError::MalformedInput { field: "total_fees_usd" }
        );
    }

    #[test]
    fn accepts_provider_json_with_string_numbers() {
        let raw: RawPoolRecord = serde_json::from_value(serde_json::json!({
            "address": "0xabc",
            "t0_symbol": "USDC", "t0_name": "USD Coin",
            "t1_symbol": "USDT", "t1_name": "Tether USD",
            "tvl_usd": "2000000",
            "total_fees_usd": 400,
            "t0_volume_usd": "1000000",
            "total_volume_7d_usd": 7000000,
            "t0_volume_change_7d": "-0.125"
        })).unwrap();
        let stats = compute_pool_stats(&raw).unwrap();
        assert!(stats.is_stable_pair);
        assert!(!stats.is_high_liquidity);
        assert_eq!(stats.fees_per_million, 200);
        assert_eq!(stats.v_tvl_ratio, 0.5);
        assert_eq!(stats.volume_growth7d, -12.5);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["tokenOneSymbol"], "USDC");
        assert_eq!(json["feesPerMillion"], 200);
        assert_eq!(json["vTvlRatio"], 0.5);
        assert!(json.get("opportunityScore").unwrap().is_u64());
    }

    #[test]
    fn idempotent() {
        let raw = pool(7_500_000.0, 9_000.0, 120_000_000.0, "WETH", "USDT");
        assert_eq!(compute_pool_stats(&raw), compute_pool_stats(&raw));
    }
}

use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use crate::models::{PoolStats, RawPoolRecord, TokenAnalytics, TokenBalance};
use crate::sources::{PoolListKind, PoolSource, SourceError, TokenMetricsSource};
use super::{analyze_token_metrics, compute_pool_stats, PoolListCache};

#[derive(Default)]
pub struct CollectorStats {
    pub provider_requests: AtomicU64,
    pub cache_hits: AtomicU64,
    pub pools_analyzed: AtomicU64,
    pub pools_skipped: AtomicU64,
    pub tokens_analyzed: AtomicU64,
    pub tokens_skipped: AtomicU64,
}

/// Fetches raw records from the providers and maps them through the analyzers.
/// A record that fails analysis is logged and left out; the rest of the batch survives.
pub struct AnalyticsCollector {
    pools: Arc<dyn PoolSource>,
    metrics: Arc<dyn TokenMetricsSource>,
    cache: Arc<PoolListCache>,
    concurrency: usize,
    stats: CollectorStats,
}

impl AnalyticsCollector {
    pub fn new(
        pools: Arc<dyn PoolSource>,
        metrics: Arc<dyn TokenMetricsSource>,
        cache: Arc<PoolListCache>,
        concurrency: usize,
    ) -> Self {
        Self {
            pools,
            metrics,
            cache,
            concurrency: concurrency.max(1),
            stats: CollectorStats::default(),
        }
    }

    pub async fn pool_stats(&self, kind: PoolListKind) -> Result<Vec<PoolStats>, SourceError> {
        let records = match self.cache.get(kind) {
            Some(records) => {
                self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
                records
            }
            None => {
                self.stats.provider_requests.fetch_add(1, Ordering::Relaxed);
                let fetched = self.pools.fetch_pools(kind).await?;
                tracing::info!("{} returned {} {} pools", self.pools.name(), fetched.len(), kind.as_str());
                self.cache.insert(kind, fetched)
            }
        };

        let (stats, skipped) = analyze_pool_batch(&records);
        self.stats.pools_analyzed.fetch_add(stats.len() as u64, Ordering::Relaxed);
        self.stats.pools_skipped.fetch_add(skipped as u64, Ordering::Relaxed);
        Ok(stats)
    }

    /// One metrics lookup per held token, in wallet order.
    pub async fn token_analytics(&self, balances: &[TokenBalance]) -> Vec<TokenAnalytics> {
        let lookups: Vec<_> = stream::iter(balances.iter().cloned())
            .map(|balance| {
                self.stats.provider_requests.fetch_add(1, Ordering::Relaxed);
                let metrics = self.metrics.clone();
                async move {
                    let lookup = metrics.fetch_metrics(&balance.contract_address).await;
                    (balance, lookup)
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut analytics = Vec::with_capacity(lookups.len());
        for (balance, lookup) in lookups {
            let mut metrics = match lookup {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!("{} lookup failed for {}: {}", self.metrics.name(), balance.token_symbol, e);
                    self.stats.tokens_skipped.fetch_add(1, Ordering::Relaxed);
                    continue;
                }
            };
            if metrics.symbol.is_empty() {
                metrics.symbol = balance.token_symbol.clone();
            }
            if metrics.name.is_empty() {
                metrics.name = balance.token_name.clone();
            }

            match analyze_token_metrics(&metrics) {
                Ok(a) => {
                    self.stats.tokens_analyzed.fetch_add(1, Ordering::Relaxed);
                    analytics.push(a);
                }
                Err(e) => {
                    tracing::warn!("Skipping token {}: {}", metrics.symbol, e);
                    self.stats.tokens_skipped.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
        analytics
    }

    pub fn get_stats(&self) -> &CollectorStats {
        &self.stats
    }
}

/// Computes stats for every record, returning the successes and the number skipped.
pub fn analyze_pool_batch(records: &[RawPoolRecord]) -> (Vec<PoolStats>, usize) {
    let mut skipped = 0;
    let stats: Vec<PoolStats> = records
        .iter()
        .filter_map(|raw| match compute_pool_stats(raw) {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::warn!("Skipping pool {}: {}", raw.address, e);
                skipped += 1;
                None
            }
        })
        .collect();
    (stats, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use crate::models::{RawNumber, RawTokenMetrics};

    fn pool(address: &str, tvl: f64) -> RawPoolRecord {
        RawPoolRecord {
            address: address.into(),
            t0_symbol: "WETH".into(),
            t1_symbol: "USDC".into(),
            tvl_usd: Some(tvl.into()),
            total_fees_usd: Some(1000.0.into()),
            t0_volume_usd: Some(50_000.0.into()),
            total_volume_7d_usd: Some(300_000.0.into()),
            t0_volume_change_7d: Some(0.1.into()),
            ..Default::default()
        }
    }

    struct FakePools {
        calls: AtomicU64,
    }

    #[async_trait]
    impl PoolSource for FakePools {
        fn name(&self) -> &'static str { "fake" }

        async fn fetch_pools(&self, _kind: PoolListKind) -> Result<Vec<RawPoolRecord>, SourceError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(vec![pool("0xa", 2_000_000.0), pool("0xzero", 0.0), pool("0xb", 20_000_000.0)])
        }
    }

    struct FakeMetrics {
        by_contract: HashMap<String, RawTokenMetrics>,
    }

    #[async_trait]
    impl TokenMetricsSource for FakeMetrics {
        fn name(&self) -> &'static str { "fake-metrics" }

        async fn fetch_metrics(&self, contract: &str) -> Result<RawTokenMetrics, SourceError> {
            self.by_contract
                .get(contract)
                .cloned()
                .ok_or_else(|| SourceError::Http { status: 404, message: "unknown token".into() })
        }
    }

    fn metrics(tvl_30d: f64) -> RawTokenMetrics {
        let n = |v: f64| Some(RawNumber::Number(v));
        RawTokenMetrics {
            price: n(2.0), price_30d: n(2.0),
            tvl: n(1000.0), tvl_30d: n(tvl_30d),
            volume_24h: n(100.0), volume_30d: n(3000.0),
            fees_24h: n(1.0), fees_30d: n(30.0),
            change_4h: n(0.0), change_24h: n(0.0), change_7d: n(0.0), change_30d: n(0.0),
            tx_24h: n(10.0), tx_30d: n(300.0),
            ..Default::default()
        }
    }

    fn holding(contract: &str, symbol: &str) -> TokenBalance {
        TokenBalance {
            contract_address: contract.into(),
            token_name: format!("{} Token", symbol),
            token_symbol: symbol.into(),
            balance: "0x1".into(),
            decimals: 18,
            logo: None,
        }
    }

    fn collector(metrics: FakeMetrics) -> (AnalyticsCollector, Arc<FakePools>) {
        let pools = Arc::new(FakePools { calls: AtomicU64::new(0) });
        let collector = AnalyticsCollector::new(
            pools.clone(),
            Arc::new(metrics),
            Arc::new(PoolListCache::new(60)),
            4,
        );
        (collector, pools)
    }

    #[test]
    fn batch_skips_failing_records() {
        let (stats, skipped) = analyze_pool_batch(&[pool("0xa", 1e6), pool("0xzero", 0.0)]);
        assert_eq!(skipped, 1);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].address, "0xa");
    }

    #[tokio::test]
    async fn pool_stats_uses_cache_and_isolates_bad_pools() {
        let (collector, source) = collector(FakeMetrics { by_contract: HashMap::new() });

        let first = collector.pool_stats(PoolListKind::Top).await.unwrap();
        let second = collector.pool_stats(PoolListKind::Top).await.unwrap();

        let addresses: Vec<_> = first.iter().map(|p| p.address.as_str()).collect();
        assert_eq!(addresses, vec!["0xa", "0xb"]);
        assert_eq!(first, second);
        assert_eq!(source.calls.load(Ordering::Relaxed), 1);
        assert_eq!(collector.get_stats().cache_hits.load(Ordering::Relaxed), 1);
        assert_eq!(collector.get_stats().pools_skipped.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn token_analytics_skips_failures_and_keeps_order() {
        let by_contract = HashMap::from([
            ("0x1".to_string(), metrics(1000.0)),
            ("0x2".to_string(), metrics(0.0)),
            ("0x4".to_string(), metrics(500.0)),
        ]);
        let (collector, _) = collector(FakeMetrics { by_contract });
        let holdings = [
            holding("0x1", "AAA"),
            holding("0x2", "BBB"),
            holding("0x3", "CCC"),
            holding("0x4", "DDD"),
        ];

        let analytics = collector.token_analytics(&holdings).await;

        let tokens: Vec<_> = analytics.iter().map(|a| a.token.as_str()).collect();
        assert_eq!(tokens, vec!["AAA", "DDD"]);
        assert_eq!(analytics[0].name, "AAA Token");
        assert!(analytics[0].signals.is_empty());
        // tvl doubled against its 30d baseline
        assert_eq!(analytics[1].signals[0].details["tvlGrowth30d"], 1.0);
        assert_eq!(collector.get_stats().tokens_skipped.load(Ordering::Relaxed), 2);
    }
}

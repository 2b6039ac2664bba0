use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};
use crate::models::RawPoolRecord;
use crate::sources::PoolListKind;

struct CachedList {
    pools: Arc<Vec<RawPoolRecord>>,
    fetched_at: Instant,
}

/// Raw provider pool listings with a short TTL. Stats are never cached, only their inputs.
pub struct PoolListCache {
    entries: DashMap<PoolListKind, CachedList>,
    ttl: Duration,
    last_cleanup: RwLock<Instant>,
}

impl PoolListCache {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Duration::from_secs(ttl_seconds),
            last_cleanup: RwLock::new(Instant::now()),
        }
    }

    /// Fresh listing, or `None` if absent or expired.
    pub fn get(&self, kind: PoolListKind) -> Option<Arc<Vec<RawPoolRecord>>> {
        let entry = self.entries.get(&kind)?;
        (entry.fetched_at.elapsed() < self.ttl).then(|| entry.pools.clone())
    }

    pub fn insert(&self, kind: PoolListKind, pools: Vec<RawPoolRecord>) -> Arc<Vec<RawPoolRecord>> {
        let pools = Arc::new(pools);
        self.entries.insert(kind, CachedList {
            pools: pools.clone(),
            fetched_at: Instant::now(),
        });
        pools
    }

    /// Drops expired listings, at most once a minute.
    pub fn cleanup_if_needed(&self) {
        let mut last_cleanup = self.last_cleanup.write();
        if last_cleanup.elapsed() < Duration::from_secs(60) {
            return;
        }

        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.fetched_at.elapsed() < self.ttl);
        let removed = before - self.entries.len();
        if removed > 0 {
            tracing::info!("Cleaned {} expired pool listings", removed);
        }

        *last_cleanup = Instant::now();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(address: &str) -> RawPoolRecord {
        RawPoolRecord { address: address.into(), ..Default::default() }
    }

    #[test]
    fn serves_fresh_listing_per_kind() {
        let cache = PoolListCache::new(60);
        cache.insert(PoolListKind::Top, vec![record("0x1"), record("0x2")]);
        assert_eq!(cache.get(PoolListKind::Top).unwrap().len(), 2);
        assert!(cache.get(PoolListKind::Trending).is_none());
    }

    #[test]
    fn zero_ttl_never_serves() {
        let cache = PoolListCache::new(0);
        cache.insert(PoolListKind::Top, vec![record("0x1")]);
        assert!(cache.get(PoolListKind::Top).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn insert_replaces_listing() {
        let cache = PoolListCache::new(60);
        cache.insert(PoolListKind::Top, vec![record("0x1")]);
        cache.insert(PoolListKind::Top, vec![record("0x2")]);
        let pools = cache.get(PoolListKind::Top).unwrap();
        assert_eq!(pools[0].address, "0x2");
        assert_eq!(cache.len(), 1);
    }
}

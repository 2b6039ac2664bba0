pub mod cache;
pub mod collector;
pub mod error;
pub mod pool_stats;
pub mod token_signals;

pub use cache::PoolListCache;
pub use collector::AnalyticsCollector;
pub use pool_stats::compute_pool_stats;
pub use token_signals::analyze_token_metrics;

pub mod number;
pub mod pool;
pub mod token;
pub mod wallet;

pub use number::RawNumber;
pub use pool::{PoolStats, RawPoolRecord};
pub use token::{RawTokenMetrics, SignalKind, TokenAnalytics, TokenSignal};
pub use wallet::TokenBalance;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;
use crate::models::RawNumber;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    #[error("division by zero: `{denominator}` is zero or missing")]
    DivisionByZero { denominator: &'static str },
    #[error("malformed input: `{field}` is missing or not a finite number")]
    MalformedInput { field: &'static str },
    #[error("`{quantity}` overflowed to a non-finite value")]
    NonFinite { quantity: &'static str },
}

/// Required numeric field.
pub fn require(field: &'static str, raw: &Option<RawNumber>) -> Result<f64, AnalyticsError> {
    raw.as_ref()
        .and_then(RawNumber::value)
        .ok_or(AnalyticsError::MalformedInput { field })
}

/// Required field used as a divisor: absent counts as zero.
pub fn denominator(field: &'static str, raw: &Option<RawNumber>) -> Result<f64, AnalyticsError> {
    if raw.is_none() {
        return Err(AnalyticsError::DivisionByZero { denominator: field });
    }
    require(field, raw)
}

/// Rejects values that overflowed to infinity or NaN.
pub fn finite(quantity: &'static str, value: f64) -> Result<f64, AnalyticsError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AnalyticsError::NonFinite { quantity })
    }
}

/// `numerator / denominator`, refusing a zero denominator and an overflowing quotient.
pub fn ratio(numerator: f64, denominator: f64, name: &'static str) -> Result<f64, AnalyticsError> {
    if denominator == 0.0 {
        return Err(AnalyticsError::DivisionByZero { denominator: name });
    }
    finite(name, numerator / denominator)
}

/// Rounds the exact binary value of `value` half away from zero, the way
/// `Number(x.toFixed(d))` does. Values outside `Decimal` range come back unrounded.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_string().parse::<f64>().ok())
        .unwrap_or(value)
}

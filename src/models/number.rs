use serde::{Deserialize, Serialize};

/// Numeric field as delivered by data providers: either a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    /// Finite value, or `None` for unparsable text / NaN / infinity.
    pub fn value(&self) -> Option<f64> {
        let v = match self {
            RawNumber::Number(n) => *n,
            RawNumber::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        v.is_finite().then_some(v)
    }
}

impl From<f64> for RawNumber {
    fn from(v: f64) -> Self {
        RawNumber::Number(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbers_and_numeric_strings() {
        let n: RawNumber = serde_json::from_str("12.5").unwrap();
        let s: RawNumber = serde_json::from_str("\" 3000000 \"").unwrap();
        assert_eq!(n.value(), Some(12.5));
        assert_eq!(s.value(), Some(3_000_000.0));
    }

    #[test]
    fn rejects_garbage_and_non_finite() {
        assert_eq!(RawNumber::Text("n/a".into()).value(), None);
        assert_eq!(RawNumber::Text("NaN".into()).value(), None);
        assert_eq!(RawNumber::Number(f64::INFINITY).value(), None);
    }
}

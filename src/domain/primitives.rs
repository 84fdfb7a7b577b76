//! Domain primitives: Timestamp, Address, Symbol.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Block time in seconds since Unix epoch.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn new(secs: i64) -> Self {
        Timestamp(secs)
    }

    pub fn as_secs(&self) -> i64 {
        self.0
    }

    /// Milliseconds elapsed from `earlier` to `self`.
    pub fn millis_since(&self, earlier: Timestamp) -> i64 {
        self.0.saturating_sub(earlier.0).saturating_mul(1000)
    }

    /// RFC 3339 rendering, or `None` when the value is out of chrono's range.
    pub fn to_rfc3339(&self) -> Option<String> {
        DateTime::<Utc>::from_timestamp(self.0, 0).map(|dt| dt.to_rfc3339())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Token mint address (base58 string).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub String);

impl Address {
    pub fn new(addr: impl Into<String>) -> Self {
        Address(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Token ticker symbol as reported by the indexer (e.g. "BONK", "USDC").
///
/// Equality is exact; exclusion matching folds case itself.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(pub String);

impl Symbol {
    pub fn new(symbol: impl Into<String>) -> Self {
        Symbol(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_millis_since() {
        let start = Timestamp::new(1_700_000_000);
        let end = Timestamp::new(1_700_000_090);
        assert_eq!(end.millis_since(start), 90_000);
    }

    #[test]
    fn test_timestamp_rfc3339() {
        let ts = Timestamp::new(0);
        assert_eq!(ts.to_rfc3339().as_deref(), Some("1970-01-01T00:00:00+00:00"));
    }

    #[test]
    fn test_millis_since_saturates_at_extremes() {
        assert_eq!(Timestamp::new(i64::MAX).millis_since(Timestamp::new(i64::MIN)), i64::MAX);
        assert_eq!(Timestamp::new(i64::MIN).millis_since(Timestamp::new(i64::MAX)), i64::MIN);
    }

    #[test]
    fn test_address_serializes_as_plain_string() {
        let addr = Address::new("So11111111111111111111111111111111111111112");
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"So11111111111111111111111111111111111111112\"");
    }
}

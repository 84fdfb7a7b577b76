//! Stable trade ordering for deterministic cycle reconstruction.

use crate::domain::Trade;
use std::cmp::Ordering;

/// Ordering key for trades.
///
/// Ordering: timestamp -> signature. Block times have one-second resolution, so several swaps
/// routinely share a timestamp; the signature makes the walk independent of input order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TradeOrderingKey<'a> {
    pub timestamp: i64,
    pub signature: &'a str,
}

impl<'a> TradeOrderingKey<'a> {
    pub fn from_trade(trade: &'a Trade) -> Self {
        TradeOrderingKey {
            timestamp: trade.timestamp.as_secs(),
            signature: &trade.signature,
        }
    }
}

pub fn compare_chronological(a: &Trade, b: &Trade) -> Ordering {
    TradeOrderingKey::from_trade(a).cmp(&TradeOrderingKey::from_trade(b))
}

/// Sort trades oldest first.
pub fn sort_trades_chronological<T: AsRef<Trade>>(trades: &mut [T]) {
    trades.sort_by(|a, b| compare_chronological(a.as_ref(), b.as_ref()));
}

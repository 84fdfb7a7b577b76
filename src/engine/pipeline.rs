//! End-to-end reconstruction: validate, group, build per asset, flatten.

use crate::domain::{Decimal, Trade};
use serde::Serialize;
use std::sync::Arc;

use super::{
    build_asset_cycles, flatten_cycles, group_by_asset, AssetCycles, AssetSummary, ExclusionList,
    FlattenedCycle, DEFAULT_DUST_THRESHOLD,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Balances strictly below this many raw units count as flat.
    pub dust_threshold: Decimal,
    pub exclusions: ExclusionList,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dust_threshold: Decimal::from(DEFAULT_DUST_THRESHOLD),
            exclusions: ExclusionList::new(),
        }
    }
}

/// A trade whose numbers cannot be trusted, dropped at validation or while building cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedTrade {
    pub signature: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    /// Per-asset cycle lists, in asset address order.
    pub assets: Vec<AssetCycles>,
    /// All cycles, globally numbered, newest first.
    pub flattened: Vec<FlattenedCycle>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedTrade>,
}

impl CycleReport {
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn summaries(&self) -> Vec<AssetSummary> {
        self.assets.iter().map(AssetSummary::from_cycles).collect()
    }
}

/// Stateless between runs; one engine can serve any number of wallets.
#[derive(Debug, Clone, Default)]
pub struct CycleEngine {
    config: EngineConfig,
}

impl CycleEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Reconstruct cycles from an unordered trade list.
    ///
    /// Never fails: malformed trades are reported in `rejected`, uninvolved or self-swap
    /// trades are skipped, and empty input gives an empty report. No deduplication by
    /// signature is performed.
    pub fn run(&self, trades: &[Trade]) -> CycleReport {
        let mut rejected = Vec::new();
        let accepted = trades.iter().filter_map(|trade| match trade.validate() {
            Ok(()) => Some(Arc::new(trade.clone())),
            Err(e) => {
                tracing::warn!(signature = %trade.signature, error = %e, "rejecting trade");
                rejected.push(RejectedTrade {
                    signature: trade.signature.clone(),
                    reason: e.to_string(),
                });
                None
            }
        });
        let buckets = group_by_asset(accepted);

        let mut assets = Vec::new();
        let mut refused = Vec::new();
        for (address, bucket) in buckets.iter() {
            match build_asset_cycles(
                address,
                bucket,
                &self.config.exclusions,
                self.config.dust_threshold,
                &mut refused,
            ) {
                Some(asset) => {
                    tracing::debug!(
                        asset = %asset.symbol,
                        address = %address,
                        cycles = asset.cycles.len(),
                        "built cycles"
                    );
                    assets.push(asset);
                }
                None => {
                    tracing::trace!(address = %address, trades = bucket.len(), "skipping bucket");
                }
            }
        }

        rejected.extend(refused.into_iter().map(|e| RejectedTrade {
            signature: e.signature().to_string(),
            reason: e.to_string(),
        }));

        let flattened = flatten_cycles(&assets);
        tracing::info!(
            trades = trades.len(),
            rejected = rejected.len(),
            assets = assets.len(),
            cycles = flattened.len(),
            "cycle reconstruction finished"
        );

        CycleReport {
            assets,
            flattened,
            rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Timestamp, Token};

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn buy(sig: &str, ts: i64, amount: &str, value: &str) -> Trade {
        Trade::new(
            sig,
            Timestamp::new(ts),
            Token::new("usdc", "USDC", 6),
            Token::new("bonk", "BONK", 5),
            d(value),
            d(amount),
            d("1"),
            d(value),
            "Jupiter",
        )
    }

    #[test]
    fn test_empty_input() {
        let report = CycleEngine::default().run(&[]);
        assert!(report.is_empty());
        assert!(report.flattened.is_empty());
        assert!(report.rejected.is_empty());
    }

    #[test]
    fn test_rejected_trades_do_not_reach_totals() {
        let mut bad = buy("bad", 5, "1000", "100");
        bad.value_usd = d("-100");
        let report = CycleEngine::default().run(&[bad, buy("good", 10, "2000", "50")]);

        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].signature, "bad");
        assert_eq!(report.assets.len(), 1);
        let cycle = &report.assets[0].cycles[0];
        assert_eq!(cycle.buys.len(), 1);
        assert_eq!(cycle.total_buy_value, d("50"));
    }

    #[test]
    fn test_amounts_beyond_token_limit_are_rejected() {
        let huge = "50000000000000000000000000000";
        let report = CycleEngine::default().run(&[
            buy("big1", 10, huge, "100"),
            buy("big2", 20, huge, "100"),
            buy("ok", 30, "2000", "50"),
        ]);

        let signatures: Vec<&str> = report.rejected.iter().map(|r| r.signature.as_str()).collect();
        assert_eq!(signatures, vec!["big1", "big2"]);
        assert_eq!(report.assets[0].cycles[0].total_buy_amount, d("2000"));
    }

    #[test]
    fn test_running_total_overflow_is_rejected_not_panicking() {
        // Each amount is within the token limit; only the USD totals overflow.
        let huge_value = "50000000000000000000000000000";
        let pricey = |sig: &str, ts: i64| {
            let mut trade = buy(sig, ts, "1000", "5");
            trade.value_usd = d(huge_value);
            trade
        };
        let report = CycleEngine::default().run(&[pricey("v1", 10), pricey("v2", 20)]);

        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].signature, "v2");
        assert!(report.rejected[0].reason.contains("overflowed"));
        let cycle = &report.assets[0].cycles[0];
        assert_eq!(cycle.buys.len(), 1);
        assert_eq!(cycle.total_buy_value, d(huge_value));
        assert_eq!(report.flattened.len(), 1);
    }

    #[test]
    fn test_custom_dust_threshold() {
        let config = EngineConfig {
            dust_threshold: d("5000"),
            ..EngineConfig::default()
        };
        let report = CycleEngine::new(config).run(&[buy("a", 10, "2000", "50")]);
        assert!(report.assets[0].cycles[0].is_complete);
    }

    #[test]
    fn test_extra_exclusion_drops_asset() {
        let config = EngineConfig {
            exclusions: ExclusionList::with_extra(["bonk"]),
            ..EngineConfig::default()
        };
        let report = CycleEngine::new(config).run(&[buy("a", 10, "2000", "50")]);
        assert!(report.is_empty());
    }

    #[test]
    fn test_report_serialization_omits_empty_rejected() {
        let report = CycleEngine::default().run(&[buy("a", 10, "2000", "50")]);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("rejected").is_none());
        assert_eq!(json["flattened"][0]["globalSequence"], serde_json::json!(1));
        assert_eq!(json["flattened"][0]["asset"], serde_json::json!("BONK"));
        assert_eq!(json["assets"][0]["cycles"][0]["endBalance"], serde_json::json!("2000"));
    }
}

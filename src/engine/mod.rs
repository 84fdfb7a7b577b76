//! Pure computation engine: swap stream in, position cycles out.

use crate::domain::{Address, Decimal, Symbol, Timestamp, Trade};
use serde::Serialize;
use std::sync::Arc;

pub mod classifier;
pub mod cycle_builder;
pub mod exclusion;
pub mod flatten;
pub mod grouper;
pub mod pipeline;
pub mod reconcile;
pub mod summary;

pub use classifier::{classify, Direction};
pub use cycle_builder::{build_asset_cycles, CycleBuilder, DEFAULT_DUST_THRESHOLD};
pub use exclusion::{is_excluded_asset, ExclusionList, DEFAULT_EXCLUDED_SYMBOLS};
pub use flatten::flatten_cycles;
pub use grouper::{group_by_asset, AssetBuckets};
pub use pipeline::{CycleEngine, CycleReport, EngineConfig, RejectedTrade};
pub use reconcile::{reconcile, ReconciledCycle};
pub use summary::AssetSummary;

/// One position cycle in a single asset: opened from a flat balance, closed when the balance
/// returns below the dust threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cycle {
    /// Stable identifier derived from asset, sequence and opening trade.
    pub cycle_key: String,
    /// 1-based, increasing within one asset.
    pub sequence: u32,
    pub asset: Symbol,
    pub asset_address: Address,
    pub buys: Vec<Arc<Trade>>,
    pub sells: Vec<Arc<Trade>>,
    pub total_buy_amount: Decimal,
    pub total_sell_amount: Decimal,
    #[serde(rename = "totalBuyValueUSD")]
    pub total_buy_value: Decimal,
    #[serde(rename = "totalSellValueUSD")]
    pub total_sell_value: Decimal,
    /// Running balance carried into the cycle when it opened.
    pub start_balance: Decimal,
    pub end_balance: Decimal,
    pub profit_loss: Decimal,
    pub is_complete: bool,
    pub start_date: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Timestamp>,
    /// `(end_date - start_date)` in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
}

impl Cycle {
    pub fn trade_count(&self) -> usize {
        self.buys.len() + self.sells.len()
    }

    pub fn is_open(&self) -> bool {
        !self.is_complete
    }
}

/// All cycles for one asset, in sequence order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetCycles {
    pub asset_address: Address,
    pub symbol: Symbol,
    pub cycles: Vec<Cycle>,
}

impl AssetCycles {
    /// The most recent cycle, which is the only one that can still be open.
    pub fn latest(&self) -> Option<&Cycle> {
        self.cycles.last()
    }
}

/// A cycle tagged with its position in the unified, cross-asset list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenedCycle {
    pub global_sequence: u32,
    #[serde(flatten)]
    pub cycle: Cycle,
}

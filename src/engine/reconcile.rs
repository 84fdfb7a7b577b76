//! Display-side reconciliation of trade-derived balances against authoritative ones.
//!
//! The engine's completion signal comes only from swap history; tokens moved by transfers,
//! airdrops or burns never show up there. A balance source can correct the latest cycle of
//! each asset for display. Engine output is never modified.

use crate::datasource::BalanceSource;
use crate::domain::{Address, Decimal, Symbol};
use serde::Serialize;

use super::AssetCycles;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledCycle {
    pub cycle_key: String,
    pub sequence: u32,
    pub asset: Symbol,
    pub asset_address: Address,
    pub trade_end_balance: Decimal,
    pub trade_complete: bool,
    pub display_end_balance: Decimal,
    pub display_complete: bool,
    /// True when an authoritative balance was applied to this cycle.
    pub authoritative: bool,
    /// True when the authoritative completion differs from the trade-derived one.
    pub disagrees: bool,
}

pub fn reconcile(
    assets: &[AssetCycles],
    balances: &dyn BalanceSource,
    dust_threshold: Decimal,
) -> Vec<ReconciledCycle> {
    let mut out = Vec::new();

    for asset in assets {
        let latest_sequence = asset.latest().map(|c| c.sequence);
        let live_balance = balances.balance_of(&asset.asset_address);

        for cycle in &asset.cycles {
            let mut row = ReconciledCycle {
                cycle_key: cycle.cycle_key.clone(),
                sequence: cycle.sequence,
                asset: cycle.asset.clone(),
                asset_address: cycle.asset_address.clone(),
                trade_end_balance: cycle.end_balance,
                trade_complete: cycle.is_complete,
                display_end_balance: cycle.end_balance,
                display_complete: cycle.is_complete,
                authoritative: false,
                disagrees: false,
            };

            if Some(cycle.sequence) == latest_sequence {
                if let Some(balance) = live_balance {
                    row.display_end_balance = balance;
                    row.display_complete = balance.is_dust(dust_threshold);
                    row.authoritative = true;
                    row.disagrees = row.display_complete != row.trade_complete;
                    if row.disagrees {
                        tracing::debug!(
                            asset = %cycle.asset,
                            sequence = cycle.sequence,
                            trade_balance = %cycle.end_balance,
                            live_balance = %balance,
                            "authoritative balance disagrees with trade history"
                        );
                    }
                }
            }

            out.push(row);
        }
    }

    out
}

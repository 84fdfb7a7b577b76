//! Per-asset roll-up of reconstructed cycles.

use crate::domain::{Address, Decimal, Symbol, Timestamp};
use serde::Serialize;

use super::AssetCycles;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSummary {
    pub asset_address: Address,
    pub symbol: Symbol,
    pub cycle_count: usize,
    pub complete_count: usize,
    pub open_count: usize,
    /// Complete cycles that closed with positive P&L.
    pub win_count: usize,
    #[serde(rename = "totalBuyValueUSD")]
    pub total_buy_value: Decimal,
    #[serde(rename = "totalSellValueUSD")]
    pub total_sell_value: Decimal,
    /// Sum of P&L over complete cycles only.
    pub realized_pnl: Decimal,
    /// USD spent on buys in cycles that are still open.
    pub open_cost: Decimal,
    pub first_activity: Option<Timestamp>,
    pub last_activity: Option<Timestamp>,
}

impl AssetSummary {
    pub fn from_cycles(asset: &AssetCycles) -> Self {
        let cycles = &asset.cycles;
        let complete = || cycles.iter().filter(|c| c.is_complete);
        let open = || cycles.iter().filter(|c| c.is_open());

        let last_activity = cycles
            .iter()
            .flat_map(|c| c.buys.iter().chain(c.sells.iter()))
            .map(|t| t.timestamp)
            .max();

        AssetSummary {
            asset_address: asset.asset_address.clone(),
            symbol: asset.symbol.clone(),
            cycle_count: cycles.len(),
            complete_count: complete().count(),
            open_count: open().count(),
            win_count: complete().filter(|c| c.profit_loss.is_positive()).count(),
            total_buy_value: cycles.iter().map(|c| c.total_buy_value).sum(),
            total_sell_value: cycles.iter().map(|c| c.total_sell_value).sum(),
            realized_pnl: complete().map(|c| c.profit_loss).sum(),
            open_cost: open().map(|c| c.total_buy_value).sum(),
            first_activity: cycles.first().map(|c| c.start_date),
            last_activity,
        }
    }
}

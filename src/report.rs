//! JSON document printed by the CLI.

use crate::config::OutputMode;
use crate::datasource::BalanceSource;
use crate::domain::{Address, Decimal, Symbol};
use crate::engine::{
    reconcile, AssetSummary, Cycle, CycleReport, FlattenedCycle, ReconciledCycle, RejectedTrade,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<Vec<AssetSection>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycles: Option<Vec<CycleRowDto>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedTrade>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSection {
    pub summary: AssetSummary,
    pub cycles: Vec<Cycle>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reconciled: Vec<ReconciledCycle>,
}

/// Flat row for list rendering; trades are reduced to counts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleRowDto {
    pub global_sequence: u32,
    pub sequence: u32,
    pub cycle_key: String,
    pub asset: Symbol,
    pub asset_address: Address,
    pub buy_count: usize,
    pub sell_count: usize,
    #[serde(rename = "totalBuyValueUSD")]
    pub total_buy_value: Decimal,
    #[serde(rename = "totalSellValueUSD")]
    pub total_sell_value: Decimal,
    pub profit_loss: Decimal,
    pub end_balance: Decimal,
    pub is_complete: bool,
    pub start_date: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date_iso: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date_iso: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
}

impl From<&FlattenedCycle> for CycleRowDto {
    fn from(entry: &FlattenedCycle) -> Self {
        let c = &entry.cycle;
        CycleRowDto {
            global_sequence: entry.global_sequence,
            sequence: c.sequence,
            cycle_key: c.cycle_key.clone(),
            asset: c.asset.clone(),
            asset_address: c.asset_address.clone(),
            buy_count: c.buys.len(),
            sell_count: c.sells.len(),
            total_buy_value: c.total_buy_value,
            total_sell_value: c.total_sell_value,
            profit_loss: c.profit_loss,
            end_balance: c.end_balance,
            is_complete: c.is_complete,
            start_date: c.start_date.as_secs(),
            start_date_iso: c.start_date.to_rfc3339(),
            end_date_iso: c.end_date.and_then(|t| t.to_rfc3339()),
            duration_ms: c.duration_ms,
        }
    }
}

pub fn build_document(
    report: &CycleReport,
    mode: OutputMode,
    balances: Option<&dyn BalanceSource>,
    dust_threshold: Decimal,
) -> ReportDocument {
    let include_assets = matches!(mode, OutputMode::Assets | OutputMode::Full);
    let include_cycles = matches!(mode, OutputMode::Flattened | OutputMode::Full);

    let assets = include_assets.then(|| {
        report
            .assets
            .iter()
            .map(|asset| AssetSection {
                summary: AssetSummary::from_cycles(asset),
                cycles: asset.cycles.clone(),
                reconciled: balances
                    .map(|b| reconcile(std::slice::from_ref(asset), b, dust_threshold))
                    .unwrap_or_default(),
            })
            .collect()
    });

    let cycles =
        include_cycles.then(|| report.flattened.iter().map(CycleRowDto::from).collect());

    ReportDocument {
        assets,
        cycles,
        rejected: report.rejected.clone(),
    }
}

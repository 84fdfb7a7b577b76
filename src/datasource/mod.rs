//! Inputs from outside the engine: trade exports and authoritative balances.

use crate::domain::{Address, Decimal, Trade};
use std::fmt;
use std::path::Path;
use thiserror::Error;

pub mod balances;
pub mod trades;

pub use balances::{load_balances_json, StaticBalances};
pub use trades::{load_trades_csv, load_trades_json};

/// Supplies the current on-chain balance of an asset, in raw base units.
///
/// Implementations are expected to be cheap lookups; fetching happens elsewhere.
pub trait BalanceSource: Send + Sync + fmt::Debug {
    /// `None` when the balance is unknown, which is different from a zero balance.
    fn balance_of(&self, asset: &Address) -> Option<Decimal>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("io error reading {path}: {message}")]
    Io { path: String, message: String },
    #[error("json parse error: {0}")]
    Json(String),
    #[error("csv parse error: {0}")]
    Csv(String),
    #[error("invalid {field}: {message}")]
    InvalidField { field: String, message: String },
    #[error("unsupported trade file format: {0}")]
    UnsupportedFormat(String),
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Json(err.to_string())
    }
}

impl From<csv::Error> for SourceError {
    fn from(err: csv::Error) -> Self {
        SourceError::Csv(err.to_string())
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, SourceError> {
    std::fs::read(path).map_err(|e| SourceError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Load trades from a `.json` or `.csv` export, chosen by file extension.
pub fn load_trades_path(path: &Path) -> Result<Vec<Trade>, SourceError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("json") => load_trades_json(&read_file(path)?),
        Some("csv") => load_trades_csv(&read_file(path)?),
        _ => Err(SourceError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Load a `{address: rawAmount}` JSON file into a [`StaticBalances`].
pub fn load_balances_path(path: &Path) -> Result<StaticBalances, SourceError> {
    load_balances_json(&read_file(path)?)
}

//! Direction of a swap from the point of view of one tracked asset.

use crate::domain::{Address, Trade};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// The asset was received (token-out side).
    Buy,
    /// The asset was given away (token-in side).
    Sell,
    /// The asset is absent, or present on both sides of a self swap.
    NotInvolved,
}

impl Direction {
    pub fn is_involved(&self) -> bool {
        !matches!(self, Direction::NotInvolved)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Buy => write!(f, "buy"),
            Direction::Sell => write!(f, "sell"),
            Direction::NotInvolved => write!(f, "not-involved"),
        }
    }
}

pub fn classify(trade: &Trade, asset: &Address) -> Direction {
    let received = &trade.token_out.address == asset;
    let given = &trade.token_in.address == asset;

    match (received, given) {
        (true, true) => Direction::NotInvolved,
        (true, false) => Direction::Buy,
        (false, true) => Direction::Sell,
        (false, false) => Direction::NotInvolved,
    }
}

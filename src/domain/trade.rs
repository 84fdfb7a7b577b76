//! Swap trade record as supplied by the indexing layer.

use crate::domain::{Address, Decimal, Symbol, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest raw amount an SPL token account can hold (`u64::MAX` base units).
pub const MAX_RAW_AMOUNT: u64 = u64::MAX;

/// One side of a swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub address: Address,
    pub symbol: Symbol,
    pub decimals: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Token {
    pub fn new(address: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Token {
            address: Address::new(address),
            symbol: Symbol::new(symbol),
            decimals,
            name: None,
        }
    }
}

/// A single swap: `amount_in` of `token_in` given away for `amount_out` of `token_out`.
///
/// Trades are immutable once constructed. Deduplication by `signature` is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    /// Transaction signature; unique per trade.
    pub signature: String,
    pub timestamp: Timestamp,
    pub token_in: Token,
    pub token_out: Token,
    /// Raw base units of `token_in`.
    pub amount_in: Decimal,
    /// Raw base units of `token_out`.
    pub amount_out: Decimal,
    #[serde(rename = "priceUSD")]
    pub price_usd: Decimal,
    #[serde(rename = "valueUSD")]
    pub value_usd: Decimal,
    /// DEX or aggregator label (e.g. "Jupiter").
    #[serde(default)]
    pub venue: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TradeError {
    #[error("trade has an empty signature")]
    MissingSignature,
    #[error("negative {field} on trade {signature}: {value}")]
    NegativeValue {
        signature: String,
        field: &'static str,
        value: Decimal,
    },
    #[error("{field} on trade {signature} exceeds the token amount limit: {value}")]
    AmountOutOfRange {
        signature: String,
        field: &'static str,
        value: Decimal,
    },
    #[error("running {field} overflowed at trade {signature}")]
    Overflow {
        signature: String,
        field: &'static str,
    },
}

impl TradeError {
    /// Signature of the offending trade; empty for `MissingSignature`.
    pub fn signature(&self) -> &str {
        match self {
            TradeError::MissingSignature => "",
            TradeError::NegativeValue { signature, .. }
            | TradeError::AmountOutOfRange { signature, .. }
            | TradeError::Overflow { signature, .. } => signature,
        }
    }
}

impl Trade {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        signature: impl Into<String>,
        timestamp: Timestamp,
        token_in: Token,
        token_out: Token,
        amount_in: Decimal,
        amount_out: Decimal,
        price_usd: Decimal,
        value_usd: Decimal,
        venue: impl Into<String>,
    ) -> Self {
        Trade {
            signature: signature.into(),
            timestamp,
            token_in,
            token_out,
            amount_in,
            amount_out,
            price_usd,
            value_usd,
            venue: venue.into(),
        }
    }

    /// Symbol of `asset` if it appears on either side of this swap.
    pub fn symbol_of(&self, asset: &Address) -> Option<&Symbol> {
        if &self.token_out.address == asset {
            Some(&self.token_out.symbol)
        } else if &self.token_in.address == asset {
            Some(&self.token_in.symbol)
        } else {
            None
        }
    }

    /// Reject records whose numbers cannot be folded into cycle totals.
    pub fn validate(&self) -> Result<(), TradeError> {
        if self.signature.trim().is_empty() {
            return Err(TradeError::MissingSignature);
        }

        let fields = [
            ("amountIn", self.amount_in),
            ("amountOut", self.amount_out),
            ("priceUSD", self.price_usd),
            ("valueUSD", self.value_usd),
        ];
        for (field, value) in fields {
            if value.is_negative() {
                return Err(TradeError::NegativeValue {
                    signature: self.signature.clone(),
                    field,
                    value,
                });
            }
        }

        let limit = Decimal::from(MAX_RAW_AMOUNT);
        for (field, value) in [("amountIn", self.amount_in), ("amountOut", self.amount_out)] {
            if value > limit {
                return Err(TradeError::AmountOutOfRange {
                    signature: self.signature.clone(),
                    field,
                    value,
                });
            }
        }

        Ok(())
    }
}

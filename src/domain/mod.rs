//! Domain types for swap-cycle reconstruction.
//!
//! This module provides:
//! - Lossless numeric handling via the Decimal wrapper
//! - Domain primitives: Timestamp, Address, Symbol
//! - The immutable Trade record and its validation
//! - Stable trade ordering for deterministic processing

pub mod decimal;
pub mod ordering;
pub mod primitives;
pub mod trade;

pub use decimal::Decimal;
pub use ordering::TradeOrderingKey;
pub use primitives::{Address, Symbol, Timestamp};
pub use trade::{Token, Trade, TradeError, MAX_RAW_AMOUNT};

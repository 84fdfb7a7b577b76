pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod report;

pub use config::Config;
pub use datasource::{BalanceSource, SourceError, StaticBalances};
pub use domain::{Address, Decimal, Symbol, Timestamp, Token, Trade, TradeError};
pub use engine::{
    AssetCycles, Cycle, CycleEngine, CycleReport, Direction, EngineConfig, FlattenedCycle,
};
pub use error::AppError;

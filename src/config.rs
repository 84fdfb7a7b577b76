use crate::domain::Decimal;
use crate::engine::{EngineConfig, ExclusionList, DEFAULT_DUST_THRESHOLD};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub trades_path: PathBuf,
    pub balances_path: Option<PathBuf>,
    pub dust_threshold: Decimal,
    pub extra_excluded_symbols: Vec<String>,
    pub output: OutputMode,
}

/// Which parts of the report the CLI prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Per-asset cycle lists with summaries.
    Assets,
    /// The unified, newest-first list.
    Flattened,
    Full,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let trades_path = env_map
            .get("TRADES_PATH")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError::MissingEnv("TRADES_PATH".to_string()))?;

        let balances_path = env_map
            .get("BALANCES_PATH")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let dust_threshold = match env_map.get("DUST_THRESHOLD") {
            Some(raw) => {
                let value = Decimal::from_str_canonical(raw).map_err(|_| {
                    ConfigError::InvalidValue(
                        "DUST_THRESHOLD".to_string(),
                        "must be a decimal number".to_string(),
                    )
                })?;
                if !value.is_positive() {
                    return Err(ConfigError::InvalidValue(
                        "DUST_THRESHOLD".to_string(),
                        format!("must be > 0, got {}", value),
                    ));
                }
                value
            }
            None => Decimal::from(DEFAULT_DUST_THRESHOLD),
        };

        let extra_excluded_symbols = env_map
            .get("EXCLUDED_SYMBOLS")
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let output = match env_map
            .get("OUTPUT")
            .map(|s| s.as_str())
            .unwrap_or("full")
        {
            "assets" => OutputMode::Assets,
            "flattened" => OutputMode::Flattened,
            "full" => OutputMode::Full,
            other => {
                return Err(ConfigError::InvalidValue(
                    "OUTPUT".to_string(),
                    format!("must be assets, flattened, or full, got {}", other),
                ))
            }
        };

        Ok(Config {
            trades_path,
            balances_path,
            dust_threshold,
            extra_excluded_symbols,
            output,
        })
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            dust_threshold: self.dust_threshold,
            exclusions: ExclusionList::with_extra(&self.extra_excluded_symbols),
        }
    }
}

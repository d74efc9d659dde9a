//! Runtime configuration from a JSON file or environment variables.

use lottery_executor::{ChainMode, ConfigError, LotteryConfig};
use lottery_history::{HistoryConfig, HistoryError};
use serde::{Deserialize, Serialize};
use shared_types::Address;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Execution address the lottery's ledger accounts are scoped to.
pub const DEFAULT_EXEC_ADDRESS: &str = "lottery";

/// Rejected or unreadable runtime configuration.
#[derive(Debug, Error)]
pub enum RuntimeConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid value for {var}: {value}")]
    InvalidVar { var: &'static str, value: String },

    #[error(transparent)]
    Lottery(#[from] ConfigError),

    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Configuration of a lottery node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub lottery: LotteryConfig,
    pub history: HistoryConfig,
    /// Log filter used when `RUST_LOG` is unset (default: info)
    pub log_level: String,
    /// Emit JSON log lines
    pub json_logs: bool,
    /// Directory for persistent stores; in-memory when `None`
    pub data_dir: Option<PathBuf>,
    /// Seeded into the managed creator allow-list at start-up
    pub creator_allow_list: Vec<Address>,
    pub exec_address: Address,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            lottery: LotteryConfig::default(),
            history: HistoryConfig::default(),
            log_level: "info".to_string(),
            json_logs: false,
            data_dir: None,
            creator_allow_list: Vec::new(),
            exec_address: Address::from(DEFAULT_EXEC_ADDRESS),
        }
    }
}

impl RuntimeConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RuntimeConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read(path).map_err(|source| RuntimeConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_slice(&raw).map_err(|source| RuntimeConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `LOTTERY_LOG_LEVEL`: Log filter (default: info)
    /// - `LOTTERY_JSON_LOGS`: Emit JSON logs (default: false)
    /// - `LOTTERY_DATA_DIR`: Persistent store directory (default: in-memory)
    /// - `LOTTERY_CREATORS`: Comma-separated creator allow-list
    /// - `LOTTERY_EXEC_ADDRESS`: Ledger execution scope (default: lottery)
    /// - `LOTTERY_CLOSE_ENABLED`: Accept close actions (default: true)
    /// - `LOTTERY_CHAIN_MODE`: `main` or `parachain` (default: main)
    /// - `LOTTERY_OP_REWARD_ADDR` / `LOTTERY_DEV_REWARD_ADDR`: Share receivers
    /// - `LOTTERY_HISTORY_MAX_COUNT`: Largest history page (default: 100)
    pub fn from_env() -> Result<Self, RuntimeConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Same as [`RuntimeConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, RuntimeConfigError> {
        let mut config = Self::default();

        if let Some(level) = lookup("LOTTERY_LOG_LEVEL") {
            config.log_level = level;
        }
        if let Some(value) = lookup("LOTTERY_JSON_LOGS") {
            config.json_logs = parse_bool("LOTTERY_JSON_LOGS", &value)?;
        }
        if let Some(dir) = lookup("LOTTERY_DATA_DIR") {
            config.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(list) = lookup("LOTTERY_CREATORS") {
            config.creator_allow_list = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(Address::from)
                .collect();
        }
        if let Some(exec) = lookup("LOTTERY_EXEC_ADDRESS") {
            config.exec_address = Address::from(exec);
        }
        if let Some(value) = lookup("LOTTERY_CLOSE_ENABLED") {
            config.lottery.close_enabled = parse_bool("LOTTERY_CLOSE_ENABLED", &value)?;
        }
        if let Some(mode) = lookup("LOTTERY_CHAIN_MODE") {
            config.lottery.chain_mode = match mode.to_ascii_lowercase().as_str() {
                "main" => ChainMode::Main,
                "parachain" => ChainMode::Parachain,
                _ => {
                    return Err(RuntimeConfigError::InvalidVar {
                        var: "LOTTERY_CHAIN_MODE",
                        value: mode,
                    })
                }
            };
        }
        if let Some(addr) = lookup("LOTTERY_OP_REWARD_ADDR") {
            config.lottery.op_reward_addr = Address::from(addr);
        }
        if let Some(addr) = lookup("LOTTERY_DEV_REWARD_ADDR") {
            config.lottery.dev_reward_addr = Address::from(addr);
        }
        if let Some(value) = lookup("LOTTERY_HISTORY_MAX_COUNT") {
            config.history.max_count =
                value.parse().map_err(|_| RuntimeConfigError::InvalidVar {
                    var: "LOTTERY_HISTORY_MAX_COUNT",
                    value,
                })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RuntimeConfigError> {
        self.lottery.validate()?;
        self.history.validate()?;
        Ok(())
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, RuntimeConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(RuntimeConfigError::InvalidVar {
            var,
            value: value.to_string(),
        }),
    }
}

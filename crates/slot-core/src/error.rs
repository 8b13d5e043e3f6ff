//! Error types for the slot core

use thiserror::Error;

/// Spin generation failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpinError {
    #[error("Symbol table is empty")]
    EmptySymbolTable,

    #[error("Cannot draw {rows} symbols without replacement from a pool of {pool}")]
    PoolExhausted { rows: usize, pool: usize },
}

/// Session operation failure
///
/// Every variant is recoverable: the operation that produced it left the
/// session untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("Not enough balance: spin costs ${required}, balance is ${balance}")]
    InsufficientBalance { required: u64, balance: u64 },

    #[error("Invalid number of lines '{input}' (expected 1-{max})")]
    InvalidLineCount { input: String, max: u32 },

    #[error("Invalid bet '{input}' (expected {min}-{max})")]
    InvalidBetAmount { input: String, min: u64, max: u64 },

    #[error("Invalid top-up amount '{input}' (expected a positive whole number)")]
    InvalidTopUpAmount { input: String },

    #[error("Balance overflow: ${balance} cannot absorb winnings of ${winnings} on a ${required} bet")]
    BalanceOverflow { balance: u64, required: u64, winnings: u64 },

    #[error("Spin failed: {0}")]
    Spin(#[from] SpinError),
}

/// Configuration loading / validation failure
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid config: {0}")]
    Validation(String),
}

/// Result type alias
pub type SlotResult<T> = Result<T, SlotError>;

//! Error types for the sweeper

use thiserror::Error;

/// Result type alias for sweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Failure of a single sweep attempt or of the chain connection.
///
/// Every variant carries the underlying message, so `to_string()` is always
/// a usable log line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SweepError {
    #[error("Balance query failed: {0}")]
    BalanceQuery(String),

    #[error("Gas price query failed: {0}")]
    GasPriceQuery(String),

    #[error("Nonce query failed: {0}")]
    NonceQuery(String),

    #[error("Transaction build failed: {0}")]
    TransactionBuild(String),

    #[error("Transaction send failed: {0}")]
    TransactionSend(String),

    #[error("RPC connection failed: {0}")]
    Connection(String),

    #[error("Block subscription failed: {0}")]
    Subscription(String),
}

impl SweepError {
    /// True when the attempt got as far as building or broadcasting a transaction
    pub fn is_submission(&self) -> bool {
        matches!(
            self,
            SweepError::NonceQuery(_)
                | SweepError::TransactionBuild(_)
                | SweepError::TransactionSend(_)
        )
    }
}

/// Startup configuration problems. All of them are fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Must provide {var} environment variable{hint}")]
    MissingEnvVar { var: &'static str, hint: &'static str },

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Invalid receiver address {address}: {reason}")]
    InvalidReceiver { address: String, reason: String },
}

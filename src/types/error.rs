use thiserror::Error;

/// gofinances error types
#[derive(Error, Debug)]
pub enum GoFinancesError {
    /// A stored record has an amount or date that cannot be read
    #[error("malformed record {id}: {reason}")]
    MalformedRecord { id: String, reason: String },

    /// Failed to parse stored JSON
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage operation failed
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// A new transaction was rejected at creation time
    #[error("invalid transaction: {0}")]
    Validation(String),
}

impl GoFinancesError {
    pub fn malformed(id: &str, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for gofinances
pub type Result<T> = std::result::Result<T, GoFinancesError>;

//! Type definitions for gofinances

mod dashboard;
mod error;
mod transaction;

pub use dashboard::*;
pub use error::*;
pub use transaction::*;

use serde::Serialize;
use std::fmt;

/// Non-fatal conditions found while aggregating
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AggregationWarning {
    /// A record's `type` is neither "positive" nor "negative"; counted as an expense
    UnknownCategoryType { id: String, value: String },
}

impl fmt::Display for AggregationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCategoryType { id, value } => write!(
                f,
                "record {} has unknown type \"{}\", counted as an expense",
                id, value
            ),
        }
    }
}

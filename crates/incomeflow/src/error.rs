//! Error types for reconciliation.

use incomeflow_data::DataError;
use incomeflow_valuation::ValuationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for reconciliation.
pub type Result<T> = std::result::Result<T, ReconcileError>;

/// One source that was tried and could not supply a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceAttempt {
    /// Source name
    pub source: String,
    /// Why it could not supply the symbol
    pub reason: String,
}

impl std::fmt::Display for SourceAttempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.source, self.reason)
    }
}

fn join_attempts(attempts: &[SourceAttempt]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur while reconciling a symbol.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Every source was tried and none could supply the symbol
    #[error("{symbol} is not supported ({})", join_attempts(.attempts))]
    NotSupported {
        /// Symbol requested
        symbol: String,
        /// Each source tried, in order
        attempts: Vec<SourceAttempt>,
    },

    /// The symbol is empty or malformed
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Hard failure from an upstream client
    #[error(transparent)]
    Data(#[from] DataError),

    /// Valuation computation failure
    #[error(transparent)]
    Valuation(#[from] ValuationError),
}

impl ReconcileError {
    /// Returns true if the request should end in the "Not Supported" state
    /// rather than an error.
    pub const fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported { .. } | Self::InvalidSymbol(_))
    }
}

//! Error types for valuation computations.

use thiserror::Error;

/// Result type for valuation computations.
pub type Result<T> = std::result::Result<T, ValuationError>;

/// Errors that can occur while computing trailing EPS or valuation bands.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValuationError {
    /// A rolling window of zero was requested
    #[error("Invalid window: {0}")]
    InvalidWindow(usize),

    /// Fewer input values than the computation needs
    #[error("Insufficient data: need {needed}, got {got}")]
    InsufficientData {
        /// Number of values needed
        needed: usize,
        /// Number of values available
        got: usize,
    },

    /// Band count that cannot span a range
    #[error("Invalid band count: {0} (need at least 2)")]
    InvalidBandCount(usize),
}

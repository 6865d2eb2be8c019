//! Trailing-twelve-month sums.

use crate::error::{Result, ValuationError};

/// Quarters in a trailing-twelve-month window.
pub const TTM_QUARTERS: usize = 4;

/// Rolling sum over `window` consecutive values.
///
/// Element `i` of the result is `values[i] + ... + values[i + window - 1]`,
/// so the output is `window - 1` shorter than the input: the leading values
/// only seed the first window.
///
/// # Errors
/// Returns `ValuationError::InvalidWindow` for a zero window and
/// `ValuationError::InsufficientData` if there are fewer values than
/// `window`.
pub fn trailing_sum(values: &[f64], window: usize) -> Result<Vec<f64>> {
    if window == 0 {
        return Err(ValuationError::InvalidWindow(window));
    }
    if values.len() < window {
        return Err(ValuationError::InsufficientData {
            needed: window,
            got: values.len(),
        });
    }

    Ok(values
        .windows(window)
        .map(|w| w.iter().sum())
        .collect())
}

/// Trailing-twelve-month EPS from chronological quarterly EPS.
pub fn trailing_eps(quarterly_eps: &[f64]) -> Result<Vec<f64>> {
    trailing_sum(quarterly_eps, TTM_QUARTERS)
}

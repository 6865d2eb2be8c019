//! Market classification of ticker symbols.

use crate::error::{DataError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Market a symbol trades on, inferred from its first character.
///
/// Alphabetic tickers (`AAPL`, `TSLA`) are US listings; numeric codes
/// (`2330`) are Taiwan listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    /// US-listed ticker
    Us,
    /// Taiwan-listed stock code
    Tw,
}

impl Market {
    /// Classify a symbol.
    ///
    /// # Errors
    /// Returns `DataError::InvalidSymbol` for an empty or blank symbol.
    pub fn from_symbol(symbol: &str) -> Result<Self> {
        match symbol.trim().chars().next() {
            Some(c) if c.is_alphabetic() => Ok(Self::Us),
            Some(_) => Ok(Self::Tw),
            None => Err(DataError::InvalidSymbol("Empty symbol".to_string())),
        }
    }

    /// Market code understood by the price service.
    pub const fn price_code(&self) -> &'static str {
        match self {
            Self::Us => "u",
            Self::Tw => "t",
        }
    }

    /// Timezone that defines the trading calendar day.
    pub const fn timezone(&self) -> Tz {
        match self {
            // Fixed UTC-5, no daylight saving.
            Self::Us => chrono_tz::Etc::GMTPlus5,
            Self::Tw => chrono_tz::Asia::Taipei,
        }
    }

    /// Calendar date in this market at the given instant.
    pub fn date_at(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.timezone()).date_naive()
    }

    /// Today's calendar date in this market.
    pub fn today(&self) -> NaiveDate {
        self.date_at(Utc::now())
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Us => write!(f, "US"),
            Self::Tw => write!(f, "TW"),
        }
    }
}

/// Trim and upper-case a user supplied symbol.
///
/// # Errors
/// Returns `DataError::InvalidSymbol` if nothing is left after trimming.
pub fn normalize_symbol(symbol: &str) -> Result<String> {
    let trimmed = symbol.trim();
    if trimmed.is_empty() {
        return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
    }
    Ok(trimmed.to_uppercase())
}

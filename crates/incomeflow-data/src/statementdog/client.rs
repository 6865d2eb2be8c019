//! StatementDog fundamentals API client.

use super::fundamentals::DogFundamentals;
use crate::BROWSER_USER_AGENT;
use crate::error::{DataError, Result};
use crate::http::{build_client, trim_base_url};
use chrono::{Datelike, Duration, NaiveDate};

/// Fundamentals site base URL
const STATEMENTDOG_BASE_URL: &str = "https://statementdog.com";

/// Approximate length of a quarter in days.
const DAYS_PER_QUARTER: i64 = 91;

/// First and last calendar year covering `quarters` quarters back from `today`.
pub fn year_window(today: NaiveDate, quarters: usize) -> (i32, i32) {
    let quarters = i64::try_from(quarters).unwrap_or(i64::MAX / DAYS_PER_QUARTER);
    let start = today - Duration::days(quarters * DAYS_PER_QUARTER);
    (start.year(), today.year())
}

/// Client for the fundamentals endpoint.
///
/// The site rejects non-browser clients, so requests carry a desktop
/// browser user agent.
pub struct StatementDogClient {
    client: reqwest::Client,
    base_url: String,
}

impl StatementDogClient {
    /// Create a client with the default browser user agent.
    pub fn new() -> Result<Self> {
        Self::with_user_agent(BROWSER_USER_AGENT)
    }

    /// Create a client with a custom user agent.
    pub fn with_user_agent(user_agent: &str) -> Result<Self> {
        Ok(Self {
            client: build_client(user_agent)?,
            base_url: STATEMENTDOG_BASE_URL.to_string(),
        })
    }

    /// Point the client at another host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = trim_base_url(base_url);
        self
    }

    /// Fetch fundamentals between two calendar years (inclusive).
    ///
    /// # Errors
    /// Bodies that are not a fundamentals document are reported as
    /// `DataError::NotSupported`.
    pub async fn fetch_fundamentals(
        &self,
        symbol: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<DogFundamentals> {
        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        let url = format!(
            "{}/api/v2/fundamentals/{}/{}/{}",
            self.base_url, symbol, start_year, end_year
        );
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(%status, symbol, "fundamentals request failed");
        }

        DogFundamentals::parse(&body)
    }
}

impl std::fmt::Debug for StatementDogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatementDogClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_window() {
        let today = NaiveDate::from_ymd_opt(2024, 10, 19).unwrap();
        // 12 quarters * 91 days = 1092 days back lands in late 2021.
        assert_eq!(year_window(today, 12), (2021, 2024));
        assert_eq!(year_window(today, 0), (2024, 2024));
    }
}

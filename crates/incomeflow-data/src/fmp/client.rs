//! Financial Modeling Prep statements API client.

use super::statement::{FmpIncomeStatement, parse_statements};
use crate::error::{DataError, Result};
use crate::http::{build_client, trim_base_url};

/// Statements API base URL
const FMP_BASE_URL: &str = "https://financialmodelingprep.com";

/// User agent for statements API requests
const USER_AGENT: &str = concat!("incomeflow/", env!("CARGO_PKG_VERSION"));

/// Client for the quarterly income statement endpoint.
pub struct FmpClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FmpClient {
    /// Create a client with the given API key.
    ///
    /// # Errors
    /// Returns `DataError::Config` if the key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(DataError::Config("FMP API key is empty".to_string()));
        }

        Ok(Self {
            client: build_client(USER_AGENT)?,
            base_url: FMP_BASE_URL.to_string(),
            api_key,
        })
    }

    /// Point the client at another host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = trim_base_url(base_url);
        self
    }

    /// Fetch the latest `limit` quarterly income statements, newest first.
    ///
    /// # Errors
    /// Bodies that are not an array of statement rows are reported as
    /// `DataError::NotSupported`.
    pub async fn fetch_quarterly_statements(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<FmpIncomeStatement>> {
        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        let url = format!("{}/api/v3/income-statement/{}", self.base_url, symbol);
        let limit = limit.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("period", "quarter"),
                ("limit", limit.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(%status, symbol, "statements API request failed");
        }

        let rows = parse_statements(&body)?;
        tracing::debug!(symbol, rows = rows.len(), "fetched quarterly statements");
        Ok(rows)
    }
}

impl std::fmt::Debug for FmpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FmpClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

//! SEC EDGAR client for ticker lookup and company-concept series.

use super::concept::CompanyConcept;
use crate::BROWSER_USER_AGENT;
use crate::error::{DataError, Result};
use crate::http::{build_client, trim_base_url};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};

/// EDGAR data API host
const EDGAR_BASE_URL: &str = "https://data.sec.gov";

/// Host of the ticker to CIK mapping file
const SEC_WWW_URL: &str = "https://www.sec.gov";

/// SEC fair-access limit is 10 requests per second.
const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(100);

/// One row of `company_tickers.json`, keyed by row number:
/// `{"0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."}}`
#[derive(Debug, Deserialize)]
struct TickerEntry {
    cik_str: u64,
    ticker: String,
}

/// Spaces requests at least `interval` apart.
#[derive(Debug)]
struct Throttle {
    next_slot: Instant,
    interval: Duration,
}

impl Throttle {
    fn new(interval: Duration) -> Self {
        Self {
            next_slot: Instant::now(),
            interval,
        }
    }

    /// Wait for the next free slot and reserve the one after it.
    async fn acquire(&mut self) {
        sleep_until(self.next_slot).await;
        self.next_slot = Instant::now() + self.interval;
    }
}

/// Zero-pad a CIK to the 10 digits EDGAR URLs expect.
pub fn pad_cik(cik: &str) -> String {
    format!("{:0>10}", cik.trim())
}

/// Throttled EDGAR client.
///
/// Requests carry a browser user agent. One throttle guards every request,
/// so concurrent concept fetches stay within the limit.
pub struct EdgarClient {
    client: reqwest::Client,
    throttle: Arc<Mutex<Throttle>>,
    base_url: String,
    www_url: String,
}

impl EdgarClient {
    /// Client with the default limit of 10 requests per second.
    pub fn new() -> Result<Self> {
        Self::with_rate_limit(DEFAULT_RATE_LIMIT)
    }

    /// Client that waits at least `min_interval` between requests.
    ///
    /// ```no_run
    /// use incomeflow_data::edgar::EdgarClient;
    /// use std::time::Duration;
    ///
    /// # fn example() -> incomeflow_data::Result<()> {
    /// let client = EdgarClient::with_rate_limit(Duration::from_millis(250))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_rate_limit(min_interval: Duration) -> Result<Self> {
        Self::with_options(BROWSER_USER_AGENT, min_interval)
    }

    /// Client with an explicit user agent and rate limit.
    pub fn with_options(user_agent: &str, min_interval: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(user_agent)?,
            throttle: Arc::new(Mutex::new(Throttle::new(min_interval))),
            base_url: EDGAR_BASE_URL.to_string(),
            www_url: SEC_WWW_URL.to_string(),
        })
    }

    /// Point the API requests at another host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = trim_base_url(base_url);
        self
    }

    /// Point the ticker lookup at another host.
    #[must_use]
    pub fn with_www_url(mut self, www_url: impl Into<String>) -> Self {
        self.www_url = trim_base_url(www_url);
        self
    }

    /// Base URL of the API host.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Zero-padded CIK for a ticker, matched case-insensitively.
    ///
    /// # Errors
    /// `DataError::NotSupported` if the SEC does not list the ticker;
    /// `DataError::EdgarApi` if the mapping file cannot be read.
    pub async fn get_company_cik(&self, ticker: &str) -> Result<String> {
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return Err(DataError::InvalidSymbol("Empty ticker".to_string()));
        }

        let url = format!("{}/files/company_tickers.json", self.www_url);
        self.throttle.lock().await.acquire().await;
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DataError::EdgarApi(format!("ticker map returned {status}")));
        }

        let entries: HashMap<String, TickerEntry> = response
            .json()
            .await
            .map_err(|e| DataError::EdgarApi(format!("unreadable ticker map: {e}")))?;

        let cik = entries
            .into_values()
            .find(|entry| entry.ticker.eq_ignore_ascii_case(ticker))
            .map(|entry| pad_cik(&entry.cik_str.to_string()))
            .ok_or_else(|| DataError::not_supported(format!("no CIK for ticker {ticker}")))?;
        tracing::debug!(ticker, %cik, "resolved CIK");
        Ok(cik)
    }

    /// Every reported value of one concept (`taxonomy`/`tag`) for a
    /// company; `cik` may be padded or not.
    ///
    /// # Errors
    /// Error pages and other bodies that are not company-concept JSON are
    /// reported as `DataError::NotSupported`; transport failures as
    /// `DataError::Network`.
    ///
    /// # Example
    /// ```no_run
    /// use incomeflow_data::edgar::EdgarClient;
    ///
    /// # async fn example() -> incomeflow_data::Result<()> {
    /// let client = EdgarClient::new()?;
    /// let concept = client
    ///     .fetch_company_concept("320193", "us-gaap", "GrossProfit")
    ///     .await?;
    /// println!("{} USD values", concept.usd_facts()?.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch_company_concept(
        &self,
        cik: &str,
        taxonomy: &str,
        tag: &str,
    ) -> Result<CompanyConcept> {
        if cik.trim().is_empty() {
            return Err(DataError::InvalidSymbol("Empty CIK".to_string()));
        }

        let url = format!(
            "{}/api/xbrl/companyconcept/CIK{}/{}/{}.json",
            self.base_url,
            pad_cik(cik),
            taxonomy,
            tag
        );

        self.throttle.lock().await.acquire().await;

        let response = self
            .client
            .get(&url)
            .header("accept-language", "en-US,en;q=0.9")
            .header("cache-control", "no-cache")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(%status, %url, "EDGAR company concept request failed");
        }

        CompanyConcept::parse(&body)
    }
}

impl std::fmt::Debug for EdgarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgarClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_cik() {
        assert_eq!(pad_cik("320193"), "0000320193");
        assert_eq!(pad_cik("0000320193"), "0000320193");
    }

    #[test]
    fn test_with_base_url_trims_slash() {
        let client = EdgarClient::new()
            .unwrap()
            .with_base_url("http://127.0.0.1:9000/");
        assert_eq!(client.base_url(), "http://127.0.0.1:9000");
    }

    #[tokio::test]
    async fn test_throttle_spaces_requests() {
        let mut throttle = Throttle::new(Duration::from_millis(50));
        let start = Instant::now();

        for _ in 0..3 {
            throttle.acquire().await;
        }

        // The first slot is free; the next two wait a full interval each.
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_blank_identifiers_are_rejected() {
        let client = EdgarClient::new().unwrap();
        let concept = client
            .fetch_company_concept(" ", "us-gaap", "GrossProfit")
            .await;
        assert!(matches!(concept, Err(DataError::InvalidSymbol(_))));
        assert!(matches!(
            client.get_company_cik("").await,
            Err(DataError::InvalidSymbol(_))
        ));
    }
}

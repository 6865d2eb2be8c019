//! Client for the daily price service.

use super::series::PriceSeries;
use crate::error::{DataError, Result};
use crate::http::{build_client, trim_base_url};
use crate::market::Market;
use chrono::NaiveDate;

/// User agent for price service requests
const USER_AGENT: &str = concat!("incomeflow/", env!("CARGO_PKG_VERSION"));

/// Client for `GET /prices?market=..&symbol=..&n=..`.
///
/// The service answers with a JSON array of the last `n` daily closes,
/// the final element being today's close in the market's timezone.
pub struct PriceClient {
    client: reqwest::Client,
    base_url: String,
}

impl PriceClient {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = trim_base_url(base_url);
        if base_url.is_empty() {
            return Err(DataError::Config("price service URL is empty".to_string()));
        }
        Ok(Self {
            client: build_client(USER_AGENT)?,
            base_url,
        })
    }

    /// Fetch `days` daily closes ending today in the symbol's market.
    pub async fn fetch_daily_closes(
        &self,
        symbol: &str,
        market: Market,
        days: usize,
    ) -> Result<PriceSeries> {
        self.fetch_daily_closes_until(symbol, market, days, market.today())
            .await
    }

    /// Fetch `days` daily closes, assigning the last one to `end`.
    pub async fn fetch_daily_closes_until(
        &self,
        symbol: &str,
        market: Market,
        days: usize,
        end: NaiveDate,
    ) -> Result<PriceSeries> {
        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        let url = format!("{}/prices", self.base_url);
        let days = days.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("market", market.price_code()),
                ("symbol", symbol),
                ("n", days.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DataError::Http(format!(
                "price service returned status {} for {}",
                response.status(),
                symbol
            )));
        }

        let body = response.text().await?;
        let closes: Vec<Option<f64>> = serde_json::from_str(&body)
            .map_err(|e| DataError::Parse(format!("Invalid price series for {symbol}: {e}")))?;

        tracing::debug!(symbol, days = closes.len(), %end, "fetched daily closes");
        Ok(PriceSeries::from_closes(end, closes))
    }
}

impl std::fmt::Debug for PriceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

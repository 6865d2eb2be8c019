//! Reconciler configuration.

use incomeflow_data::{DataError, Result};
use std::time::Duration;

/// Environment variable holding the statements API key
pub const FMP_KEY_VAR: &str = "FMP_KEY";
/// Environment variable holding the price service URL
pub const PRICE_URL_VAR: &str = "INCOMEFLOW_PRICE_URL";
/// Environment variable overriding the number of quarters shown
pub const MAX_QUARTERS_VAR: &str = "INCOMEFLOW_MAX_QUARTERS";
/// Environment variable overriding the cache time-to-live, in seconds
pub const CACHE_TTL_VAR: &str = "INCOMEFLOW_CACHE_TTL_SECS";

/// Quarters of history that only seed the trailing EPS window.
const SEED_QUARTERS: usize = 3;

/// Largest `max_quarters` accepted; EDGAR and the statements API hold a
/// few decades of quarterly filings at most.
pub const MAX_QUARTERS_LIMIT: usize = 200;

/// Days per quarter used for date windows.
pub const DAYS_PER_QUARTER: usize = 91;

/// Base URL overrides for the upstream services.
///
/// `None` keeps each client's public default.
#[derive(Debug, Clone, Default)]
pub struct Endpoints {
    /// Statements API
    pub fmp: Option<String>,
    /// EDGAR data API
    pub edgar: Option<String>,
    /// SEC site hosting the ticker to CIK mapping
    pub sec_www: Option<String>,
    /// StatementDog site
    pub statementdog: Option<String>,
}

/// Configuration for the [`crate::Reconciler`]
#[derive(Clone)]
pub struct ReconcilerConfig {
    /// Statements API key
    pub fmp_api_key: String,
    /// Quarters shown in charts (default: 8)
    pub max_quarters: usize,
    /// How long a reconciliation stays cached (default: 12 hours)
    pub cache_ttl: Duration,
    /// Maximum number of cached symbols (default: 1000)
    pub cache_capacity: u64,
    /// Minimum interval between EDGAR requests (default: 100 ms)
    pub edgar_rate_limit: Duration,
    /// Price service base URL; without it charts have no price panel
    pub price_url: Option<String>,
    /// Upstream base URL overrides
    pub endpoints: Endpoints,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            fmp_api_key: String::new(),
            max_quarters: 8,
            cache_ttl: Duration::from_secs(12 * 60 * 60),
            cache_capacity: 1000,
            edgar_rate_limit: Duration::from_millis(100),
            price_url: None,
            endpoints: Endpoints::default(),
        }
    }
}

impl ReconcilerConfig {
    /// Default configuration with the given statements API key.
    pub fn new(fmp_api_key: impl Into<String>) -> Self {
        Self {
            fmp_api_key: fmp_api_key.into(),
            ..Self::default()
        }
    }

    /// Load `.env` if present, then read the process environment.
    ///
    /// # Errors
    /// Returns `DataError::Config` if `FMP_KEY` is missing or an override
    /// does not parse.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from a variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let key = lookup(FMP_KEY_VAR)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| DataError::Config(format!("{FMP_KEY_VAR} is not set")))?;
        let mut config = Self::new(key);

        if let Some(url) = lookup(PRICE_URL_VAR).filter(|u| !u.trim().is_empty()) {
            config.price_url = Some(url);
        }
        if let Some(raw) = lookup(MAX_QUARTERS_VAR) {
            config.max_quarters = parse_var(MAX_QUARTERS_VAR, &raw)?;
        }
        if let Some(raw) = lookup(CACHE_TTL_VAR) {
            config.cache_ttl = Duration::from_secs(parse_var(CACHE_TTL_VAR, &raw)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the number of quarters shown.
    #[must_use]
    pub const fn with_max_quarters(mut self, quarters: usize) -> Self {
        self.max_quarters = quarters;
        self
    }

    /// Set the cache time-to-live.
    #[must_use]
    pub const fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set the cache capacity.
    #[must_use]
    pub const fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Set the EDGAR rate limit.
    #[must_use]
    pub const fn with_edgar_rate_limit(mut self, interval: Duration) -> Self {
        self.edgar_rate_limit = interval;
        self
    }

    /// Set the price service URL.
    #[must_use]
    pub fn with_price_url(mut self, url: impl Into<String>) -> Self {
        self.price_url = Some(url.into());
        self
    }

    /// Set upstream base URL overrides.
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Statement rows requested from each source: the quarters shown, one
    /// extra for the `Today` frame, and three that seed the trailing EPS.
    pub const fn fetch_quarters(&self) -> usize {
        self.kept_quarters() + SEED_QUARTERS
    }

    /// Quarters a source returns: the quarters shown plus one.
    pub const fn kept_quarters(&self) -> usize {
        self.max_quarters + 1
    }

    /// Days of daily history behind prices and valuation bands.
    pub const fn history_days(&self) -> usize {
        self.max_quarters * DAYS_PER_QUARTER
    }

    /// Check the configuration is usable.
    ///
    /// # Errors
    /// Returns `DataError::Config` for an empty key, or for `max_quarters`
    /// outside `1..=MAX_QUARTERS_LIMIT`.
    pub fn validate(&self) -> Result<()> {
        if self.fmp_api_key.trim().is_empty() {
            return Err(DataError::Config("statements API key is empty".to_string()));
        }
        if self.max_quarters == 0 {
            return Err(DataError::Config("max_quarters must be positive".to_string()));
        }
        if self.max_quarters > MAX_QUARTERS_LIMIT {
            return Err(DataError::Config(format!(
                "max_quarters is {}, at most {MAX_QUARTERS_LIMIT} supported",
                self.max_quarters
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ReconcilerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconcilerConfig")
            .field("max_quarters", &self.max_quarters)
            .field("cache_ttl", &self.cache_ttl)
            .field("cache_capacity", &self.cache_capacity)
            .field("edgar_rate_limit", &self.edgar_rate_limit)
            .field("price_url", &self.price_url)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| DataError::Config(format!("{name} has invalid value {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ReconcilerConfig::new("key");
        assert_eq!(config.max_quarters, 8);
        assert_eq!(config.fetch_quarters(), 12);
        assert_eq!(config.kept_quarters(), 9);
        assert_eq!(config.history_days(), 728);
        assert_eq!(config.cache_ttl, Duration::from_secs(43_200));
        assert!(config.price_url.is_none());
    }

    #[rstest]
    #[case(1, 5, 2, 91)]
    #[case(4, 8, 5, 364)]
    #[case(12, 16, 13, 1092)]
    fn test_derived_windows(
        #[case] max_quarters: usize,
        #[case] fetch: usize,
        #[case] kept: usize,
        #[case] days: usize,
    ) {
        let config = ReconcilerConfig::new("key").with_max_quarters(max_quarters);
        assert_eq!(config.fetch_quarters(), fetch);
        assert_eq!(config.kept_quarters(), kept);
        assert_eq!(config.history_days(), days);
    }

    #[test]
    fn test_from_lookup() {
        let config = ReconcilerConfig::from_lookup(lookup(&[
            (FMP_KEY_VAR, "abc"),
            (PRICE_URL_VAR, "http://127.0.0.1:8080"),
            (MAX_QUARTERS_VAR, "4"),
            (CACHE_TTL_VAR, "60"),
        ]))
        .unwrap();

        assert_eq!(config.fmp_api_key, "abc");
        assert_eq!(config.price_url.as_deref(), Some("http://127.0.0.1:8080"));
        assert_eq!(config.max_quarters, 4);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_missing_key() {
        let err = ReconcilerConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, DataError::Config(_)));
    }

    #[test]
    fn test_bad_override() {
        let err = ReconcilerConfig::from_lookup(lookup(&[
            (FMP_KEY_VAR, "abc"),
            (MAX_QUARTERS_VAR, "eight"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains(MAX_QUARTERS_VAR));

        let zero = ReconcilerConfig::from_lookup(lookup(&[
            (FMP_KEY_VAR, "abc"),
            (MAX_QUARTERS_VAR, "0"),
        ]));
        assert!(zero.is_err());
    }

    #[test]
    fn test_quarter_limit() {
        let huge = usize::MAX.to_string();
        let err = ReconcilerConfig::from_lookup(lookup(&[
            (FMP_KEY_VAR, "abc"),
            (MAX_QUARTERS_VAR, huge.as_str()),
        ]))
        .unwrap_err();
        assert!(matches!(err, DataError::Config(_)));

        let largest = ReconcilerConfig::new("abc").with_max_quarters(MAX_QUARTERS_LIMIT);
        assert!(largest.validate().is_ok());
        assert_eq!(largest.fetch_quarters(), MAX_QUARTERS_LIMIT + 4);
        assert!(
            ReconcilerConfig::new("abc")
                .with_max_quarters(MAX_QUARTERS_LIMIT + 1)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_debug_hides_key() {
        let debug = format!("{:?}", ReconcilerConfig::new("secret-key"));
        assert!(!debug.contains("secret-key"));
    }
}

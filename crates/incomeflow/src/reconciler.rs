//! Multi-source income reconciliation with an in-memory cache.

use crate::config::ReconcilerConfig;
use crate::error::{ReconcileError, Result, SourceAttempt};
use crate::source::{FmpEdgarSource, IncomeSource, SourceOutcome, StatementDogSource};
use incomeflow_data::edgar::EdgarClient;
use incomeflow_data::fmp::FmpClient;
use incomeflow_data::prices::{PriceClient, PriceSeries};
use incomeflow_data::statementdog::StatementDogClient;
use incomeflow_data::{BROWSER_USER_AGENT, DataError, Market, QuarterlyIncome, normalize_symbol};
use incomeflow_valuation::{BandsConfig, ValuationBands};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Quarters reconciled for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Normalized symbol
    pub symbol: String,
    /// Market the symbol trades on
    pub market: Market,
    /// Name of the source that supplied the quarters
    pub source: String,
    /// Quarters, oldest first
    pub quarters: Vec<QuarterlyIncome>,
}

/// Daily prices and the valuation bands drawn over them.
#[derive(Debug, Clone, PartialEq)]
pub struct Valuation {
    /// Daily closes
    pub prices: PriceSeries,
    /// P/E bands, empty when the P/E range is degenerate
    pub bands: ValuationBands,
}

/// Ordered income sources per market.
#[derive(Clone, Default)]
pub struct SourceSet {
    /// Sources tried for US tickers, in order
    pub us: Vec<Arc<dyn IncomeSource>>,
    /// Sources tried for Taiwan codes, in order
    pub tw: Vec<Arc<dyn IncomeSource>>,
}

impl SourceSet {
    /// Sources for a market.
    pub fn for_market(&self, market: Market) -> &[Arc<dyn IncomeSource>] {
        match market {
            Market::Us => &self.us,
            Market::Tw => &self.tw,
        }
    }
}

impl std::fmt::Debug for SourceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = |sources: &[Arc<dyn IncomeSource>]| -> Vec<&'static str> {
            sources.iter().map(|s| s.name()).collect()
        };
        f.debug_struct("SourceSet")
            .field("us", &names(&self.us))
            .field("tw", &names(&self.tw))
            .finish()
    }
}

/// Fetches a symbol's quarterly income from the first source that
/// supports it, and caches the result.
///
/// US tickers try the statements API with EDGAR cross-checks, then
/// StatementDog; Taiwan codes go straight to StatementDog.
pub struct Reconciler {
    config: ReconcilerConfig,
    sources: SourceSet,
    prices: Option<PriceClient>,
    cache: Cache<String, Arc<Reconciliation>>,
}

impl Reconciler {
    /// Build a reconciler with the real upstream clients.
    ///
    /// # Errors
    /// Returns `ReconcileError::Data` for an invalid configuration or if an
    /// HTTP client cannot be built.
    pub fn new(config: ReconcilerConfig) -> Result<Self> {
        config.validate()?;
        let endpoints = &config.endpoints;

        let mut fmp = FmpClient::new(config.fmp_api_key.clone())?;
        if let Some(url) = &endpoints.fmp {
            fmp = fmp.with_base_url(url.as_str());
        }
        let mut edgar = EdgarClient::with_options(BROWSER_USER_AGENT, config.edgar_rate_limit)?;
        if let Some(url) = &endpoints.edgar {
            edgar = edgar.with_base_url(url.as_str());
        }
        if let Some(url) = &endpoints.sec_www {
            edgar = edgar.with_www_url(url.as_str());
        }
        let mut dog = StatementDogClient::new()?;
        if let Some(url) = &endpoints.statementdog {
            dog = dog.with_base_url(url.as_str());
        }

        let fmp = Arc::new(fmp);
        let fmp_edgar: Arc<dyn IncomeSource> = Arc::new(FmpEdgarSource::new(
            Arc::clone(&fmp),
            Arc::new(edgar),
            config.fetch_quarters(),
        ));
        let statementdog: Arc<dyn IncomeSource> = Arc::new(StatementDogSource::new(
            Arc::new(dog),
            Some(fmp),
            config.fetch_quarters(),
            config.kept_quarters(),
        ));
        let sources = SourceSet {
            us: vec![fmp_edgar, Arc::clone(&statementdog)],
            tw: vec![statementdog],
        };

        let prices = config
            .price_url
            .as_deref()
            .map(PriceClient::new)
            .transpose()?;

        Ok(Self::with_sources(config, sources).with_price_client(prices))
    }

    /// Build a reconciler over explicit sources and no price service.
    pub fn with_sources(config: ReconcilerConfig, sources: SourceSet) -> Self {
        let cache = Cache::builder()
            .time_to_live(config.cache_ttl)
            .max_capacity(config.cache_capacity)
            .build();
        Self {
            config,
            sources,
            prices: None,
            cache,
        }
    }

    /// Replace the price service client.
    #[must_use]
    pub fn with_price_client(mut self, prices: Option<PriceClient>) -> Self {
        self.prices = prices;
        self
    }

    /// Configuration in use.
    pub const fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Returns true if a price service is configured.
    pub const fn has_prices(&self) -> bool {
        self.prices.is_some()
    }

    /// Quarterly income for a symbol.
    ///
    /// Sources for the symbol's market are tried in order; a source that
    /// reports the symbol unsupported hands over to the next one. Successful
    /// results are cached per symbol for the configured time-to-live.
    ///
    /// # Errors
    /// - `ReconcileError::InvalidSymbol` for an empty symbol
    /// - `ReconcileError::NotSupported` once, after every source declined
    /// - `ReconcileError::Data` for transport and other hard failures
    pub async fn incomes(&self, symbol: &str) -> Result<Arc<Reconciliation>> {
        let symbol = normalize(symbol)?;
        if let Some(cached) = self.cache.get(&symbol).await {
            tracing::debug!(symbol = %symbol, source = %cached.source, "cache hit");
            return Ok(cached);
        }

        let market = Market::from_symbol(&symbol).map_err(invalid_symbol)?;
        let mut attempts = Vec::new();

        for source in self.sources.for_market(market) {
            tracing::debug!(symbol = %symbol, source = source.name(), "trying source");
            match source.fetch(&symbol).await {
                Ok(SourceOutcome::Supported(quarters)) => {
                    tracing::info!(
                        symbol = %symbol,
                        source = source.name(),
                        quarters = quarters.len(),
                        "reconciled"
                    );
                    let reconciliation = Arc::new(Reconciliation {
                        symbol: symbol.clone(),
                        market,
                        source: source.name().to_string(),
                        quarters,
                    });
                    self.cache
                        .insert(symbol, Arc::clone(&reconciliation))
                        .await;
                    return Ok(reconciliation);
                }
                Ok(SourceOutcome::Unsupported(reason)) => {
                    tracing::info!(symbol = %symbol, source = source.name(), %reason, "source unsupported");
                    attempts.push(SourceAttempt {
                        source: source.name().to_string(),
                        reason,
                    });
                }
                Err(e) => {
                    tracing::warn!(symbol = %symbol, source = source.name(), error = %e, "source failed");
                    return Err(e.into());
                }
            }
        }

        Err(ReconcileError::NotSupported { symbol, attempts })
    }

    /// Daily closes for a reconciled symbol, if a price service is
    /// configured.
    ///
    /// # Errors
    /// Price service failures are hard failures.
    pub async fn prices(&self, reconciliation: &Reconciliation) -> Result<Option<PriceSeries>> {
        let Some(client) = &self.prices else {
            return Ok(None);
        };
        let series = client
            .fetch_daily_closes(
                &reconciliation.symbol,
                reconciliation.market,
                self.config.history_days(),
            )
            .await?;
        Ok(Some(series))
    }

    /// Valuation bands over the trailing window of `prices`.
    pub fn bands(
        &self,
        reconciliation: &Reconciliation,
        prices: &PriceSeries,
    ) -> Result<ValuationBands> {
        let config = BandsConfig::for_quarters(self.config.max_quarters);
        Ok(ValuationBands::compute(&reconciliation.quarters, prices, &config)?)
    }

    /// Prices and bands for a symbol, if a price service is configured.
    pub async fn valuation(&self, symbol: &str) -> Result<Option<Valuation>> {
        let reconciliation = self.incomes(symbol).await?;
        let Some(prices) = self.prices(&reconciliation).await? else {
            return Ok(None);
        };
        let bands = self.bands(&reconciliation, &prices)?;
        Ok(Some(Valuation { prices, bands }))
    }

    /// Drop a symbol from the cache.
    pub async fn invalidate(&self, symbol: &str) {
        if let Ok(symbol) = normalize(symbol) {
            self.cache.invalidate(&symbol).await;
        }
    }

    /// Number of cached symbols, after pending cache maintenance.
    pub async fn cached_symbols(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("config", &self.config)
            .field("sources", &self.sources)
            .field("prices", &self.prices)
            .finish_non_exhaustive()
    }
}

fn normalize(symbol: &str) -> Result<String> {
    normalize_symbol(symbol).map_err(invalid_symbol)
}

fn invalid_symbol(e: DataError) -> ReconcileError {
    match e {
        DataError::InvalidSymbol(reason) => ReconcileError::InvalidSymbol(reason),
        other => ReconcileError::Data(other),
    }
}

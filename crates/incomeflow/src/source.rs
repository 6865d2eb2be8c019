//! Income sources tried in order by the reconciler.
//!
//! Each source either produces the quarters for a symbol, reports the
//! symbol as unsupported (the expected failure, which moves the reconciler
//! on to the next source) or fails hard.

use async_trait::async_trait;
use chrono::NaiveDate;
use incomeflow_data::edgar::{EdgarClient, concepts};
use incomeflow_data::fmp::{FmpClient, FmpIncomeStatement, chronological};
use incomeflow_data::statementdog::{StatementDogClient, year_window};
use incomeflow_data::{DataError, IncomeLines, Market, QuarterlyIncome, Result};
use incomeflow_valuation::{TTM_QUARTERS, trailing_eps};
use std::sync::Arc;

/// Result of asking one source for a symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome {
    /// Quarters, oldest first
    Supported(Vec<QuarterlyIncome>),
    /// The source has no usable data for the symbol
    Unsupported(String),
}

impl SourceOutcome {
    /// Fold a data result into an outcome: `NotSupported` becomes
    /// `Unsupported`, other errors stay errors.
    pub fn from_result(result: Result<Vec<QuarterlyIncome>>) -> Result<Self> {
        match result {
            Ok(quarters) if quarters.is_empty() => {
                Ok(Self::Unsupported("source returned no quarters".to_string()))
            }
            Ok(quarters) => Ok(Self::Supported(quarters)),
            Err(DataError::NotSupported(reason)) => Ok(Self::Unsupported(reason)),
            Err(e) => Err(e),
        }
    }
}

/// A strategy for fetching a company's quarterly income.
#[async_trait]
pub trait IncomeSource: Send + Sync {
    /// Short name used in logs and error reports.
    fn name(&self) -> &'static str;

    /// Fetch the quarters for a normalized symbol.
    async fn fetch(&self, symbol: &str) -> Result<SourceOutcome>;
}

/// Statements API figures cross-checked against EDGAR.
///
/// Revenue, R&D, SG&A and EPS come from the statements API; gross profit
/// and operating income come from the company's own filings, aligned on
/// the statement filing dates.
pub struct FmpEdgarSource {
    fmp: Arc<FmpClient>,
    edgar: Arc<EdgarClient>,
    fetch_quarters: usize,
}

impl FmpEdgarSource {
    /// Create the source; `fetch_quarters` includes the three seed quarters.
    pub const fn new(fmp: Arc<FmpClient>, edgar: Arc<EdgarClient>, fetch_quarters: usize) -> Self {
        Self {
            fmp,
            edgar,
            fetch_quarters,
        }
    }

    async fn quarters(&self, symbol: &str) -> Result<Vec<QuarterlyIncome>> {
        let rows = self
            .fmp
            .fetch_quarterly_statements(symbol, self.fetch_quarters)
            .await?;
        if rows.len() < self.fetch_quarters {
            return Err(DataError::not_supported(format!(
                "statements API has {} quarters, need {}",
                rows.len(),
                self.fetch_quarters
            )));
        }
        let rows = chronological(rows);
        let rows = &rows[rows.len() - self.fetch_quarters..];

        let eps: Vec<f64> = rows.iter().map(|r| r.eps).collect();
        let eps_ttm =
            trailing_eps(&eps).map_err(|e| DataError::not_supported(e.to_string()))?;
        let kept = &rows[TTM_QUARTERS - 1..];
        let filing_dates: Vec<NaiveDate> = kept.iter().map(|r| r.filling_date).collect();

        let cik = match kept.iter().find_map(|r| r.cik.clone()) {
            Some(cik) => cik,
            None => self.edgar.get_company_cik(symbol).await?,
        };

        let (gross_profit, operating_income) = tokio::try_join!(
            self.regulatory_series(&cik, concepts::GROSS_PROFIT, &filing_dates),
            self.regulatory_series(&cik, concepts::OPERATING_INCOME, &filing_dates),
        )?;

        Ok(kept
            .iter()
            .zip(eps_ttm)
            .zip(gross_profit.into_iter().zip(operating_income))
            .map(|((row, eps_ttm), (gross_profit, operating_income))| {
                QuarterlyIncome::derive(
                    row.filling_date,
                    lines(row, gross_profit, operating_income, eps_ttm),
                )
            })
            .collect())
    }

    async fn regulatory_series(
        &self,
        cik: &str,
        tag: &str,
        filing_dates: &[NaiveDate],
    ) -> Result<Vec<f64>> {
        self.edgar
            .fetch_company_concept(cik, concepts::US_GAAP, tag)
            .await?
            .quarterly_series(filing_dates)
    }
}

fn lines(
    row: &FmpIncomeStatement,
    gross_profit: f64,
    operating_income: f64,
    eps_ttm: f64,
) -> IncomeLines {
    IncomeLines {
        revenue: row.revenue,
        gross_profit,
        operating_income,
        r_and_d: row.research_and_development_expenses,
        sg_and_a: row.selling_general_and_administrative_expenses,
        eps_ttm,
    }
}

#[async_trait]
impl IncomeSource for FmpEdgarSource {
    fn name(&self) -> &'static str {
        "fmp+edgar"
    }

    async fn fetch(&self, symbol: &str) -> Result<SourceOutcome> {
        SourceOutcome::from_result(self.quarters(symbol).await)
    }
}

impl std::fmt::Debug for FmpEdgarSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FmpEdgarSource")
            .field("fetch_quarters", &self.fetch_quarters)
            .finish_non_exhaustive()
    }
}

/// StatementDog fundamentals.
///
/// Quarters are dated by the statements API filing dates when it covers
/// the symbol, otherwise by calendar quarter end.
pub struct StatementDogSource {
    dog: Arc<StatementDogClient>,
    fmp: Option<Arc<FmpClient>>,
    fetch_quarters: usize,
    kept_quarters: usize,
}

impl StatementDogSource {
    /// Create the source.
    pub const fn new(
        dog: Arc<StatementDogClient>,
        fmp: Option<Arc<FmpClient>>,
        fetch_quarters: usize,
        kept_quarters: usize,
    ) -> Self {
        Self {
            dog,
            fmp,
            fetch_quarters,
            kept_quarters,
        }
    }

    async fn quarters(&self, symbol: &str) -> Result<Vec<QuarterlyIncome>> {
        let (start_year, end_year) = year_window(Market::Tw.today(), self.fetch_quarters);
        let fundamentals = self
            .dog
            .fetch_fundamentals(symbol, start_year, end_year)
            .await?;
        if fundamentals.quarter_count() < self.fetch_quarters {
            return Err(DataError::not_supported(format!(
                "fundamentals have {} quarters, need {}",
                fundamentals.quarter_count(),
                self.fetch_quarters
            )));
        }

        let lines = fundamentals.income_lines(self.kept_quarters)?;
        let dates = match self.filing_dates(symbol).await? {
            Some(dates) => dates,
            None => fundamentals.quarter_end_dates(self.kept_quarters)?,
        };

        Ok(dates
            .into_iter()
            .zip(lines)
            .map(|(date, lines)| QuarterlyIncome::derive(date, lines))
            .collect())
    }

    /// Filing dates of the last quarters, if the statements API has them all.
    async fn filing_dates(&self, symbol: &str) -> Result<Option<Vec<NaiveDate>>> {
        let Some(fmp) = &self.fmp else {
            return Ok(None);
        };
        let rows = match fmp.fetch_quarterly_statements(symbol, self.kept_quarters).await {
            Ok(rows) => rows,
            Err(e) if e.is_not_supported() => return Ok(None),
            Err(e) => return Err(e),
        };
        if rows.len() < self.kept_quarters {
            tracing::debug!(symbol, rows = rows.len(), "dating quarters by calendar");
            return Ok(None);
        }

        let rows = chronological(rows);
        Ok(Some(
            rows[rows.len() - self.kept_quarters..]
                .iter()
                .map(|r| r.filling_date)
                .collect(),
        ))
    }
}

#[async_trait]
impl IncomeSource for StatementDogSource {
    fn name(&self) -> &'static str {
        "statementdog"
    }

    async fn fetch(&self, symbol: &str) -> Result<SourceOutcome> {
        SourceOutcome::from_result(self.quarters(symbol).await)
    }
}

impl std::fmt::Debug for StatementDogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatementDogSource")
            .field("fetch_quarters", &self.fetch_quarters)
            .field("kept_quarters", &self.kept_quarters)
            .finish_non_exhaustive()
    }
}

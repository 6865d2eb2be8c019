//! P/E valuation bands.
//!
//! The observed P/E range over the EPS window is split into evenly spaced
//! multiples. Each band is the daily EPS times one multiple, so a price
//! chart drawn over the bands shows where the stock trades relative to its
//! own historical valuation.

use crate::eps::{DailyEps, daily_eps};
use crate::error::{Result, ValuationError};
use chrono::NaiveDate;
use incomeflow_data::QuarterlyIncome;
use incomeflow_data::prices::PriceSeries;
use serde::{Deserialize, Serialize};

/// Configuration for valuation bands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandsConfig {
    /// Number of bands, from the lowest to the highest multiple (default: 6)
    pub band_count: usize,
    /// Days of EPS history the P/E range is taken over (default: 8 * 91)
    pub window_days: usize,
}

impl Default for BandsConfig {
    fn default() -> Self {
        Self {
            band_count: 6,
            window_days: 8 * 91,
        }
    }
}

impl BandsConfig {
    /// Window covering `quarters` quarters of 91 days.
    pub const fn for_quarters(quarters: usize) -> Self {
        Self {
            band_count: 6,
            window_days: quarters * 91,
        }
    }
}

/// Lowest and highest observed P/E.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeRange {
    /// Lowest P/E
    pub min: f64,
    /// Highest P/E
    pub max: f64,
}

impl PeRange {
    /// Range of the defined values, or `None` when it is empty or a single
    /// point.
    pub fn of(pe: &[(NaiveDate, Option<f64>)]) -> Option<Self> {
        let mut values = pe.iter().filter_map(|(_, v)| *v).filter(|v| v.is_finite());
        let first = values.next()?;
        let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        (min < max).then_some(Self { min, max })
    }

    /// Multiple at fraction `p` of the range.
    pub fn at(&self, p: f64) -> f64 {
        self.min + (self.max - self.min) * p
    }
}

/// Daily EPS times one P/E multiple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationBand {
    /// P/E multiple
    pub multiple: f64,
    /// One value per day of [`ValuationBands::dates`]; 0 where EPS is
    /// undefined
    pub values: Vec<f64>,
}

impl ValuationBand {
    /// Label such as `23x`, with the multiple rounded half to even.
    pub fn label(&self) -> String {
        format!("{}x", self.multiple.round_ties_even())
    }
}

/// Set of valuation bands over a shared date axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationBands {
    /// Dates shared by every band
    pub dates: Vec<NaiveDate>,
    /// Bands from the lowest to the highest multiple
    pub bands: Vec<ValuationBand>,
}

impl ValuationBands {
    /// Compute bands for a company's quarters and daily prices.
    ///
    /// The EPS series runs from the first quarter's date to the last price
    /// date. A degenerate P/E range yields an empty set.
    ///
    /// # Errors
    /// Returns `ValuationError::InvalidBandCount` if the config asks for
    /// fewer than two bands.
    pub fn compute(
        incomes: &[QuarterlyIncome],
        prices: &PriceSeries,
        config: &BandsConfig,
    ) -> Result<Self> {
        if config.band_count < 2 {
            return Err(ValuationError::InvalidBandCount(config.band_count));
        }
        let Some(end) = prices.last_date() else {
            return Ok(Self::default());
        };

        let quarters: Vec<_> = incomes.iter().map(|q| (q.date, q.eps_ttm)).collect();
        let eps = daily_eps(&quarters, end, config.window_days);
        let pe = pe_series(&eps, prices);
        let Some(range) = PeRange::of(&pe) else {
            return Ok(Self::default());
        };

        let steps = config.band_count - 1;
        let bands = (0..=steps)
            .map(|i| {
                // Exact fractions keep the top band on the observed maximum.
                let multiple = range.at(i as f64 / steps as f64);
                let values = eps
                    .iter()
                    .map(|d| d.eps.map_or(0.0, |e| e * multiple))
                    .collect();
                ValuationBand { multiple, values }
            })
            .collect();

        Ok(Self {
            dates: eps.iter().map(|d| d.date).collect(),
            bands,
        })
    }

    /// Returns true if no bands were produced.
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Last point of a band, where its label is placed.
    pub fn last_point(&self, band: &ValuationBand) -> Option<(NaiveDate, f64)> {
        Some((*self.dates.last()?, *band.values.last()?))
    }
}

/// Daily P/E: close divided by EPS where both are defined.
pub fn pe_series(eps: &[DailyEps], prices: &PriceSeries) -> Vec<(NaiveDate, Option<f64>)> {
    eps.iter()
        .map(|d| {
            let pe = d
                .eps
                .zip(prices.close_on(d.date))
                .map(|(eps, close)| close / eps);
            (d.date, pe)
        })
        .collect()
}

//! Daily closing price series.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Closing price for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Calendar date
    pub date: NaiveDate,
    /// Closing price, `None` when the service has no value for the day
    pub close: Option<f64>,
}

/// One closing price per consecutive calendar day, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Assign `closes` to consecutive days ending on `end`.
    pub fn from_closes(end: NaiveDate, closes: Vec<Option<f64>>) -> Self {
        let n = i64::try_from(closes.len()).unwrap_or(i64::MAX);
        let start = end - Duration::days(n.saturating_sub(1));
        let points = closes
            .into_iter()
            .zip(start.iter_days())
            .map(|(close, date)| PricePoint { date, close })
            .collect();
        Self { points }
    }

    /// All points, oldest first.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Number of days in the series.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the series has no days.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First day of the series.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    /// Last day of the series.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Close on a given day.
    pub fn close_on(&self, date: NaiveDate) -> Option<f64> {
        let first = self.first_date()?;
        let offset = usize::try_from((date - first).num_days()).ok()?;
        self.points.get(offset).and_then(|p| p.close)
    }

    /// Points up to and including `date`.
    pub fn up_to(&self, date: NaiveDate) -> &[PricePoint] {
        let end = self.points.partition_point(|p| p.date <= date);
        &self.points[..end]
    }
}

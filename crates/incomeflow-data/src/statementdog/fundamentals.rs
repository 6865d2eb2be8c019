//! StatementDog fundamentals time series.
//!
//! Every line item is a list of `[index, value]` pairs, oldest first, with
//! monetary values in thousands:
//!
//! ```json
//! {"common": {"TimeCalendarQ": {"data": [[1, "2021Q1"], [2, "2021Q2"]]}},
//!  "quarterly": {"Revenue": {"data": [[1, "362163090"], [2, "372145229"]]}}}
//! ```

use crate::error::{DataError, Result};
use crate::income::IncomeLines;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Monetary line items are reported in thousands.
pub const THOUSANDS: f64 = 1000.0;

/// Line item names used by the reconciliation.
pub mod items {
    /// Revenue
    pub const REVENUE: &str = "Revenue";
    /// Gross profit
    pub const GROSS_PROFIT: &str = "GrossProfit";
    /// Operating income
    pub const OPERATING_INCOME: &str = "OperatingIncome";
    /// Research and development expenses
    pub const R_AND_D: &str = "ResearchAndDevelopmentExpenses";
    /// Combined selling and administrative expenses
    pub const SELLING_AND_ADMINISTRATIVE: &str = "SellingAndAdministrativeExpenses";
    /// Selling expenses, reported separately by some companies
    pub const SELLING: &str = "SellingExpenses";
    /// Administrative expenses, reported separately by some companies
    pub const ADMINISTRATIVE: &str = "AdministrativeExpenses";
    /// Trailing four-quarter EPS
    pub const EPS_TTM: &str = "EPST4Q";
}

/// One time series of `[index, value]` pairs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DogSeries {
    /// Raw pairs, oldest first
    #[serde(default)]
    pub data: Vec<(Value, Value)>,
}

/// Shared series such as the calendar quarter labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DogCommon {
    /// Calendar quarter labels (`2023Q4`)
    #[serde(rename = "TimeCalendarQ")]
    pub time_calendar_q: DogSeries,
}

/// Fundamentals response for one stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DogFundamentals {
    /// Shared series
    pub common: DogCommon,
    /// Quarterly line items keyed by item name
    #[serde(default)]
    pub quarterly: HashMap<String, DogSeries>,
}

impl DogFundamentals {
    /// Parse a fundamentals JSON body.
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| DataError::not_supported(format!("unreadable fundamentals: {e}")))
    }

    /// Number of calendar quarters covered.
    pub fn quarter_count(&self) -> usize {
        self.common.time_calendar_q.data.len()
    }

    /// Last `window` values of a line item.
    ///
    /// # Errors
    /// Returns `DataError::NotSupported` if the item is missing, shorter than
    /// `window`, or holds a non-numeric value.
    pub fn extract(&self, item: &str, window: usize) -> Result<Vec<f64>> {
        let series = self
            .quarterly
            .get(item)
            .ok_or_else(|| DataError::not_supported(format!("missing line item {item}")))?;

        tail(&series.data, window, item)?
            .iter()
            .map(|(_, value)| {
                numeric(value).ok_or_else(|| {
                    DataError::not_supported(format!("non-numeric {item} value: {value}"))
                })
            })
            .collect()
    }

    /// Selling and administrative expenses in currency units.
    ///
    /// Uses the combined item when present, otherwise the sum of the
    /// separate selling and administrative items.
    pub fn selling_and_administrative(&self, window: usize) -> Result<Vec<f64>> {
        match self.extract(items::SELLING_AND_ADMINISTRATIVE, window) {
            Ok(combined) => Ok(scale(combined)),
            Err(e) if e.is_not_supported() => {
                let selling = self.extract(items::SELLING, window)?;
                let administrative = self.extract(items::ADMINISTRATIVE, window)?;
                Ok(selling
                    .iter()
                    .zip(&administrative)
                    .map(|(s, a)| (s + a) * THOUSANDS)
                    .collect())
            }
            Err(e) => Err(e),
        }
    }

    /// Income lines for the last `window` quarters, oldest first.
    pub fn income_lines(&self, window: usize) -> Result<Vec<IncomeLines>> {
        let revenue = scale(self.extract(items::REVENUE, window)?);
        let gross_profit = scale(self.extract(items::GROSS_PROFIT, window)?);
        let operating_income = scale(self.extract(items::OPERATING_INCOME, window)?);
        let r_and_d = scale(self.extract(items::R_AND_D, window)?);
        let sg_and_a = self.selling_and_administrative(window)?;
        let eps_ttm = self.extract(items::EPS_TTM, window)?;

        Ok((0..window)
            .map(|i| IncomeLines {
                revenue: revenue[i],
                gross_profit: gross_profit[i],
                operating_income: operating_income[i],
                r_and_d: r_and_d[i],
                sg_and_a: sg_and_a[i],
                eps_ttm: eps_ttm[i],
            })
            .collect())
    }

    /// Calendar quarter end dates of the last `window` quarters.
    pub fn quarter_end_dates(&self, window: usize) -> Result<Vec<NaiveDate>> {
        tail(&self.common.time_calendar_q.data, window, "TimeCalendarQ")?
            .iter()
            .map(|(_, label)| {
                label
                    .as_str()
                    .and_then(parse_calendar_quarter)
                    .ok_or_else(|| DataError::not_supported(format!("bad quarter label {label}")))
            })
            .collect()
    }
}

fn tail<'a>(
    data: &'a [(Value, Value)],
    window: usize,
    item: &str,
) -> Result<&'a [(Value, Value)]> {
    if data.len() < window {
        return Err(DataError::not_supported(format!(
            "{item} has {} quarters, need {window}",
            data.len()
        )));
    }
    Ok(&data[data.len() - window..])
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn scale(values: Vec<f64>) -> Vec<f64> {
    values.into_iter().map(|v| v * THOUSANDS).collect()
}

/// Last day of a `YYYYQn` calendar quarter.
pub fn parse_calendar_quarter(label: &str) -> Option<NaiveDate> {
    let (year, quarter) = label.trim().split_once('Q')?;
    let year: i32 = year.trim_end_matches('-').parse().ok()?;
    match quarter.parse::<u32>().ok()? {
        1 => NaiveDate::from_ymd_opt(year, 3, 31),
        2 => NaiveDate::from_ymd_opt(year, 6, 30),
        3 => NaiveDate::from_ymd_opt(year, 9, 30),
        4 => NaiveDate::from_ymd_opt(year, 12, 31),
        _ => None,
    }
}

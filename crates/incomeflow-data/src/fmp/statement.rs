//! Quarterly income statement rows from Financial Modeling Prep.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One quarterly income statement as returned by the statements API.
///
/// Only the fields the reconciliation reads are required; the direct
/// `costOfRevenue` / `operatingExpenses` fields are kept for reference but
/// never trusted, since they differ across reporting styles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FmpIncomeStatement {
    /// Period end date
    pub date: NaiveDate,
    /// Ticker symbol
    #[serde(default)]
    pub symbol: Option<String>,
    /// SEC Central Index Key, zero-padded
    #[serde(default)]
    pub cik: Option<String>,
    /// Filing date (the API spells it `fillingDate`)
    pub filling_date: NaiveDate,
    /// Fiscal year, e.g. `"2024"`
    #[serde(default)]
    pub calendar_year: Option<String>,
    /// Fiscal period, e.g. `"Q2"`
    #[serde(default)]
    pub period: Option<String>,
    /// Total revenue
    pub revenue: f64,
    /// Direct cost of revenue field
    #[serde(default)]
    pub cost_of_revenue: Option<f64>,
    /// Gross profit
    #[serde(default)]
    pub gross_profit: Option<f64>,
    /// Research and development expenses
    pub research_and_development_expenses: f64,
    /// Selling, general and administrative expenses
    pub selling_general_and_administrative_expenses: f64,
    /// Direct operating expenses field
    #[serde(default)]
    pub operating_expenses: Option<f64>,
    /// Operating income
    #[serde(default)]
    pub operating_income: Option<f64>,
    /// Quarterly earnings per share
    pub eps: f64,
}

/// Parse a statements API body.
///
/// The API answers unknown symbols with `[]` and bad keys with an
/// `{"Error Message": ...}` object, so anything that is not an array of
/// complete rows is reported as not supported.
pub fn parse_statements(json: &str) -> Result<Vec<FmpIncomeStatement>> {
    serde_json::from_str(json)
        .map_err(|e| DataError::not_supported(format!("unreadable income statements: {e}")))
}

/// Reorder newest-first API rows to oldest-first.
pub fn chronological(mut rows: Vec<FmpIncomeStatement>) -> Vec<FmpIncomeStatement> {
    rows.reverse();
    rows
}

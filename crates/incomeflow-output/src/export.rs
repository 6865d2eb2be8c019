//! Export of reconciled quarters, valuation bands and charts.
//!
//! Quarters and bands export as CSV or JSON; charts as JSON only.

use crate::chart::ChartSpec;
use chrono::NaiveDate;
use incomeflow_data::QuarterlyIncome;
use incomeflow_valuation::ValuationBands;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Export failures.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV writer failure
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serializer failure
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// File write failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV output was not valid UTF-8.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Unknown format name, or a format the value cannot be written in
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Output format for quarters, bands and charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// One flat record per row
    Csv,

    /// Single-line JSON
    Json,

    /// Indented JSON
    PrettyJson,
}

impl ExportFormat {
    /// File extension, without the dot.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// One reconciled quarter of one symbol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncomeExport {
    /// Security symbol.
    pub symbol: String,
    /// Filing or period date.
    pub date: NaiveDate,
    /// Total revenue.
    pub revenue: f64,
    /// Cost of revenue.
    pub cost_of_revenue: f64,
    /// Gross profit.
    pub gross_profit: f64,
    /// Operating expenses.
    pub operating_expenses: f64,
    /// Operating income.
    pub operating_income: f64,
    /// Research and development.
    pub r_and_d: f64,
    /// Selling, general and administrative.
    pub sg_and_a: f64,
    /// Trailing-twelve-month EPS.
    pub eps_ttm: f64,
}

impl IncomeExport {
    /// Flatten a quarter for export.
    pub fn new(symbol: &str, q: &QuarterlyIncome) -> Self {
        Self {
            symbol: symbol.to_string(),
            date: q.date,
            revenue: q.revenue,
            cost_of_revenue: q.cost_of_revenue,
            gross_profit: q.gross_profit,
            operating_expenses: q.operating_expenses,
            operating_income: q.operating_income,
            r_and_d: q.r_and_d,
            sg_and_a: q.sg_and_a,
            eps_ttm: q.eps_ttm,
        }
    }

    /// Flatten every quarter of a symbol.
    pub fn from_incomes(symbol: &str, incomes: &[QuarterlyIncome]) -> Vec<Self> {
        incomes.iter().map(|q| Self::new(symbol, q)).collect()
    }
}

/// Valuation bands of one symbol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BandsExport {
    /// Security symbol.
    pub symbol: String,
    /// Bands over their shared dates.
    pub bands: ValuationBands,
}

impl BandsExport {
    /// Create a new bands export.
    pub const fn new(symbol: String, bands: ValuationBands) -> Self {
        Self { symbol, bands }
    }

    /// One record per band and day.
    fn to_flat_records(&self) -> Vec<BandRecordFlat> {
        self.bands
            .bands
            .iter()
            .flat_map(|band| {
                self.bands
                    .dates
                    .iter()
                    .zip(&band.values)
                    .map(|(date, value)| BandRecordFlat {
                        symbol: self.symbol.clone(),
                        date: *date,
                        multiple: band.multiple,
                        value: *value,
                    })
            })
            .collect()
    }
}

/// Flattened band value for CSV export.
#[derive(Debug, Serialize, Deserialize)]
struct BandRecordFlat {
    symbol: String,
    date: NaiveDate,
    multiple: f64,
    value: f64,
}

/// Values that can be written as CSV or JSON.
pub trait Exporter {
    /// Serialize to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Serialize and write to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn write_csv<T: Serialize>(records: impl IntoIterator<Item = T>) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in records {
        wtr.serialize(record)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

fn write_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String, ExportError> {
    if pretty {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(serde_json::to_string(value)?)
    }
}

impl Exporter for [IncomeExport] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => write_csv(self),
            ExportFormat::Json => write_json(self, false),
            ExportFormat::PrettyJson => write_json(self, true),
        }
    }
}

impl Exporter for Vec<IncomeExport> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        self.as_slice().export_to_string(format)
    }
}

impl Exporter for BandsExport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => write_csv(self.to_flat_records()),
            ExportFormat::Json => write_json(self, false),
            ExportFormat::PrettyJson => write_json(self, true),
        }
    }
}

impl Exporter for ChartSpec {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => Err(ExportError::InvalidFormat(
                "charts export as JSON only".to_string(),
            )),
            ExportFormat::Json => write_json(self, false),
            ExportFormat::PrettyJson => write_json(self, true),
        }
    }
}

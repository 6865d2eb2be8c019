//! SEC EDGAR regulatory filings.
//!
//! This module provides:
//! - Company CIK lookup from ticker symbols
//! - Company-concept time series for a single US-GAAP tag
//! - Reconstruction of standalone fourth quarters from annual values
//! - Alignment of reported values to statement filing dates
//!
//! # Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use incomeflow_data::edgar::{EdgarClient, concepts};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EdgarClient::new()?;
//!     let cik = client.get_company_cik("AAPL").await?;
//!     let concept = client
//!         .fetch_company_concept(&cik, concepts::US_GAAP, concepts::GROSS_PROFIT)
//!         .await?;
//!
//!     let filed = [NaiveDate::from_ymd_opt(2024, 5, 3).unwrap()];
//!     let gross_profit = concept.quarterly_series(&filed)?;
//!     println!("Gross profit: {:?}", gross_profit);
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod concept;

pub use client::{EdgarClient, pad_cik};
pub use concept::{
    ALIGNMENT_WINDOW_DAYS, CompanyConcept, ConceptFact, PeriodType, align_to_filing_dates,
    concepts, filing_date_for, framed_filings, reconstruct_quarterly,
};

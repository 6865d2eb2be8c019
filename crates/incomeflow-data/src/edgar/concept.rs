//! SEC company-concept time series and quarterly reconstruction.
//!
//! The company-concept endpoint returns every value a company ever reported
//! for one XBRL tag. Annual (10-K) values cover the whole fiscal year, so the
//! standalone fourth quarter is recovered by subtracting the three preceding
//! quarterly (10-Q) values. The resulting series is then keyed by the filing
//! date of the statement that first reported it.
//!
//! Response shape:
//!
//! ```json
//! {"cik": 320193, "taxonomy": "us-gaap", "tag": "GrossProfit",
//!  "units": {"USD": [{"end": "2023-07-01", "val": 32045000000,
//!                     "form": "10-Q", "frame": "CY2023Q2", ...}]}}
//! ```

use crate::error::{DataError, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A reported value may back a filing made at most this many days after
/// the end of its period.
pub const ALIGNMENT_WINDOW_DAYS: i64 = 91;

/// Period type of an EDGAR form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PeriodType {
    /// Quarterly (10-Q) filing
    Quarterly,
    /// Annual (10-K) filing
    Annual,
}

impl PeriodType {
    /// Convert form type to period type.
    pub fn from_form(form: &str) -> Option<Self> {
        match form {
            "10-Q" => Some(Self::Quarterly),
            "10-K" => Some(Self::Annual),
            _ => None,
        }
    }
}

/// A single reported value of a concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptFact {
    /// Start of the reporting period (absent for instant values)
    #[serde(default)]
    pub start: Option<NaiveDate>,
    /// End of the reporting period
    pub end: NaiveDate,
    /// Reported value
    pub val: f64,
    /// Accession number of the filing
    #[serde(default)]
    pub accn: Option<String>,
    /// Fiscal year
    #[serde(default)]
    pub fy: Option<i32>,
    /// Fiscal period (`Q1`..`Q3`, `FY`)
    #[serde(default)]
    pub fp: Option<String>,
    /// Form type (`10-Q`, `10-K`, `8-K`, ...)
    #[serde(default)]
    pub form: Option<String>,
    /// Date the filing was made
    #[serde(default)]
    pub filed: Option<NaiveDate>,
    /// Calendar frame (`CY2023Q2`); only one value per frame carries it
    #[serde(default)]
    pub frame: Option<String>,
}

impl ConceptFact {
    /// Period type derived from the form, if it is a 10-Q or 10-K.
    pub fn period_type(&self) -> Option<PeriodType> {
        self.form.as_deref().and_then(PeriodType::from_form)
    }

    fn is_quarterly(&self) -> bool {
        self.period_type() == Some(PeriodType::Quarterly)
    }
}

/// Company-concept response for one tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyConcept {
    /// CIK number
    #[serde(default)]
    pub cik: Option<u64>,
    /// Taxonomy (`us-gaap`)
    #[serde(default)]
    pub taxonomy: Option<String>,
    /// XBRL tag
    #[serde(default)]
    pub tag: Option<String>,
    /// Company name
    #[serde(default)]
    pub entity_name: Option<String>,
    /// Values keyed by unit of measure
    pub units: HashMap<String, Vec<ConceptFact>>,
}

impl CompanyConcept {
    /// Parse a company-concept JSON body.
    ///
    /// Any body that is not a company-concept document (error pages, empty
    /// responses) is reported as not supported.
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| DataError::not_supported(format!("unreadable company concept: {e}")))
    }

    /// Values reported in US dollars.
    pub fn usd_facts(&self) -> Result<&[ConceptFact]> {
        self.units
            .get("USD")
            .map(Vec::as_slice)
            .ok_or_else(|| DataError::not_supported("company concept has no USD values"))
    }

    /// Quarterly values aligned to `filing_dates`, one per date.
    ///
    /// See [`framed_filings`], [`reconstruct_quarterly`] and
    /// [`align_to_filing_dates`] for the individual steps.
    pub fn quarterly_series(&self, filing_dates: &[NaiveDate]) -> Result<Vec<f64>> {
        let framed = framed_filings(self.usd_facts()?);
        let quarterly = reconstruct_quarterly(&framed);
        align_to_filing_dates(&quarterly, filing_dates)
    }
}

/// Keep 10-Q and 10-K values that carry a calendar frame, in reported order.
pub fn framed_filings(facts: &[ConceptFact]) -> Vec<ConceptFact> {
    facts
        .iter()
        .filter(|f| f.period_type().is_some() && f.frame.is_some())
        .cloned()
        .collect()
}

/// Turn annual values into standalone fourth-quarter values.
///
/// Each 10-K value at position `i` becomes `annual - (q[i-3] + q[i-2] + q[i-1])`
/// when the three preceding entries are all 10-Q values; otherwise the annual
/// value is dropped. Quarterly values pass through unchanged.
pub fn reconstruct_quarterly(facts: &[ConceptFact]) -> Vec<ConceptFact> {
    facts
        .iter()
        .enumerate()
        .filter_map(|(i, fact)| match fact.period_type() {
            Some(PeriodType::Annual) => {
                let preceding = facts.get(i.checked_sub(3)?..i)?;
                if !preceding.iter().all(ConceptFact::is_quarterly) {
                    return None;
                }
                let quarters: f64 = preceding.iter().map(|q| q.val).sum();
                Some(ConceptFact {
                    val: fact.val - quarters,
                    ..fact.clone()
                })
            }
            _ => Some(fact.clone()),
        })
        .collect()
}

/// First filing date strictly after `end` and strictly before
/// `end + ALIGNMENT_WINDOW_DAYS`.
pub fn filing_date_for(end: NaiveDate, filing_dates: &[NaiveDate]) -> Option<NaiveDate> {
    let limit = end + Duration::days(ALIGNMENT_WINDOW_DAYS);
    filing_dates
        .iter()
        .copied()
        .find(|&filed| end < filed && filed < limit)
}

/// Pick one value per filing date.
///
/// Values whose period end has no filing date inside the window are left
/// out. When several values land on the same filing date the later one in
/// reported order wins.
///
/// # Errors
/// Returns `DataError::NotSupported` if any filing date is left without a
/// value.
pub fn align_to_filing_dates(
    facts: &[ConceptFact],
    filing_dates: &[NaiveDate],
) -> Result<Vec<f64>> {
    let mut by_filing: HashMap<NaiveDate, f64> = HashMap::new();
    for fact in facts {
        if let Some(filed) = filing_date_for(fact.end, filing_dates) {
            by_filing.insert(filed, fact.val);
        }
    }

    filing_dates
        .iter()
        .map(|date| {
            by_filing.get(date).copied().ok_or_else(|| {
                DataError::not_supported(format!("no regulatory value for filing {date}"))
            })
        })
        .collect()
}

/// Common US-GAAP tags used for the income cross-check.
pub mod concepts {
    /// US-GAAP taxonomy name
    pub const US_GAAP: &str = "us-gaap";

    /// Gross Profit
    pub const GROSS_PROFIT: &str = "GrossProfit";

    /// Operating Income (Loss)
    pub const OPERATING_INCOME: &str = "OperatingIncomeLoss";
}

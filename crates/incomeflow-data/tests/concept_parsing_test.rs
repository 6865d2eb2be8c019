//! Integration tests for company-concept and fundamentals parsing

use approx::assert_relative_eq;
use chrono::NaiveDate;
use incomeflow_data::DataError;
use incomeflow_data::edgar::{CompanyConcept, PeriodType};
use incomeflow_data::statementdog::DogFundamentals;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

const GROSS_PROFIT_CONCEPT: &str = r#"{
  "cik": 320193,
  "taxonomy": "us-gaap",
  "tag": "GrossProfit",
  "entityName": "Apple Inc.",
  "units": {
    "USD": [
      {"start": "2022-12-25", "end": "2023-04-01", "val": 10, "form": "10-Q", "fp": "Q2", "fy": 2023, "filed": "2023-05-05", "frame": "CY2023Q1"},
      {"start": "2022-12-25", "end": "2023-04-01", "val": 10, "form": "10-Q", "fp": "Q2", "fy": 2023, "filed": "2023-05-05"},
      {"start": "2023-04-02", "end": "2023-07-01", "val": 11, "form": "10-Q", "fp": "Q3", "fy": 2023, "filed": "2023-08-04", "frame": "CY2023Q2"},
      {"start": "2023-07-02", "end": "2023-09-30", "val": 12, "form": "8-K", "filed": "2023-11-02", "frame": "CY2023Q3"},
      {"start": "2023-07-02", "end": "2023-09-30", "val": 12, "form": "10-Q", "fp": "Q1", "fy": 2024, "filed": "2023-11-03", "frame": "CY2023Q3"},
      {"start": "2023-01-01", "end": "2023-12-30", "val": 50, "form": "10-K", "fp": "FY", "fy": 2024, "filed": "2024-02-02", "frame": "CY2023"}
    ]
  }
}"#;

#[test]
fn test_company_concept_metadata() {
    let concept = CompanyConcept::parse(GROSS_PROFIT_CONCEPT).unwrap();

    assert_eq!(concept.cik, Some(320193));
    assert_eq!(concept.entity_name.as_deref(), Some("Apple Inc."));
    assert_eq!(concept.usd_facts().unwrap().len(), 6);
    assert_eq!(
        concept.usd_facts().unwrap()[5].period_type(),
        Some(PeriodType::Annual)
    );
}

#[test]
fn test_company_concept_quarterly_series() {
    let concept = CompanyConcept::parse(GROSS_PROFIT_CONCEPT).unwrap();
    let filings = [
        date(2023, 5, 5),
        date(2023, 8, 4),
        date(2023, 11, 3),
        date(2024, 2, 2),
    ];

    let series = concept.quarterly_series(&filings).unwrap();

    // The 10-K value is reduced to its standalone fourth quarter: 50 - 33.
    assert_eq!(series, vec![10.0, 11.0, 12.0, 17.0]);
}

#[test]
fn test_company_concept_missing_filing_is_not_supported() {
    let concept = CompanyConcept::parse(GROSS_PROFIT_CONCEPT).unwrap();
    let filings = [date(2023, 5, 5), date(2024, 6, 1)];

    let err = concept.quarterly_series(&filings).unwrap_err();
    assert!(err.is_not_supported());
}

#[test]
fn test_error_page_is_not_supported() {
    let err = CompanyConcept::parse("<html><body>Not Found</body></html>").unwrap_err();
    assert!(matches!(err, DataError::NotSupported(_)));
}

#[test]
fn test_fundamentals_income_lines() {
    let body = r#"{
      "common": {"TimeCalendarQ": {"data": [[1, "2023Q2"], [2, "2023Q3"], [3, "2023Q4"]]}},
      "quarterly": {
        "Revenue": {"data": [[1, "100"], [2, "200"], [3, "300"]]},
        "GrossProfit": {"data": [[1, "50"], [2, "90"], [3, "160"]]},
        "OperatingIncome": {"data": [[1, "20"], [2, "40"], [3, "-10"]]},
        "ResearchAndDevelopmentExpenses": {"data": [[1, "5"], [2, "6"], [3, "7"]]},
        "SellingExpenses": {"data": [[1, "1"], [2, "2"], [3, "3"]]},
        "AdministrativeExpenses": {"data": [[1, "4"], [2, "4"], [3, "4"]]},
        "EPST4Q": {"data": [[1, "30.1"], [2, "31.5"], [3, "32.3"]]}
      }
    }"#;

    let fundamentals = DogFundamentals::parse(body).unwrap();
    let lines = fundamentals.income_lines(2).unwrap();

    assert_eq!(lines.len(), 2);
    assert_relative_eq!(lines[0].revenue, 200_000.0);
    assert_relative_eq!(lines[1].operating_income, -10_000.0);
    assert_relative_eq!(lines[1].sg_and_a, 7_000.0);
    // EPS is a per-share figure and is not scaled.
    assert_relative_eq!(lines[1].eps_ttm, 32.3);

    assert_eq!(
        fundamentals.quarter_end_dates(2).unwrap(),
        vec![date(2023, 9, 30), date(2023, 12, 31)]
    );
    assert!(fundamentals.income_lines(4).unwrap_err().is_not_supported());
}

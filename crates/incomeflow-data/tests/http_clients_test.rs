//! HTTP client tests against a local mock server

use chrono::NaiveDate;
use incomeflow_data::edgar::EdgarClient;
use incomeflow_data::fmp::FmpClient;
use incomeflow_data::prices::PriceClient;
use incomeflow_data::statementdog::StatementDogClient;
use incomeflow_data::{DataError, Market};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn statement_row(date: &str, filed: &str, revenue: f64) -> serde_json::Value {
    json!({
        "date": date,
        "symbol": "AAPL",
        "cik": "0000320193",
        "fillingDate": filed,
        "calendarYear": "2024",
        "period": "Q1",
        "revenue": revenue,
        "researchAndDevelopmentExpenses": 7_000.0,
        "sellingGeneralAndAdministrativeExpenses": 6_000.0,
        "eps": 1.5
    })
}

#[tokio::test]
async fn test_fmp_fetch_quarterly_statements() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/income-statement/AAPL"))
        .and(query_param("period", "quarter"))
        .and(query_param("limit", "12"))
        .and(query_param("apikey", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            statement_row("2024-03-30", "2024-05-03", 90_753.0),
            statement_row("2023-12-30", "2024-02-02", 119_575.0),
        ])))
        .mount(&server)
        .await;

    let client = FmpClient::new("test-key")
        .unwrap()
        .with_base_url(server.uri());
    let rows = client.fetch_quarterly_statements("AAPL", 12).await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].revenue, 90_753.0);
    assert_eq!(
        rows[0].filling_date,
        NaiveDate::from_ymd_opt(2024, 5, 3).unwrap()
    );
    assert_eq!(rows[0].cik.as_deref(), Some("0000320193"));
}

#[tokio::test]
async fn test_fmp_error_message_is_not_supported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/income-statement/ZZZZ"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"Error Message": "Invalid API KEY."})),
        )
        .mount(&server)
        .await;

    let client = FmpClient::new("bad").unwrap().with_base_url(server.uri());
    let err = client
        .fetch_quarterly_statements("ZZZZ", 12)
        .await
        .unwrap_err();

    assert!(err.is_not_supported());
}

#[tokio::test]
async fn test_edgar_fetch_company_concept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(
            "/api/xbrl/companyconcept/CIK0000320193/us-gaap/GrossProfit.json",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cik": 320193,
            "taxonomy": "us-gaap",
            "tag": "GrossProfit",
            "units": {"USD": [
                {"end": "2024-03-30", "val": 42_271.0, "form": "10-Q", "frame": "CY2024Q1"}
            ]}
        })))
        .mount(&server)
        .await;

    let client = EdgarClient::with_rate_limit(Duration::from_millis(1))
        .unwrap()
        .with_base_url(server.uri());
    let concept = client
        .fetch_company_concept("320193", "us-gaap", "GrossProfit")
        .await
        .unwrap();

    let series = concept
        .quarterly_series(&[NaiveDate::from_ymd_opt(2024, 5, 3).unwrap()])
        .unwrap();
    assert_eq!(series, vec![42_271.0]);
}

#[tokio::test]
async fn test_edgar_missing_concept_is_not_supported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<Error>NoSuchKey</Error>"))
        .mount(&server)
        .await;

    let client = EdgarClient::with_rate_limit(Duration::from_millis(1))
        .unwrap()
        .with_base_url(server.uri());
    let err = client
        .fetch_company_concept("1", "us-gaap", "GrossProfit")
        .await
        .unwrap_err();

    assert!(matches!(err, DataError::NotSupported(_)));
}

#[tokio::test]
async fn test_edgar_ticker_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/company_tickers.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."},
            "1": {"cik_str": 789019, "ticker": "MSFT", "title": "MICROSOFT CORP"}
        })))
        .mount(&server)
        .await;

    let client = EdgarClient::with_rate_limit(Duration::from_millis(1))
        .unwrap()
        .with_www_url(server.uri());

    assert_eq!(client.get_company_cik("msft").await.unwrap(), "0000789019");
    assert!(
        client
            .get_company_cik("NOPE")
            .await
            .unwrap_err()
            .is_not_supported()
    );
}

#[tokio::test]
async fn test_statementdog_fetch_fundamentals() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/fundamentals/2330/2021/2024"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "common": {"TimeCalendarQ": {"data": [[1, "2024Q1"], [2, "2024Q2"]]}},
            "quarterly": {"Revenue": {"data": [[1, "592644201"], [2, "673510177"]]}}
        })))
        .mount(&server)
        .await;

    let client = StatementDogClient::new()
        .unwrap()
        .with_base_url(server.uri());
    let fundamentals = client.fetch_fundamentals("2330", 2021, 2024).await.unwrap();

    assert_eq!(fundamentals.quarter_count(), 2);
    assert_eq!(
        fundamentals.extract("Revenue", 1).unwrap(),
        vec![673_510_177.0]
    );
}

#[tokio::test]
async fn test_price_fetch_daily_closes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prices"))
        .and(query_param("market", "t"))
        .and(query_param("symbol", "2330"))
        .and(query_param("n", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1000.0, null, 1010.0])))
        .mount(&server)
        .await;

    let end = NaiveDate::from_ymd_opt(2024, 10, 18).unwrap();
    let client = PriceClient::new(server.uri()).unwrap();
    let series = client
        .fetch_daily_closes_until("2330", Market::Tw, 3, end)
        .await
        .unwrap();

    assert_eq!(series.len(), 3);
    assert_eq!(series.last_date(), Some(end));
    assert_eq!(series.close_on(end), Some(1010.0));
    assert_eq!(
        series.close_on(NaiveDate::from_ymd_opt(2024, 10, 17).unwrap()),
        None
    );
}

#[tokio::test]
async fn test_price_server_error_is_hard_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = PriceClient::new(server.uri()).unwrap();
    let err = client
        .fetch_daily_closes("AAPL", Market::Us, 10)
        .await
        .unwrap_err();

    assert!(matches!(err, DataError::Http(_)));
}

#[tokio::test]
async fn test_price_unreadable_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prices"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"error\": \"busy\"}"))
        .mount(&server)
        .await;

    let client = PriceClient::new(server.uri()).unwrap();
    let err = client
        .fetch_daily_closes("AAPL", Market::Us, 10)
        .await
        .unwrap_err();

    assert!(matches!(err, DataError::Parse(_)));
    assert!(!err.is_not_supported());
}

//! Reconciler fallback, error and cache behavior over stub sources

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use incomeflow::data::{DataError, IncomeLines, Market, QuarterlyIncome};
use incomeflow::{
    ChartOutcome, IncomeSource, ReconcileError, Reconciler, ReconcilerConfig, SourceOutcome,
    SourceSet, render_chart,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

enum Behavior {
    Supported(Vec<QuarterlyIncome>),
    Unsupported(&'static str),
    Fail(&'static str),
}

struct StubSource {
    name: &'static str,
    behavior: Behavior,
    calls: AtomicUsize,
}

impl StubSource {
    fn new(name: &'static str, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            name,
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IncomeSource for StubSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, _symbol: &str) -> incomeflow::data::Result<SourceOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Supported(quarters) => Ok(SourceOutcome::Supported(quarters.clone())),
            Behavior::Unsupported(reason) => Ok(SourceOutcome::Unsupported((*reason).to_string())),
            Behavior::Fail(message) => Err(DataError::Http((*message).to_string())),
        }
    }
}

fn quarters(n: usize) -> Vec<QuarterlyIncome> {
    let first = NaiveDate::from_ymd_opt(2023, 2, 3).unwrap();
    (0..n)
        .map(|i| {
            let step = i32::try_from(i).unwrap();
            let revenue = 80e9 + f64::from(step) * 2e9;
            QuarterlyIncome::derive(
                first + Duration::days(91 * i64::from(step)),
                IncomeLines {
                    revenue,
                    gross_profit: revenue * 0.4,
                    operating_income: revenue * 0.25,
                    r_and_d: revenue * 0.08,
                    sg_and_a: revenue * 0.07,
                    eps_ttm: 6.0,
                },
            )
        })
        .collect()
}

fn config() -> ReconcilerConfig {
    ReconcilerConfig::new("test-key").with_max_quarters(2)
}

fn reconciler(us: Vec<Arc<StubSource>>, tw: Vec<Arc<StubSource>>) -> Reconciler {
    let erase = |sources: Vec<Arc<StubSource>>| -> Vec<Arc<dyn IncomeSource>> {
        sources
            .into_iter()
            .map(|s| s as Arc<dyn IncomeSource>)
            .collect()
    };
    Reconciler::with_sources(
        config(),
        SourceSet {
            us: erase(us),
            tw: erase(tw),
        },
    )
}

#[tokio::test]
async fn test_primary_supported_skips_secondary() {
    let primary = StubSource::new("primary", Behavior::Supported(quarters(3)));
    let secondary = StubSource::new("secondary", Behavior::Supported(quarters(3)));
    let reconciler = reconciler(vec![primary.clone(), secondary.clone()], vec![]);

    let result = reconciler.incomes("aapl").await.unwrap();

    assert_eq!(result.symbol, "AAPL");
    assert_eq!(result.market, Market::Us);
    assert_eq!(result.source, "primary");
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 0);
}

#[tokio::test]
async fn test_falls_back_to_secondary() {
    let primary = StubSource::new("primary", Behavior::Unsupported("too few rows"));
    let secondary = StubSource::new("secondary", Behavior::Supported(quarters(3)));
    let reconciler = reconciler(vec![primary.clone(), secondary.clone()], vec![]);

    let result = reconciler.incomes("MSFT").await.unwrap();

    assert_eq!(result.source, "secondary");
    assert_eq!(result.quarters.len(), 3);
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 1);
}

#[tokio::test]
async fn test_all_unsupported_reports_once() {
    let primary = StubSource::new("primary", Behavior::Unsupported("too few rows"));
    let secondary = StubSource::new("secondary", Behavior::Unsupported("missing Revenue"));
    let reconciler = reconciler(vec![primary.clone(), secondary.clone()], vec![]);

    let err = reconciler.incomes("ZZZZ").await.unwrap_err();

    match &err {
        ReconcileError::NotSupported { symbol, attempts } => {
            assert_eq!(symbol, "ZZZZ");
            let sources: Vec<_> = attempts.iter().map(|a| a.source.as_str()).collect();
            assert_eq!(sources, ["primary", "secondary"]);
            assert_eq!(attempts[1].reason, "missing Revenue");
        }
        other => panic!("expected NotSupported, got {other:?}"),
    }
    assert!(err.is_not_supported());
    assert_eq!(secondary.calls(), 1);
}

#[tokio::test]
async fn test_hard_failure_aborts_fallback() {
    let primary = StubSource::new("primary", Behavior::Fail("502 Bad Gateway"));
    let secondary = StubSource::new("secondary", Behavior::Supported(quarters(3)));
    let reconciler = reconciler(vec![primary.clone(), secondary.clone()], vec![]);

    let err = reconciler.incomes("AAPL").await.unwrap_err();

    assert!(matches!(err, ReconcileError::Data(DataError::Http(_))));
    assert!(!err.is_not_supported());
    assert_eq!(secondary.calls(), 0);
}

#[tokio::test]
async fn test_numeric_code_uses_taiwan_sources() {
    let us = StubSource::new("us", Behavior::Supported(quarters(3)));
    let tw = StubSource::new("tw", Behavior::Supported(quarters(3)));
    let reconciler = reconciler(vec![us.clone()], vec![tw.clone()]);

    let result = reconciler.incomes("2330").await.unwrap();

    assert_eq!(result.market, Market::Tw);
    assert_eq!(result.source, "tw");
    assert_eq!(us.calls(), 0);
}

#[tokio::test]
async fn test_empty_symbol_is_invalid() {
    let source = StubSource::new("primary", Behavior::Supported(quarters(3)));
    let reconciler = reconciler(vec![source.clone()], vec![]);

    let err = reconciler.incomes("   ").await.unwrap_err();

    assert!(matches!(err, ReconcileError::InvalidSymbol(_)));
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_successes_are_cached_per_symbol() {
    let source = StubSource::new("primary", Behavior::Supported(quarters(3)));
    let reconciler = reconciler(vec![source.clone()], vec![]);

    let first = reconciler.incomes("aapl").await.unwrap();
    let second = reconciler.incomes(" AAPL ").await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(source.calls(), 1);
    assert_eq!(reconciler.cached_symbols().await, 1);

    reconciler.invalidate("aapl").await;
    reconciler.incomes("AAPL").await.unwrap();
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_unsupported_is_not_cached() {
    let source = StubSource::new("primary", Behavior::Unsupported("no data"));
    let reconciler = reconciler(vec![source.clone()], vec![]);

    assert!(reconciler.incomes("NOPE").await.is_err());
    assert!(reconciler.incomes("NOPE").await.is_err());

    assert_eq!(source.calls(), 2);
    assert_eq!(reconciler.cached_symbols().await, 0);
}

#[tokio::test]
async fn test_cache_entries_expire() {
    let source = StubSource::new("primary", Behavior::Supported(quarters(3)));
    let reconciler = Reconciler::with_sources(
        config().with_cache_ttl(std::time::Duration::from_millis(50)),
        SourceSet {
            us: vec![source.clone() as Arc<dyn IncomeSource>],
            tw: vec![],
        },
    );

    reconciler.incomes("AAPL").await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    reconciler.incomes("AAPL").await.unwrap();

    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_render_chart_without_prices() {
    let source = StubSource::new("primary", Behavior::Supported(quarters(3)));
    let reconciler = reconciler(vec![source], vec![]);

    let outcome = render_chart(&reconciler, "aapl").await.unwrap();

    assert!(!outcome.alert());
    let chart = outcome.chart();
    assert_eq!(chart.symbol, "AAPL");
    // Two quarters shown plus the `Today` frame.
    assert_eq!(chart.frames.len(), 3);
    assert!(chart.price.is_none());
    assert!(chart.bands.is_empty());
}

#[tokio::test]
async fn test_render_chart_not_supported_state() {
    let primary = StubSource::new("primary", Behavior::Unsupported("too few rows"));
    let secondary = StubSource::new("secondary", Behavior::Unsupported("missing Revenue"));
    let reconciler = reconciler(vec![primary, secondary.clone()], vec![]);

    let outcome = render_chart(&reconciler, "ZZZZ").await.unwrap();

    match &outcome {
        ChartOutcome::NotSupported(state) => {
            assert!(state.alert);
            assert_eq!(state.message, "Not Supported");
            assert!(state.chart.is_empty());
            assert!(state.reason.contains("secondary: missing Revenue"));
        }
        ChartOutcome::Ready(_) => panic!("expected the not supported state"),
    }
    assert_eq!(secondary.calls(), 1);
}

#[tokio::test]
async fn test_render_chart_propagates_hard_failures() {
    let source = StubSource::new("primary", Behavior::Fail("connection reset"));
    let reconciler = reconciler(vec![source], vec![]);

    assert!(render_chart(&reconciler, "AAPL").await.is_err());
}

//! Request/response chart rendering.

use crate::error::Result;
use crate::reconciler::Reconciler;
use incomeflow_output::{ChartSpec, ErrorState, PricePanel};

/// Result of rendering a chart for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartOutcome {
    /// Chart built from reconciled data
    Ready(Box<ChartSpec>),
    /// No source could supply the symbol; blank chart with the alert raised
    NotSupported(ErrorState),
}

impl ChartOutcome {
    /// Returns the chart, blank for the unsupported state.
    pub fn chart(&self) -> &ChartSpec {
        match self {
            Self::Ready(chart) => chart,
            Self::NotSupported(state) => &state.chart,
        }
    }

    /// Returns true if the "Not Supported" alert should be shown.
    pub const fn alert(&self) -> bool {
        matches!(self, Self::NotSupported(_))
    }
}

/// Build the chart for a symbol.
///
/// Reconciled quarters drive the waterfall frames. With a price service
/// configured, prices and valuation bands are fetched and drawn in a second
/// panel sharing the timeline.
///
/// # Errors
/// Unsupported and invalid symbols become [`ChartOutcome::NotSupported`];
/// transport failures and price service errors are returned as errors.
pub async fn render_chart(reconciler: &Reconciler, symbol: &str) -> Result<ChartOutcome> {
    let reconciliation = match reconciler.incomes(symbol).await {
        Ok(r) => r,
        Err(e) if e.is_not_supported() => {
            tracing::info!(symbol, reason = %e, "rendering not supported state");
            return Ok(ChartOutcome::NotSupported(ErrorState::not_supported(
                e.to_string(),
            )));
        }
        Err(e) => return Err(e),
    };

    let quarters = reconciler.config().max_quarters;
    let chart = match reconciler.prices(&reconciliation).await? {
        Some(prices) => {
            let bands = reconciler.bands(&reconciliation, &prices)?;
            ChartSpec::build(
                &reconciliation.symbol,
                &reconciliation.quarters,
                quarters,
                Some(PricePanel {
                    prices: &prices,
                    bands: &bands,
                }),
            )
        }
        None => ChartSpec::build(
            &reconciliation.symbol,
            &reconciliation.quarters,
            quarters,
            None,
        ),
    };

    tracing::debug!(
        symbol = %reconciliation.symbol,
        frames = chart.frames.len(),
        bands = chart.bands.len(),
        "chart built"
    );
    Ok(ChartOutcome::Ready(Box::new(chart)))
}

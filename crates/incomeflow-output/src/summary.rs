//! Tabular income summaries for terminal and Markdown output.

use crate::sankey::format_millions;
use incomeflow_data::QuarterlyIncome;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reconciled quarters of one symbol, ready to print.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeSummary {
    /// Symbol
    pub symbol: String,
    /// Source that supplied the quarters
    pub source: String,
    /// Quarters, oldest first
    pub quarters: Vec<QuarterlyIncome>,
}

impl IncomeSummary {
    /// Create a new summary.
    pub fn new(symbol: impl Into<String>, source: impl Into<String>, quarters: Vec<QuarterlyIncome>) -> Self {
        Self {
            symbol: symbol.into(),
            source: source.into(),
            quarters,
        }
    }

    /// Gross margin of a quarter, `None` without revenue.
    pub fn gross_margin(q: &QuarterlyIncome) -> Option<f64> {
        (q.revenue.abs() > f64::EPSILON).then(|| q.gross_profit / q.revenue)
    }

    /// Operating margin of a quarter, `None` without revenue.
    pub fn operating_margin(q: &QuarterlyIncome) -> Option<f64> {
        (q.revenue.abs() > f64::EPSILON).then(|| q.operating_income / q.revenue)
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\nIncome Summary: {}\n", self.symbol));
        output.push_str(&format!("Source: {}\n", self.source));
        output.push_str(&"=".repeat(100));
        output.push('\n');
        output.push_str(&format!(
            "{:<10} {:>12} {:>12} {:>12} {:>12} {:>12} {:>8} {:>8} {:>8}\n",
            "Date", "Revenue", "Gross", "OpEx", "Op. Inc.", "R&D", "GM %", "OM %", "EPS TTM"
        ));
        output.push_str(&"-".repeat(100));
        output.push('\n');

        for q in &self.quarters {
            output.push_str(&format!(
                "{:<10} {:>12} {:>12} {:>12} {:>12} {:>12} {:>8} {:>8} {:>8.2}\n",
                q.date.to_string(),
                format_millions(q.revenue),
                format_millions(q.gross_profit),
                format_millions(q.operating_expenses),
                format_millions(q.operating_income),
                format_millions(q.r_and_d),
                percent(Self::gross_margin(q)),
                percent(Self::operating_margin(q)),
                q.eps_ttm
            ));
        }

        output.push_str(&"=".repeat(100));
        output.push_str("\nAmounts in millions.\n");
        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Income Summary: {}\n\n", self.symbol));
        output.push_str(&format!("**Source:** {}\n\n", self.source));
        output.push_str(
            "| Date | Revenue (M) | Cost of Revenue (M) | Gross Profit (M) | Operating Expenses (M) | Operating Income (M) | R&D (M) | SG&A (M) | EPS TTM |\n",
        );
        output.push_str("|------|------|------|------|------|------|------|------|------|\n");

        for q in &self.quarters {
            output.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} | {} | {:.2} |\n",
                q.date,
                format_millions(q.revenue),
                format_millions(q.cost_of_revenue),
                format_millions(q.gross_profit),
                format_millions(q.operating_expenses),
                format_millions(q.operating_income),
                format_millions(q.r_and_d),
                format_millions(q.sg_and_a),
                q.eps_ttm
            ));
        }

        output
    }
}

fn percent(ratio: Option<f64>) -> String {
    ratio.map_or_else(|| "-".to_string(), |r| format!("{:.1}", r * 100.0))
}

impl fmt::Display for IncomeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Income Summary: {} ({} quarters from {})",
            self.symbol,
            self.quarters.len(),
            self.source
        )?;
        if let Some(latest) = self.quarters.last() {
            writeln!(f, "  Latest: {}", latest.date)?;
            writeln!(f, "  Revenue: {}M", format_millions(latest.revenue))?;
            writeln!(
                f,
                "  Operating Income: {}M",
                format_millions(latest.operating_income)
            )?;
            writeln!(f, "  EPS TTM: {:.2}", latest.eps_ttm)?;
        }
        Ok(())
    }
}

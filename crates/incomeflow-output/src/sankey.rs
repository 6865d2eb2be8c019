//! Income waterfall as Sankey diagram frames.
//!
//! Every frame has the same nine nodes and eight links:
//!
//! ```text
//! spacer -> spacer -> Revenue -> Cost of Revenue
//!                             -> Gross Profit -> Operating Expenses -> R&D
//!                                                                   -> SG&A
//!                                             -> Operating Income
//! ```
//!
//! The first spacer link carries the largest revenue of the displayed
//! quarters, which keeps the visible part of every frame on one scale.

use crate::palette::{DARK_GREEN, DARK_RED, LIGHT_GREEN, LIGHT_RED, NODE_X, NODE_Y, TRANSPARENT};
use incomeflow_data::QuarterlyIncome;
use serde::{Deserialize, Serialize};

/// Name of the final frame, which repeats the latest quarter.
pub const TODAY_FRAME: &str = "Today";

/// Sankey node, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    /// Invisible node left of the spacer
    Origin,
    /// Invisible node feeding revenue
    Spacer,
    /// Total revenue
    Revenue,
    /// Cost of revenue
    CostOfRevenue,
    /// Gross profit
    GrossProfit,
    /// Operating expenses
    OperatingExpenses,
    /// Operating income
    OperatingIncome,
    /// Research and development
    RAndD,
    /// Selling, general and administrative
    SgAndA,
}

impl Node {
    /// All nodes in display order.
    pub const ALL: [Self; 9] = [
        Self::Origin,
        Self::Spacer,
        Self::Revenue,
        Self::CostOfRevenue,
        Self::GrossProfit,
        Self::OperatingExpenses,
        Self::OperatingIncome,
        Self::RAndD,
        Self::SgAndA,
    ];

    /// Position in [`Node::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Label prefix, empty for the invisible nodes.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Origin | Self::Spacer => "",
            Self::Revenue => "Revenue",
            Self::CostOfRevenue => "Cost of Revenue",
            Self::GrossProfit => "Gross Profit",
            Self::OperatingExpenses => "Operating Expenses",
            Self::OperatingIncome => "Operating Income",
            Self::RAndD => "R&D",
            Self::SgAndA => "SG&A",
        }
    }

    fn amount(self, q: &QuarterlyIncome) -> Option<f64> {
        match self {
            Self::Origin | Self::Spacer => None,
            Self::Revenue => Some(q.revenue),
            Self::CostOfRevenue => Some(q.cost_of_revenue),
            Self::GrossProfit => Some(q.gross_profit),
            Self::OperatingExpenses => Some(q.operating_expenses),
            Self::OperatingIncome => Some(q.operating_income),
            Self::RAndD => Some(q.r_and_d),
            Self::SgAndA => Some(q.sg_and_a),
        }
    }
}

/// A labelled, positioned node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SankeyNode {
    /// Label such as `Revenue: 1,234M`
    pub label: String,
    /// Fill color
    pub color: String,
    /// Horizontal position in `[0, 1]` (spacers sit left of the plot)
    pub x: f64,
    /// Vertical position in `[0, 1]`
    pub y: f64,
}

/// A flow between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SankeyLink {
    /// Source node index
    pub source: usize,
    /// Target node index
    pub target: usize,
    /// Flow width in millions, `(|amount| + 1) / 1e6`
    pub value: f64,
    /// Fill color
    pub color: String,
}

/// One quarter's waterfall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SankeyFrame {
    /// Frame name, the quarter's `yy-mm-dd` label or `Today`
    pub name: String,
    /// Nodes in [`Node::ALL`] order
    pub nodes: Vec<SankeyNode>,
    /// Links, see the module docs
    pub links: Vec<SankeyLink>,
}

impl SankeyFrame {
    /// Build the frame for one quarter.
    pub fn from_income(name: impl Into<String>, q: &QuarterlyIncome, max_revenue: f64) -> Self {
        let gp_color = |profit, loss| if q.gross_profit > 0.0 { profit } else { loss };
        let oi_color = |profit, loss| if q.operating_income > 0.0 { profit } else { loss };

        let node_colors = [
            TRANSPARENT,
            TRANSPARENT,
            DARK_GREEN,
            DARK_RED,
            gp_color(DARK_GREEN, DARK_RED),
            DARK_RED,
            oi_color(DARK_GREEN, DARK_RED),
            DARK_RED,
            DARK_RED,
        ];
        let nodes = Node::ALL
            .iter()
            .map(|&node| {
                let i = node.index();
                let label = node
                    .amount(q)
                    .map(|v| format!("{}: {}M", node.name(), format_millions(v)))
                    .unwrap_or_default();
                SankeyNode {
                    label,
                    color: node_colors[i].to_string(),
                    x: NODE_X[i],
                    y: NODE_Y[i],
                }
            })
            .collect();

        let flows = [
            (Node::Origin, Node::Spacer, max_revenue, TRANSPARENT),
            (Node::Spacer, Node::Revenue, q.revenue, TRANSPARENT),
            (Node::Revenue, Node::CostOfRevenue, q.cost_of_revenue, LIGHT_RED),
            (
                Node::Revenue,
                Node::GrossProfit,
                q.gross_profit,
                gp_color(LIGHT_GREEN, LIGHT_RED),
            ),
            (
                Node::GrossProfit,
                Node::OperatingExpenses,
                q.operating_expenses,
                LIGHT_RED,
            ),
            (
                Node::GrossProfit,
                Node::OperatingIncome,
                q.operating_income,
                oi_color(LIGHT_GREEN, LIGHT_RED),
            ),
            (Node::OperatingExpenses, Node::RAndD, q.r_and_d, LIGHT_RED),
            (Node::OperatingExpenses, Node::SgAndA, q.sg_and_a, LIGHT_RED),
        ];
        let links = flows
            .iter()
            .map(|&(source, target, amount, color)| SankeyLink {
                source: source.index(),
                target: target.index(),
                value: link_value(amount),
                color: color.to_string(),
            })
            .collect();

        Self {
            name: name.into(),
            nodes,
            links,
        }
    }
}

/// Link width for an amount in currency units.
pub fn link_value(amount: f64) -> f64 {
    (amount.abs() + 1.0) / 1e6
}

/// Whole millions, floored, with thousands separators (`-1,235`).
pub fn format_millions(amount: f64) -> String {
    let millions = (amount / 1e6).floor() as i64;
    let digits = millions.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if millions < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Frames for the last `quarters` quarters plus a final `Today` frame.
pub fn sankey_frames(incomes: &[QuarterlyIncome], quarters: usize) -> Vec<SankeyFrame> {
    let shown = &incomes[incomes.len().saturating_sub(quarters)..];
    let Some(latest) = shown.last() else {
        return Vec::new();
    };
    let max_revenue = shown
        .iter()
        .map(|q| q.revenue)
        .fold(f64::NEG_INFINITY, f64::max);

    shown
        .iter()
        .map(|q| SankeyFrame::from_income(q.label(), q, max_revenue))
        .chain(std::iter::once(SankeyFrame::from_income(
            TODAY_FRAME,
            latest,
            max_revenue,
        )))
        .collect()
}

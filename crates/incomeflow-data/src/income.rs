//! Reconciled quarterly income statement.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Raw income lines as reported by a source, before derivation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncomeLines {
    /// Total revenue
    pub revenue: f64,
    /// Gross profit
    pub gross_profit: f64,
    /// Operating income (loss)
    pub operating_income: f64,
    /// Research and development expenses
    pub r_and_d: f64,
    /// Selling, general and administrative expenses
    pub sg_and_a: f64,
    /// Trailing-twelve-month earnings per share
    pub eps_ttm: f64,
}

/// One fiscal quarter of a company's income statement.
///
/// `cost_of_revenue` and `operating_expenses` are always derived by
/// difference, so `cost_of_revenue + gross_profit == revenue` and
/// `operating_expenses + operating_income == gross_profit` hold for every
/// value built through [`QuarterlyIncome::derive`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyIncome {
    /// Filing date of the statement, or the period date when no filing
    /// date is known
    pub date: NaiveDate,
    /// Total revenue
    pub revenue: f64,
    /// Cost of revenue (`revenue - gross_profit`)
    pub cost_of_revenue: f64,
    /// Gross profit
    pub gross_profit: f64,
    /// Operating expenses (`gross_profit - operating_income`)
    pub operating_expenses: f64,
    /// Operating income (loss)
    pub operating_income: f64,
    /// Research and development expenses
    pub r_and_d: f64,
    /// Selling, general and administrative expenses
    pub sg_and_a: f64,
    /// Trailing-twelve-month earnings per share
    pub eps_ttm: f64,
}

impl QuarterlyIncome {
    /// Build a quarter from reported lines, deriving the difference fields.
    pub fn derive(date: NaiveDate, lines: IncomeLines) -> Self {
        Self {
            date,
            revenue: lines.revenue,
            cost_of_revenue: lines.revenue - lines.gross_profit,
            gross_profit: lines.gross_profit,
            operating_expenses: lines.gross_profit - lines.operating_income,
            operating_income: lines.operating_income,
            r_and_d: lines.r_and_d,
            sg_and_a: lines.sg_and_a,
            eps_ttm: lines.eps_ttm,
        }
    }

    /// Short `yy-mm-dd` label used for chart frames.
    pub fn label(&self) -> String {
        self.date.format("%y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_differences() {
        let q = QuarterlyIncome::derive(
            NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
            IncomeLines {
                revenue: 90_753.0,
                gross_profit: 42_271.0,
                operating_income: 27_900.0,
                r_and_d: 7_903.0,
                sg_and_a: 6_468.0,
                eps_ttm: 6.43,
            },
        );

        assert_eq!(q.cost_of_revenue, 48_482.0);
        assert_eq!(q.operating_expenses, 14_371.0);
        assert_eq!(q.cost_of_revenue + q.gross_profit, q.revenue);
        assert_eq!(q.operating_expenses + q.operating_income, q.gross_profit);
        assert_eq!(q.label(), "24-05-03");
    }

    #[test]
    fn test_derive_operating_loss() {
        let q = QuarterlyIncome::derive(
            NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(),
            IncomeLines {
                revenue: 100.0,
                gross_profit: 20.0,
                operating_income: -15.0,
                r_and_d: 25.0,
                sg_and_a: 10.0,
                eps_ttm: -0.4,
            },
        );

        assert_eq!(q.operating_expenses, 35.0);
    }
}

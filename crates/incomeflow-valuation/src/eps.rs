//! Daily EPS series from quarterly values.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Trailing EPS in effect on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyEps {
    /// Calendar date
    pub date: NaiveDate,
    /// EPS in effect, `None` before the first quarter or when not positive
    pub eps: Option<f64>,
}

/// Expand quarterly EPS into one value per calendar day.
///
/// Covers every day from the earliest quarter date through `end`, carries
/// each quarter's EPS forward until the next quarter, keeps only the last
/// `keep_days` days and masks non-positive EPS (a P/E is undefined there).
/// Quarters dated after `end` are ignored; when two quarters share a date
/// the later one wins.
pub fn daily_eps(quarters: &[(NaiveDate, f64)], end: NaiveDate, keep_days: usize) -> Vec<DailyEps> {
    let by_date: BTreeMap<NaiveDate, f64> = quarters.iter().copied().collect();
    let Some(&start) = by_date.keys().next() else {
        return Vec::new();
    };
    if end < start {
        return Vec::new();
    }

    let mut current = None;
    let mut days: Vec<DailyEps> = start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|date| {
            if let Some(&eps) = by_date.get(&date) {
                current = Some(eps);
            }
            DailyEps { date, eps: current }
        })
        .collect();

    if days.len() > keep_days {
        days.drain(..days.len() - keep_days);
    }
    for day in &mut days {
        day.eps = day.eps.filter(|eps| *eps > 0.0);
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_forward_fill() {
        let quarters = [(date(2024, 1, 1), 2.0), (date(2024, 1, 4), 3.0)];
        let days = daily_eps(&quarters, date(2024, 1, 6), 100);

        let values: Vec<_> = days.iter().map(|d| d.eps).collect();
        assert_eq!(
            values,
            vec![Some(2.0), Some(2.0), Some(2.0), Some(3.0), Some(3.0), Some(3.0)]
        );
        assert_eq!(days[0].date, date(2024, 1, 1));
        assert_eq!(days[5].date, date(2024, 1, 6));
    }

    #[test]
    fn test_keeps_tail_and_masks_non_positive() {
        let quarters = [
            (date(2024, 1, 1), 1.0),
            (date(2024, 1, 3), -0.5),
            (date(2024, 1, 5), 0.0),
        ];
        let days = daily_eps(&quarters, date(2024, 1, 6), 4);

        assert_eq!(days.len(), 4);
        assert_eq!(days[0].date, date(2024, 1, 3));
        assert!(days.iter().all(|d| d.eps.is_none()));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(daily_eps(&[], date(2024, 1, 1), 10).is_empty());
        assert!(daily_eps(&[(date(2024, 2, 1), 1.0)], date(2024, 1, 1), 10).is_empty());
    }
}

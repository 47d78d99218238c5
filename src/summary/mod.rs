//! Bounded-length dataset compaction for LLM consumption.
//!
//! The narrative generator has a limited context budget, so structured
//! datasets are reduced to at most `max_periods` lines before being placed
//! in a prompt. The window keeps the most recent periods and renders them in
//! chronological order (oldest of the window first, newest last), one line
//! per period: `period -> key: value, key: value, ...`.
//!
//! The trend variant annotates every value with its direction relative to
//! the immediately preceding period in the window.

use crate::aggregate::EvolutionTable;
use std::fmt;

/// Direction of a value relative to the previous period in the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Increase,
    Decrease,
    NoChange,
}

impl Trend {
    /// Compare a value to its predecessor.
    pub fn between(previous: f64, current: f64) -> Self {
        if current > previous {
            Trend::Increase
        } else if current < previous {
            Trend::Decrease
        } else {
            Trend::NoChange
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Trend::Increase => "increase",
            Trend::Decrease => "decrease",
            Trend::NoChange => "no-change",
        };
        write!(f, "{label}")
    }
}

/// One period of a named numeric series: the period label (a year) and the
/// column values observed in it, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPeriod {
    pub period: i32,
    pub values: Vec<(String, f64)>,
}

/// Compact a dense count table into at most `max_periods` lines.
///
/// The most recent `max_periods` years are kept; within the window lines run
/// chronologically. Every category column appears on every line (the table
/// is dense, so absent combinations are explicit zeros).
pub fn compact_counts(table: &EvolutionTable, max_periods: usize) -> String {
    let window_start = table.years.len().saturating_sub(max_periods);
    let mut lines = Vec::with_capacity(table.years.len() - window_start);

    for (row, &year) in table.years.iter().enumerate().skip(window_start) {
        let cells: Vec<String> = table
            .categories
            .iter()
            .enumerate()
            .map(|(col, category)| format!("{}: {}", category, table.counts[row][col]))
            .collect();
        lines.push(format!("{} -> {}", year, cells.join(", ")));
    }

    lines.join("\n")
}

/// Compact a named numeric series into at most `max_periods` trend-annotated
/// lines.
///
/// Periods are sorted chronologically, the most recent `max_periods` kept.
/// Each value carries a direction marker computed against the same key in
/// the immediately preceding period of the window; a key absent from the
/// previous period is treated as 0. The first period of the window has no
/// comparison basis and defaults to `no-change`.
pub fn compact_trends(periods: &[TrendPeriod], max_periods: usize) -> String {
    let mut ordered: Vec<&TrendPeriod> = periods.iter().collect();
    ordered.sort_by_key(|p| p.period);
    let window_start = ordered.len().saturating_sub(max_periods);
    let window = &ordered[window_start..];

    let mut lines = Vec::with_capacity(window.len());
    for (position, period) in window.iter().enumerate() {
        let previous = position.checked_sub(1).map(|i| window[i]);
        let cells: Vec<String> = period
            .values
            .iter()
            .map(|(key, value)| {
                let trend = match previous {
                    Some(prev) => {
                        let baseline = prev
                            .values
                            .iter()
                            .find(|(k, _)| k == key)
                            .map(|(_, v)| *v)
                            .unwrap_or(0.0);
                        Trend::between(baseline, *value)
                    }
                    None => Trend::NoChange,
                };
                format!("{}: {} ({})", key, format_value(*value), trend)
            })
            .collect();
        lines.push(format!("{} -> {}", period.period, cells.join(", ")));
    }

    lines.join("\n")
}

/// Render integral values without a decimal point, everything else with two
/// decimals.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;

    fn doc(id: usize, year: i32, category: &str) -> Document {
        Document {
            id,
            title: String::new(),
            link: None,
            abstract_text: String::new(),
            conclusion: String::new(),
            date: None,
            year: Some(year),
            primary_category: Some(category.to_string()),
        }
    }

    #[test]
    fn test_compact_counts_bounded() {
        // 20 years of data, window of 5: exactly 5 lines, most recent last.
        let documents: Vec<Document> = (0..20).map(|i| doc(i, 2000 + i as i32, "A")).collect();
        let table = EvolutionTable::build(&documents);
        let summary = compact_counts(&table, 5);
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("2015 ->"));
        assert!(lines[4].starts_with("2019 ->"));
    }

    #[test]
    fn test_compact_counts_includes_zero_cells() {
        let documents = vec![doc(0, 2020, "A"), doc(1, 2021, "B")];
        let table = EvolutionTable::build(&documents);
        let summary = compact_counts(&table, 5);
        assert_eq!(summary, "2020 -> A: 1, B: 0\n2021 -> A: 0, B: 1");
    }

    #[test]
    fn test_compact_counts_fewer_years_than_window() {
        let documents = vec![doc(0, 2020, "A")];
        let table = EvolutionTable::build(&documents);
        let summary = compact_counts(&table, 5);
        assert_eq!(summary.lines().count(), 1);
    }

    fn period(year: i32, value: f64) -> TrendPeriod {
        TrendPeriod {
            period: year,
            values: vec![("Budget".to_string(), value)],
        }
    }

    #[test]
    fn test_trend_markers() {
        // Values [10, 8, 8] -> markers [no-change, decrease, no-change].
        let periods = vec![period(2019, 10.0), period(2020, 8.0), period(2021, 8.0)];
        let summary = compact_trends(&periods, 5);
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines[0], "2019 -> Budget: 10 (no-change)");
        assert_eq!(lines[1], "2020 -> Budget: 8 (decrease)");
        assert_eq!(lines[2], "2021 -> Budget: 8 (no-change)");
    }

    #[test]
    fn test_trend_increase() {
        let periods = vec![period(2020, 1.0), period(2021, 2.5)];
        let summary = compact_trends(&periods, 5);
        assert!(summary.contains("Budget: 2.50 (increase)"));
    }

    #[test]
    fn test_trend_window_bound_and_order() {
        let periods: Vec<TrendPeriod> = (0..12).map(|i| period(2010 + i, i as f64)).collect();
        let summary = compact_trends(&periods, 4);
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("2018 ->"));
        assert!(lines[3].starts_with("2021 ->"));
        // Window-relative baseline: the first window line is no-change even
        // though earlier periods exist.
        assert!(lines[0].contains("(no-change)"));
    }

    #[test]
    fn test_trend_missing_key_treated_as_zero() {
        let periods = vec![
            TrendPeriod {
                period: 2020,
                values: vec![("A".to_string(), 3.0)],
            },
            TrendPeriod {
                period: 2021,
                values: vec![("A".to_string(), 3.0), ("B".to_string(), 2.0)],
            },
        ];
        let summary = compact_trends(&periods, 5);
        // B had no 2020 value; baseline 0 makes 2.0 an increase.
        assert!(summary.contains("B: 2 (increase)"));
    }

    #[test]
    fn test_unsorted_periods_are_ordered() {
        let periods = vec![period(2021, 5.0), period(2019, 1.0), period(2020, 3.0)];
        let summary = compact_trends(&periods, 5);
        let years: Vec<&str> = summary
            .lines()
            .map(|l| l.split(" ->").next().unwrap())
            .collect();
        assert_eq!(years, vec!["2019", "2020", "2021"]);
    }
}

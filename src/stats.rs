// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Descriptive statistics over columns with missing values
//!
//! All helpers take only the non-missing observations and return `None`
//! when there are too few of them, never zero.

use crate::table::{format_number, format_optional, RawTable};
use serde::Serialize;

/// A named numeric column; `None` marks a missing cell
#[derive(Debug, Clone, PartialEq)]
pub struct NumericColumn {
    /// Column name
    pub name: String,
    /// One value per row
    pub values: Vec<Option<f64>>,
}

impl NumericColumn {
    /// Create a column
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Non-missing values in row order
    #[must_use]
    pub fn present(&self) -> Vec<f64> {
        self.values.iter().filter_map(|v| *v).collect()
    }

    /// Whether at least one value is present
    #[must_use]
    pub fn has_values(&self) -> bool {
        self.values.iter().any(Option::is_some)
    }
}

/// Sum, `None` for no observations
#[must_use]
pub fn sum(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum())
}

/// Arithmetic mean
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    sum(values).map(|s| s / values.len() as f64)
}

/// Median; the mean of the middle pair for even counts
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(&sorted(values), 0.5)
}

/// Sample standard deviation (n - 1), `None` below two observations
#[must_use]
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Ascending copy of `values`
#[must_use]
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// Quantile `q` in `[0, 1]` of an ascending slice, linearly interpolated
/// between the surrounding order statistics
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Ranks starting at 1; ties share the average of their positions
#[must_use]
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start..end are 0-based; ranks are 1-based
        let rank = (start + end + 1) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}

// =========================================================================
// Descriptive Summary
// =========================================================================

/// Distribution of one numeric column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    /// Column name
    pub column: String,
    /// Non-missing observations
    pub count: usize,
    /// Mean
    pub mean: Option<f64>,
    /// Sample standard deviation
    pub std: Option<f64>,
    /// Minimum
    pub min: Option<f64>,
    /// First quartile
    pub q25: Option<f64>,
    /// Median
    pub q50: Option<f64>,
    /// Third quartile
    pub q75: Option<f64>,
    /// Maximum
    pub max: Option<f64>,
}

impl ColumnSummary {
    /// Summarize one column
    #[must_use]
    pub fn of(column: &NumericColumn) -> Self {
        let values = column.present();
        let ordered = sorted(&values);
        Self {
            column: column.name.clone(),
            count: values.len(),
            mean: mean(&values),
            std: sample_std(&values),
            min: ordered.first().copied(),
            q25: quantile(&ordered, 0.25),
            q50: quantile(&ordered, 0.5),
            q75: quantile(&ordered, 0.75),
            max: ordered.last().copied(),
        }
    }
}

/// Header of the persisted summary table
pub const SUMMARY_HEADER: [&str; 9] = ["column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// One summary per column, in column order
#[must_use]
pub fn describe(columns: &[NumericColumn]) -> Vec<ColumnSummary> {
    columns.iter().map(ColumnSummary::of).collect()
}

/// Summaries as a table with one row per column
#[must_use]
pub fn summary_table(summaries: &[ColumnSummary]) -> RawTable {
    let mut table = RawTable::new(SUMMARY_HEADER.iter().map(ToString::to_string).collect());
    for s in summaries {
        table.push_row(vec![
            s.column.clone(),
            format_number(s.count as f64),
            format_optional(s.mean),
            format_optional(s.std),
            format_optional(s.min),
            format_optional(s.q25),
            format_optional(s.q50),
            format_optional(s.q75),
            format_optional(s.max),
        ]);
    }
    table
}

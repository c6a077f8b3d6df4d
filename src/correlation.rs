// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Correlation tests between popularity, activity, age and code quality
//!
//! Spearman and Pearson coefficients with two-sided p-values from
//! Student's t distribution (n - 2 degrees of freedom), computed via the
//! `statrs` crate.

use crate::stats::{average_ranks, NumericColumn};
use crate::table::{format_number, format_optional, RawTable};
use crate::types::CorrelationResult;
use statrs::distribution::{ContinuousCDF, StudentsT};
use tracing::{debug, warn};

/// Fewest paired observations a test is run on
pub const MIN_OBSERVATIONS: usize = 3;

/// A named question: does `y` move with the first available `x`?
#[derive(Debug, Clone, Copy)]
pub struct PairSpec {
    /// What the pair measures
    pub description: &'static str,
    /// Candidate x columns; the first one with data is used
    pub x: &'static [&'static str],
    /// The y column
    pub y: &'static str,
}

/// The metric pairs under study
pub const PAIRS: &[PairSpec] = &[
    PairSpec {
        description: "popularity vs cohesion",
        x: &["stars"],
        y: "lcom_median",
    },
    PairSpec {
        description: "age vs coupling",
        x: &["age_years"],
        y: "cbo_median",
    },
    PairSpec {
        description: "activity vs cohesion",
        x: &["days_since_push", "releases", "forks"],
        y: "lcom_median",
    },
    PairSpec {
        description: "size vs inheritance depth",
        x: &["loc_sum"],
        y: "dit_median",
    },
];

/// Pearson coefficient; `None` when either side has zero variance or the
/// arithmetic does not produce a finite value
#[must_use]
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let n = x.len() as f64;
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mx, b - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    let r = (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0);
    r.is_finite().then_some(r)
}

/// Spearman rank coefficient: Pearson over average ranks
#[must_use]
pub fn spearman(x: &[f64], y: &[f64]) -> Option<f64> {
    pearson(&average_ranks(x), &average_ranks(y))
}

/// Two-sided p-value of a correlation coefficient over `n` observations
#[must_use]
pub fn p_value(r: f64, n: usize) -> Option<f64> {
    if n < MIN_OBSERVATIONS || !r.is_finite() {
        return None;
    }
    if r.abs() >= 1.0 {
        return Some(0.0);
    }
    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r)).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    let p = 2.0 * dist.sf(t.abs());
    p.is_finite().then(|| p.clamp(0.0, 1.0))
}

/// Rows where both columns are present, as parallel vectors
#[must_use]
pub fn paired(x: &NumericColumn, y: &NumericColumn) -> (Vec<f64>, Vec<f64>) {
    x.values
        .iter()
        .zip(&y.values)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .unzip()
}

fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|v| *v == values[0])
}

/// Run both tests on one pair of columns
///
/// Returns `None` when fewer than [`MIN_OBSERVATIONS`] rows have both
/// values or when either column is constant over those rows.
#[must_use]
pub fn test_pair(pair: &str, x: &NumericColumn, y: &NumericColumn) -> Option<CorrelationResult> {
    let (xs, ys) = paired(x, y);
    let n = xs.len();
    if n < MIN_OBSERVATIONS {
        debug!("{pair}: {n} paired observations, skipping");
        return None;
    }
    if is_constant(&xs) || is_constant(&ys) {
        debug!("{pair}: constant column, skipping");
        return None;
    }

    let Some(spearman_r) = spearman(&xs, &ys) else {
        warn!("{pair}: Spearman coefficient not computable");
        return None;
    };
    let spearman_p = p_value(spearman_r, n)?;

    let pearson_r = pearson(&xs, &ys);
    let pearson_p = pearson_r.and_then(|r| p_value(r, n));
    let pearson_r = pearson_r.filter(|_| pearson_p.is_some());

    Some(CorrelationResult {
        pair: pair.to_string(),
        n,
        spearman_r,
        spearman_p,
        pearson_r,
        pearson_p,
    })
}

fn find<'a>(columns: &'a [NumericColumn], name: &str) -> Option<&'a NumericColumn> {
    columns.iter().find(|c| c.name == name)
}

/// Evaluate every pair of [`PAIRS`] whose columns are available
#[must_use]
pub fn correlation_tests(columns: &[NumericColumn]) -> Vec<CorrelationResult> {
    PAIRS
        .iter()
        .filter_map(|spec| {
            let y = find(columns, spec.y)?;
            let x = spec
                .x
                .iter()
                .filter_map(|name| find(columns, name))
                .find(|c| c.has_values());
            let Some(x) = x else {
                debug!("{}: no x column with data among {:?}", spec.description, spec.x);
                return None;
            };
            test_pair(&format!("{}_vs_{}", x.name, y.name), x, y)
        })
        .collect()
}

/// Header of the persisted correlation table
pub const CORRELATION_HEADER: [&str; 6] = ["pair", "n", "spearman_r", "spearman_p", "pearson_r", "pearson_p"];

/// Correlation results as a table
#[must_use]
pub fn correlation_table(results: &[CorrelationResult]) -> RawTable {
    let mut table = RawTable::new(CORRELATION_HEADER.iter().map(ToString::to_string).collect());
    for r in results {
        table.push_row(vec![
            r.pair.clone(),
            format_number(r.n as f64),
            format_number(r.spearman_r),
            format_number(r.spearman_p),
            format_optional(r.pearson_r),
            format_optional(r.pearson_p),
        ]);
    }
    table
}

// =========================================================================
// Spearman Matrix
// =========================================================================

/// Pairwise Spearman coefficients across numeric columns
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    /// Column names, rows and columns share this order
    pub columns: Vec<String>,
    /// `cells[i][j]` is the coefficient of columns i and j
    pub cells: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Coefficient between two named columns
    #[must_use]
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.cells[i][j]
    }

    /// Matrix as a table, first column naming the row
    #[must_use]
    pub fn to_raw(&self) -> RawTable {
        let mut headers = vec!["column".to_string()];
        headers.extend(self.columns.iter().cloned());
        let mut table = RawTable::new(headers);
        for (name, row) in self.columns.iter().zip(&self.cells) {
            let mut cells = vec![name.clone()];
            cells.extend(row.iter().map(|v| format_optional(*v)));
            table.push_row(cells);
        }
        table
    }
}

/// Spearman matrix with pairwise-complete observations
///
/// `None` when there are fewer than two columns. A cell is missing when
/// its pair has under two joint observations or no variance.
#[must_use]
pub fn spearman_matrix(columns: &[NumericColumn]) -> Option<CorrelationMatrix> {
    if columns.len() < 2 {
        return None;
    }
    let k = columns.len();
    let mut cells = vec![vec![None; k]; k];
    for i in 0..k {
        for j in i..k {
            let (xs, ys) = paired(&columns[i], &columns[j]);
            let r = spearman(&xs, &ys);
            cells[i][j] = r;
            cells[j][i] = r;
        }
    }
    Some(CorrelationMatrix {
        columns: columns.iter().map(|c| c.name.clone()).collect(),
        cells,
    })
}

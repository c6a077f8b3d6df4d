// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! End-to-end analysis: reconcile, aggregate, join, summarize, correlate

use crate::aggregate::aggregate;
use crate::correlation::{correlation_table, correlation_tests, spearman_matrix, CorrelationMatrix};
use crate::join::{join, ProfileTable};
use crate::schema::{reconcile_classes, reconcile_metadata};
use crate::stats::{describe, summary_table, ColumnSummary};
use crate::table::RawTable;
use crate::temporal;
use crate::types::CorrelationResult;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Repository-level table
pub const REPO_LEVEL_FILE: &str = "repo_level_metrics.csv";
/// Descriptive statistics table
pub const STATS_SUMMARY_FILE: &str = "stats_summary.csv";
/// Correlation test table
pub const CORRELATION_FILE: &str = "correlation_tests.csv";
/// Spearman matrix table
pub const SPEARMAN_MATRIX_FILE: &str = "spearman_correlation_matrix.csv";

/// Everything computed from one pair of input tables
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Number of class rows read
    pub classes: usize,
    /// Number of metadata rows read
    pub metadata_rows: usize,
    /// Joined repository-level table
    pub profiles: ProfileTable,
    /// One summary per numeric column
    pub summary: Vec<ColumnSummary>,
    /// Pairs that met their preconditions
    pub correlations: Vec<CorrelationResult>,
    /// Pairwise Spearman matrix, when there are at least two numeric columns
    pub matrix: Option<CorrelationMatrix>,
}

/// Run every in-memory stage over already loaded tables
#[must_use]
pub fn analyze(classes: &RawTable, metadata: &RawTable, now: DateTime<Utc>) -> Analysis {
    let records = reconcile_classes(classes);
    let summaries = aggregate(&records);

    let mut meta = reconcile_metadata(metadata);
    temporal::derive(&mut meta, now);

    let profiles = join(summaries, &meta);
    let numeric = profiles.numeric_columns();

    Analysis {
        classes: records.len(),
        metadata_rows: meta.rows.len(),
        summary: describe(&numeric),
        correlations: correlation_tests(&numeric),
        matrix: spearman_matrix(&numeric),
        profiles,
    }
}

/// Files written by [`write_outputs`]
#[derive(Debug, Clone, Serialize)]
pub struct OutputPaths {
    /// Repository-level table
    pub repo_level: PathBuf,
    /// Descriptive statistics
    pub stats_summary: PathBuf,
    /// Correlation tests
    pub correlations: PathBuf,
    /// Spearman matrix, when computed
    pub spearman_matrix: Option<PathBuf>,
}

/// Persist an analysis into `dir`
pub fn write_outputs(analysis: &Analysis, dir: &Path) -> Result<OutputPaths> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let paths = OutputPaths {
        repo_level: dir.join(REPO_LEVEL_FILE),
        stats_summary: dir.join(STATS_SUMMARY_FILE),
        correlations: dir.join(CORRELATION_FILE),
        spearman_matrix: analysis.matrix.as_ref().map(|_| dir.join(SPEARMAN_MATRIX_FILE)),
    };

    analysis.profiles.to_raw().write_path(&paths.repo_level)?;
    summary_table(&analysis.summary).write_path(&paths.stats_summary)?;
    correlation_table(&analysis.correlations).write_path(&paths.correlations)?;
    if let (Some(matrix), Some(path)) = (&analysis.matrix, &paths.spearman_matrix) {
        matrix.to_raw().write_path(path)?;
    }

    Ok(paths)
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Class rows read
    pub classes: usize,
    /// Repositories in the joined table
    pub repositories: usize,
    /// Repositories with matched metadata
    pub matched: usize,
    /// Metadata rows read
    pub metadata_rows: usize,
    /// Correlation results
    pub correlations: Vec<CorrelationResult>,
    /// Files written
    pub outputs: OutputPaths,
}

/// Load both inputs, analyze, and write every output table
///
/// A missing input file is fatal.
pub fn run_analysis(
    classes_csv: &Path,
    metadata_csv: &Path,
    results_dir: &Path,
    now: DateTime<Utc>,
) -> Result<AnalysisReport> {
    let classes = RawTable::read_path(classes_csv)
        .with_context(|| format!("Failed to load class metrics from {}", classes_csv.display()))?;
    let metadata = RawTable::read_path(metadata_csv)
        .with_context(|| format!("Failed to load repository metadata from {}", metadata_csv.display()))?;
    info!(
        "Loaded {} class rows and {} metadata rows",
        classes.len(),
        metadata.len()
    );

    let analysis = analyze(&classes, &metadata, now);
    let outputs = write_outputs(&analysis, results_dir)?;
    info!("Results written to {}", results_dir.display());

    Ok(AnalysisReport {
        classes: analysis.classes,
        repositories: analysis.profiles.rows.len(),
        matched: analysis.profiles.matched(),
        metadata_rows: analysis.metadata_rows,
        correlations: analysis.correlations,
        outputs,
    })
}

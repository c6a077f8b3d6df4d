// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Run command - merge followed by analyze, using configured paths

use super::Output;
use crate::config::PathsConfig;
use crate::merge::{discover_class_files, merge_class_files};
use anyhow::{Context, Result};
use tracing::info;

/// Run merge then analyze; only the analysis report is printed
pub fn run(paths: &PathsConfig, out: Output) -> Result<()> {
    let files = discover_class_files(&paths.ck_output_dir, &paths.class_pattern)?;
    let outcome = merge_class_files(&files)?;
    outcome
        .table
        .write_path(&paths.classes_csv)
        .with_context(|| format!("Failed to save merged table to {}", paths.classes_csv.display()))?;
    info!(
        "Merged {} classes into {}",
        outcome.table.len(),
        paths.classes_csv.display()
    );

    super::analyze::run(&paths.classes_csv, &paths.metadata_csv, &paths.results_dir, out)
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Merge command - stacks per-class analyzer output into one table

use super::Output;
use crate::merge::{discover_class_files, merge_class_files};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Run the merge command
pub fn run(ck_dir: &Path, pattern: &str, output: &Path, out: Output) -> Result<()> {
    info!("Merging '{}' files from {}", pattern, ck_dir.display());

    let files = discover_class_files(ck_dir, pattern)?;
    let outcome = merge_class_files(&files)?;
    outcome
        .table
        .write_path(output)
        .with_context(|| format!("Failed to save merged table to {}", output.display()))?;

    if out.json {
        let summary = serde_json::json!({
            "output": output,
            "classes": outcome.table.len(),
            "merged": outcome.merged,
            "skipped": outcome.skipped,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "Merged {} classes from {} files into {}",
        outcome.table.len(),
        outcome.merged.len(),
        output.display()
    );
    for skipped in &outcome.skipped {
        eprintln!("  {} {}", out.warn("skipped:"), skipped.display());
    }
    Ok(())
}

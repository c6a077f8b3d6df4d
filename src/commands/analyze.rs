// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Analyze command - builds the repository-level table and its statistics

use super::Output;
use crate::pipeline::{run_analysis, AnalysisReport};
use crate::table::format_optional;
use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;
use tracing::info;

/// Run the analyze command
pub fn run(classes: &Path, metadata: &Path, results: &Path, out: Output) -> Result<()> {
    info!("Analyzing {} with {}", classes.display(), metadata.display());

    let report = run_analysis(classes, metadata, results, Utc::now())?;
    print_report(&report, out)
}

/// Print a run summary as text or JSON
pub fn print_report(report: &AnalysisReport, out: Output) -> Result<()> {
    if out.json {
        let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
        println!("{json}");
        return Ok(());
    }

    println!("{}", out.heading("Repository-level analysis"));
    println!("  classes:       {}", report.classes);
    println!("  repositories:  {}", report.repositories);
    let matched = format!("{}/{}", report.matched, report.repositories);
    if report.matched == report.repositories {
        println!("  with metadata: {}", out.good(&matched));
    } else {
        println!("  with metadata: {}", out.warn(&matched));
    }
    println!();

    if report.correlations.is_empty() {
        println!("{}", out.warn("No metric pair had enough varying observations to test."));
    } else {
        println!("{}", out.heading("Correlation tests"));
        println!(
            "  {:<32} {:>5} {:>10} {:>10} {:>10} {:>10}",
            "pair", "n", "spearman", "p", "pearson", "p"
        );
        for r in &report.correlations {
            println!(
                "  {:<32} {:>5} {:>10.4} {:>10.4} {:>10} {:>10}",
                r.pair,
                r.n,
                r.spearman_r,
                r.spearman_p,
                format_optional(r.pearson_r.map(round4)),
                format_optional(r.pearson_p.map(round4)),
            );
        }
    }
    println!();

    println!("Results:");
    println!("  {}", report.outputs.repo_level.display());
    println!("  {}", report.outputs.stats_summary.display());
    println!("  {}", report.outputs.correlations.display());
    if let Some(path) = &report.outputs.spearman_matrix {
        println!("  {}", path.display());
    }
    Ok(())
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! End-to-end scenario through the library and the binary
//!
//! Two analyzed repositories, metadata for only one of them:
//! 1. Write per-class analyzer output for `A` (3 classes) and `B` (1 class)
//! 2. Write metadata for `A` only (100 stars, created two years ago)
//! 3. Merge and analyze
//! 4. Verify the joined table keeps `B` with missing metadata

use chrono::{Duration, Utc};
use repoquality::pipeline::{analyze, run_analysis, REPO_LEVEL_FILE, STATS_SUMMARY_FILE};
use repoquality::table::RawTable;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Run repoquality with the given arguments inside `dir`
fn run_repoquality(dir: &TempDir, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_repoquality"))
        .current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("xdg"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute repoquality")
}

/// Helper to get stdout as string
fn stdout_str(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Helper to get stderr as string
fn stderr_str(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Assert command succeeded
fn assert_success(output: &std::process::Output, context: &str) {
    if !output.status.success() {
        eprintln!("Command failed: {}", context);
        eprintln!("STDOUT: {}", stdout_str(output));
        eprintln!("STDERR: {}", stderr_str(output));
        panic!("Command failed: {}", context);
    }
}

fn created_two_years_ago() -> String {
    let created = Utc::now() - Duration::seconds((2.0 * 365.25 * 86_400.0) as i64);
    created.to_rfc3339()
}

/// Set up analyzer output and metadata under `root`
fn setup_inputs(root: &Path) {
    let ck = root.join("ck_outputs");
    fs::create_dir_all(&ck).unwrap();
    fs::write(
        ck.join("Aclass.csv"),
        "file,class,cbo,dit,lcom,loc,wmc\n\
         A/src/One.java,One,1,1,1,10,2\n\
         A/src/Two.java,Two,2,1,2,20,3\n\
         A/src/Three.java,Three,3,2,3,30,4\n",
    )
    .unwrap();
    fs::write(
        ck.join("Bclass.csv"),
        "file,class,cbo,dit,lcom,loc,wmc\nB/src/Only.java,Only,4,1,5,50,6\n",
    )
    .unwrap();

    let data = root.join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(
        data.join("top1000_java_repos.csv"),
        format!(
            "nameWithOwner,url,stargazerCount,createdAt,pushedAt\n\
             A,https://example.org/A,100,{},{}\n",
            created_two_years_ago(),
            Utc::now().to_rfc3339()
        ),
    )
    .unwrap();
}

fn row_of<'a>(table: &'a RawTable, key: &str) -> &'a [String] {
    table
        .rows()
        .iter()
        .find(|r| r[0] == key)
        .unwrap_or_else(|| panic!("no row for {key}"))
}

fn value<'a>(table: &'a RawTable, key: &str, column: &str) -> &'a str {
    let idx = table.find_column(column).unwrap_or_else(|| panic!("no column {column}"));
    row_of(table, key)[idx].as_str()
}

#[test]
fn test_scenario_through_library() {
    let classes = RawTable::from_reader(
        "repo_name,cbo,dit,lcom,loc,wmc\nA,1,1,1,10,2\nA,2,1,2,20,3\nA,3,2,3,30,4\nB,4,1,5,50,6\n".as_bytes(),
    )
    .unwrap();
    let metadata = RawTable::from_reader(
        format!("nameWithOwner,stargazerCount,createdAt\nA,100,{}\n", created_two_years_ago()).as_bytes(),
    )
    .unwrap();

    let analysis = analyze(&classes, &metadata, Utc::now());
    let profiles = &analysis.profiles;

    assert_eq!(profiles.rows.len(), 2);

    let a = profiles.get("A").unwrap();
    assert_eq!(a.summary.lcom.median, Some(2.0));
    assert_eq!(a.summary.num_classes, 3);
    assert_eq!(a.stars(), Some(100.0));
    assert!((a.age_years().unwrap() - 2.0).abs() < 0.01);

    let b = profiles.get("B").unwrap();
    assert_eq!(b.summary.lcom.median, Some(5.0));
    assert_eq!(b.summary.num_classes, 1);
    assert_eq!(b.stars(), None);
    assert_eq!(b.age_years(), None);
}

#[test]
fn test_scenario_persisted_tables() {
    let dir = TempDir::new().unwrap();
    let classes = dir.path().join("classes.csv");
    let metadata = dir.path().join("meta.csv");
    fs::write(&classes, "repo_name,lcom\nA,1\nA,2\nA,3\nB,5\n").unwrap();
    fs::write(
        &metadata,
        format!("nameWithOwner,stargazerCount,createdAt\nA,100,{}\n", created_two_years_ago()),
    )
    .unwrap();

    let report = run_analysis(&classes, &metadata, &dir.path().join("results"), Utc::now()).unwrap();

    assert_eq!(report.repositories, 2);
    assert_eq!(report.matched, 1);
    assert!(report.outputs.spearman_matrix.is_some());

    let repo_level = RawTable::read_path(&report.outputs.repo_level).unwrap();
    assert_eq!(value(&repo_level, "A", "lcom_median"), "2");
    assert_eq!(value(&repo_level, "A", "num_classes"), "3");
    assert_eq!(value(&repo_level, "A", "stars"), "100");
    assert_eq!(value(&repo_level, "B", "lcom_median"), "5");
    assert_eq!(value(&repo_level, "B", "stars"), "");
    assert_eq!(value(&repo_level, "B", "age_years"), "");
    // cbo was never reported by the analyzer
    assert_eq!(value(&repo_level, "A", "cbo_mean"), "");

    let stats = RawTable::read_path(&report.outputs.stats_summary).unwrap();
    assert_eq!(value(&stats, "num_classes", "count"), "2");
    assert_eq!(value(&stats, "stars", "count"), "1");

    let correlations = RawTable::read_path(&report.outputs.correlations).unwrap();
    assert!(correlations.is_empty());
    assert_eq!(correlations.headers()[0], "pair");
}

#[test]
fn test_scenario_through_binary() {
    let dir = TempDir::new().unwrap();
    setup_inputs(dir.path());

    let output = run_repoquality(&dir, &["merge"]);
    assert_success(&output, "merge");
    assert!(stdout_str(&output).contains("Merged 4 classes from 2 files"));

    let output = run_repoquality(&dir, &["analyze"]);
    assert_success(&output, "analyze");
    assert!(stdout_str(&output).contains("with metadata: 1/2"));

    let results = dir.path().join("results");
    let repo_level = RawTable::read_path(&results.join(REPO_LEVEL_FILE)).unwrap();
    assert_eq!(repo_level.len(), 2);
    assert_eq!(value(&repo_level, "A", "num_classes"), "3");
    assert_eq!(value(&repo_level, "A", "lcom_median"), "2");
    assert_eq!(value(&repo_level, "A", "url"), "https://example.org/A");
    assert_eq!(value(&repo_level, "B", "num_classes"), "1");
    assert_eq!(value(&repo_level, "B", "url"), "");

    let age: f64 = value(&repo_level, "A", "age_years").parse().unwrap();
    assert!((age - 2.0).abs() < 0.01);
    let days: f64 = value(&repo_level, "A", "days_since_push").parse().unwrap();
    assert!(days < 1.0);

    assert!(results.join(STATS_SUMMARY_FILE).is_file());
}

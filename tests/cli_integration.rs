// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Integration tests for the repoquality CLI commands

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Command for repoquality isolated from the user's configuration
fn repoquality(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("repoquality").unwrap();
    cmd.current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("xdg"))
        .env("NO_COLOR", "1")
        .env_remove("REPOQUALITY_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

#[test]
fn test_merge_stacks_class_files() {
    let dir = TempDir::new().unwrap();
    let ck = dir.path().join("ck");
    write(&ck.join("alphaclass.csv"), "file,class,cbo\na/X.java,X,1\na/Y.java,Y,2\n");
    write(&ck.join("betaclass.csv"), "file,class,lcom\nb/Z.java,Z,7\n");
    write(&ck.join("notes.txt"), "ignored");

    repoquality(&dir)
        .args(["merge", "--ck-dir", "ck", "--output", "merged.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged 3 classes from 2 files"));

    let merged = fs::read_to_string(dir.path().join("merged.csv")).unwrap();
    let mut lines = merged.lines();
    let header = lines.next().unwrap();
    for column in ["file", "class", "cbo", "lcom", "repo_name"] {
        assert!(header.split(',').any(|h| h == column), "missing {column} in {header}");
    }
    assert_eq!(lines.count(), 3);
    assert!(merged.contains("alpha"));
    assert!(merged.contains("beta"));
}

#[test]
fn test_merge_without_class_files_fails() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("ck")).unwrap();

    repoquality(&dir)
        .args(["merge", "--ck-dir", "ck"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("class.csv"));
}

#[test]
fn test_merge_json_summary() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("ck/oneclass.csv"), "file,cbo\nX.java,1\n");

    let output = repoquality(&dir)
        .args(["--json", "merge", "--ck-dir", "ck", "--output", "m.csv"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["classes"], 1);
    assert_eq!(json["merged"].as_array().unwrap().len(), 1);
    assert!(json["skipped"].as_array().unwrap().is_empty());
}

#[test]
fn test_analyze_writes_result_tables() {
    let dir = TempDir::new().unwrap();
    write(
        &dir.path().join("classes.csv"),
        "repo_name,cbo,dit,lcom,loc,wmc\n\
         a,1,1,1,10,1\nb,2,2,4,20,2\nc,3,2,2,30,3\nd,4,3,8,40,4\n",
    );
    write(
        &dir.path().join("meta.csv"),
        "full_name,stargazers_count,forks_count\na,10,1\nb,20,4\nc,30,2\nd,40,9\n",
    );

    repoquality(&dir)
        .args([
            "analyze",
            "--classes",
            "classes.csv",
            "--metadata",
            "meta.csv",
            "--results",
            "out",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("with metadata: 4/4"))
        .stdout(predicate::str::contains("stars_vs_lcom_median"));

    let out = dir.path().join("out");
    for file in [
        "repo_level_metrics.csv",
        "stats_summary.csv",
        "correlation_tests.csv",
        "spearman_correlation_matrix.csv",
    ] {
        assert!(out.join(file).is_file(), "{file} not written");
    }

    let correlations = fs::read_to_string(out.join("correlation_tests.csv")).unwrap();
    assert!(correlations.starts_with("pair,n,spearman_r,spearman_p,pearson_r,pearson_p"));
    assert!(correlations.contains("stars_vs_lcom_median,4,"));
    assert!(correlations.contains("forks_vs_lcom_median,4,"));
    assert!(correlations.contains("loc_sum_vs_dit_median,4,"));
}

#[test]
fn test_analyze_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("meta.csv"), "nameWithOwner\na\n");

    repoquality(&dir)
        .args(["analyze", "--classes", "absent.csv", "--metadata", "meta.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.csv"));

    assert!(!dir.path().join("results").exists());
}

#[test]
fn test_run_uses_config_file_paths() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("in/repoclass.csv"), "file,lcom\nA.java,3\nB.java,5\n");
    write(&dir.path().join("meta.csv"), "nameWithOwner,stargazerCount\nrepo,12\n");
    write(
        &dir.path().join("repoquality.toml"),
        "[paths]\n\
         ck_output_dir = \"in\"\n\
         classes_csv = \"work/classes.csv\"\n\
         metadata_csv = \"meta.csv\"\n\
         results_dir = \"work/results\"\n",
    );

    repoquality(&dir)
        .args(["--config", "repoquality.toml", "run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("with metadata: 1/1"));

    assert!(dir.path().join("work/classes.csv").is_file());
    let repo_level = fs::read_to_string(dir.path().join("work/results/repo_level_metrics.csv")).unwrap();
    assert!(repo_level.lines().nth(1).unwrap().starts_with("repo,"));
}

#[test]
fn test_config_shows_defaults_and_env_overrides() {
    let dir = TempDir::new().unwrap();

    repoquality(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("ck_output_dir = \"ck_outputs\""))
        .stdout(predicate::str::contains("per_page = 100"));

    repoquality(&dir)
        .arg("config")
        .env("REPOQUALITY_FETCH__TARGET", "50")
        .assert()
        .success()
        .stdout(predicate::str::contains("target = 50"));
}

#[test]
fn test_config_path_points_at_config_dir() {
    let dir = TempDir::new().unwrap();

    repoquality(&dir)
        .args(["config", "--path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_fetch_requires_token() {
    let dir = TempDir::new().unwrap();

    repoquality(&dir)
        .arg("fetch")
        .env_remove("GITHUB_TOKEN")
        .assert()
        .failure()
        .stderr(predicate::str::contains("GITHUB_TOKEN"));
}

#[test]
fn test_completions_bash() {
    let dir = TempDir::new().unwrap();

    repoquality(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("repoquality"));
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Invariant tests for the reconciliation pipeline
//!
//! These tests verify critical invariants:
//! 1. Key normalization - equal repositories produce equal keys
//! 2. Aggregation - class counts and missing-value handling
//! 3. Join - completeness and exclusivity of the left join
//! 4. Degradation - bad values become missing, never errors

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use repoquality::aggregate::aggregate;
use repoquality::correlation::{correlation_tests, test_pair};
use repoquality::join::join;
use repoquality::key::normalize_repo_key;
use repoquality::schema::{reconcile_classes, reconcile_metadata};
use repoquality::stats::NumericColumn;
use repoquality::table::RawTable;
use repoquality::temporal::age_years;
use repoquality::types::ClassMetricRecord;
use std::collections::{HashMap, HashSet};

// =============================================================================
// Test Helpers
// =============================================================================

fn table(csv: &str) -> RawTable {
    RawTable::from_reader(csv.as_bytes()).unwrap()
}

fn class(key: &str, lcom: Option<f64>) -> ClassMetricRecord {
    ClassMetricRecord {
        repo_key: key.into(),
        lcom,
        ..Default::default()
    }
}

// =============================================================================
// Key Normalization
// =============================================================================

#[test]
fn test_key_spellings_converge() {
    let expected = "Owner_Repo";
    assert_eq!(normalize_repo_key(Some("Owner/Repo")), expected);
    assert_eq!(normalize_repo_key(Some("Owner\"/Repo'")), expected);
    assert_eq!(normalize_repo_key(Some(" Owner/Repo ")), expected);
}

#[test]
fn test_metric_and_metadata_keys_agree() {
    let classes = reconcile_classes(&table("repo_name,cbo\n\"Owner/Repo\",1\n"));
    let metadata = reconcile_metadata(&table("nameWithOwner,stargazerCount\n Owner/Repo ,3\n"));

    assert_eq!(classes[0].repo_key, metadata.rows[0].repo_key);
}

proptest! {
    #[test]
    fn prop_normalization_is_idempotent(raw in ".{0,40}") {
        let once = normalize_repo_key(Some(&raw));
        let twice = normalize_repo_key(Some(&once));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_normalized_keys_have_no_separators(raw in ".{0,40}") {
        let key = normalize_repo_key(Some(&raw));
        prop_assert!(!key.contains('/'));
        prop_assert!(!key.contains('"'));
        prop_assert!(!key.contains('\''));
        prop_assert_eq!(key.trim(), key.as_str());
    }
}

// =============================================================================
// Aggregation
// =============================================================================

proptest! {
    #[test]
    fn prop_num_classes_counts_rows(
        rows in prop::collection::vec((0usize..5, prop::option::of(-100.0f64..100.0)), 0..60)
    ) {
        let keys = ["a", "b", "c", "d", ""];
        let records: Vec<ClassMetricRecord> = rows
            .iter()
            .map(|(k, v)| class(keys[*k], *v))
            .collect();

        let mut expected: HashMap<&str, usize> = HashMap::new();
        for r in &records {
            *expected.entry(r.repo_key.as_str()).or_default() += 1;
        }

        let summaries = aggregate(&records);

        prop_assert_eq!(summaries.len(), expected.len());
        for s in &summaries {
            prop_assert_eq!(s.num_classes, expected[s.repo_key.as_str()]);
        }
    }
}

#[test]
fn test_unparseable_metric_yields_missing_statistic() {
    let records = reconcile_classes(&table("repo_name,lcom\nR,x\nR,y\n"));
    let summaries = aggregate(&records);

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].num_classes, 2);
    assert_eq!(summaries[0].lcom.mean, None);
    assert_eq!(summaries[0].lcom.median, None);
}

#[test]
fn test_partial_missing_values_are_excluded_not_zeroed() {
    let summaries = aggregate(&[class("R", Some(4.0)), class("R", None), class("R", Some(6.0))]);

    assert_eq!(summaries[0].num_classes, 3);
    assert_eq!(summaries[0].lcom.mean, Some(5.0));
}

// =============================================================================
// Join
// =============================================================================

#[test]
fn test_join_completeness_and_exclusivity() {
    let summaries = aggregate(&[class("A", Some(1.0)), class("B", Some(2.0)), class("C", None)]);
    let metadata = reconcile_metadata(&table(
        "nameWithOwner,stargazerCount\nA,1\nA,2\nZ,3\n",
    ));

    let joined = join(summaries, &metadata);
    let keys: Vec<&str> = joined.rows.iter().map(|r| r.repo_key()).collect();
    let unique: HashSet<&str> = keys.iter().copied().collect();

    assert_eq!(keys.len(), 3);
    assert_eq!(unique.len(), 3);
    assert!(!unique.contains("Z"));
    assert_eq!(joined.get("A").unwrap().stars(), Some(1.0));
    assert!(joined.get("B").unwrap().metadata.is_none());
}

// =============================================================================
// Degradation
// =============================================================================

#[test]
fn test_temporal_fail_soft() {
    let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
    assert_eq!(age_years(None, now), None);
    assert_eq!(age_years(Some("not-a-date"), now), None);
}

#[test]
fn test_correlation_precondition_sample_size() {
    let x = NumericColumn::new("stars", vec![Some(1.0), Some(2.0)]);
    let y = NumericColumn::new("lcom_median", vec![Some(5.0), Some(3.0)]);
    assert!(test_pair("stars_vs_lcom_median", &x, &y).is_none());
}

#[test]
fn test_correlation_precondition_variance() {
    let columns = vec![
        NumericColumn::new("stars", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
        NumericColumn::new("lcom_median", vec![Some(7.0), Some(7.0), Some(7.0), Some(7.0)]),
        NumericColumn::new("loc_sum", vec![Some(10.0), Some(30.0), Some(20.0), Some(40.0)]),
        NumericColumn::new("dit_median", vec![Some(1.0), Some(3.0), Some(2.0), Some(4.0)]),
    ];

    let results = correlation_tests(&columns);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].pair, "loc_sum_vs_dit_median");
    assert_eq!(results[0].n, 4);
    assert!((results[0].spearman_r - 1.0).abs() < 1e-12);
}

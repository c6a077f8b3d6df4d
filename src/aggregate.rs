// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Class-to-repository aggregation

use crate::stats;
use crate::types::{ClassMetricRecord, Metric, MetricSummary, RepositoryMetricSummary};
use std::collections::BTreeMap;
use tracing::debug;

impl MetricSummary {
    /// Summarize the non-missing observations of one metric
    #[must_use]
    pub fn from_values(values: &[f64]) -> Self {
        Self {
            sum: stats::sum(values),
            mean: stats::mean(values),
            median: stats::median(values),
            std: stats::sample_std(values),
        }
    }
}

/// Reduce class rows to one summary per repository key, ordered by key
#[must_use]
pub fn aggregate(records: &[ClassMetricRecord]) -> Vec<RepositoryMetricSummary> {
    let mut groups: BTreeMap<&str, Vec<&ClassMetricRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.repo_key.as_str()).or_default().push(record);
    }

    debug!("Aggregating {} classes into {} repositories", records.len(), groups.len());

    groups
        .into_iter()
        .map(|(key, members)| {
            let mut summary = RepositoryMetricSummary {
                repo_key: key.to_string(),
                num_classes: members.len(),
                ..Default::default()
            };
            for metric in Metric::ALL {
                let values: Vec<f64> = members.iter().filter_map(|r| r.value(metric)).collect();
                *summary.metric_mut(metric) = MetricSummary::from_values(&values);
            }
            summary
        })
        .collect()
}

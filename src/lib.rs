// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Repoquality library - code-quality metrics meet repository metadata
//!
//! This crate reconciles per-class object-oriented metrics (one row per
//! analyzed class) with repository metadata from a code-hosting search API,
//! aggregates them to one row per repository, and computes descriptive
//! statistics and correlation tests over the joined table.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod aggregate;
pub mod commands;
pub mod config;
pub mod correlation;
pub mod error;
pub mod fetch;
pub mod join;
pub mod key;
pub mod merge;
pub mod pipeline;
pub mod schema;
pub mod stats;
pub mod table;
pub mod temporal;

/// Core data types shared by every pipeline stage
pub mod types {
    use serde::{Deserialize, Serialize};

    // =========================================================================
    // Metric Concepts
    // =========================================================================

    /// Object-oriented metrics produced per class by the static analyzer
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Metric {
        /// Coupling between objects
        Cbo,
        /// Depth of inheritance tree
        Dit,
        /// Lack of cohesion of methods
        Lcom,
        /// Lines of code
        Loc,
        /// Weighted methods per class
        Wmc,
    }

    impl Metric {
        /// Every metric, in canonical column order
        pub const ALL: [Self; 5] = [Self::Cbo, Self::Dit, Self::Lcom, Self::Loc, Self::Wmc];

        /// Canonical lowercase name, also the expected source column name
        #[must_use]
        pub fn name(self) -> &'static str {
            match self {
                Self::Cbo => "cbo",
                Self::Dit => "dit",
                Self::Lcom => "lcom",
                Self::Loc => "loc",
                Self::Wmc => "wmc",
            }
        }

        /// Statistics reported for this metric at repository level
        #[must_use]
        pub fn statistics(self) -> &'static [Statistic] {
            match self {
                Self::Cbo | Self::Dit | Self::Lcom => {
                    &[Statistic::Mean, Statistic::Median, Statistic::Std]
                }
                Self::Loc => &[Statistic::Sum, Statistic::Mean, Statistic::Median],
                Self::Wmc => &[Statistic::Mean, Statistic::Median],
            }
        }

        /// Column name of one repository-level statistic, e.g. `lcom_median`
        #[must_use]
        pub fn column(self, statistic: Statistic) -> String {
            format!("{}_{}", self.name(), statistic.name())
        }
    }

    /// Distributional statistic computed per repository
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Statistic {
        /// Sum of observations
        Sum,
        /// Arithmetic mean
        Mean,
        /// Median (average of the middle pair for even counts)
        Median,
        /// Sample standard deviation (n - 1)
        Std,
    }

    impl Statistic {
        /// Suffix used in column names
        #[must_use]
        pub fn name(self) -> &'static str {
            match self {
                Self::Sum => "sum",
                Self::Mean => "mean",
                Self::Median => "median",
                Self::Std => "std",
            }
        }
    }

    // =========================================================================
    // Class Level
    // =========================================================================

    /// One analyzed class, keyed by its normalized repository key
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct ClassMetricRecord {
        /// Normalized repository key (empty when underivable)
        pub repo_key: String,
        /// Coupling between objects
        pub cbo: Option<f64>,
        /// Depth of inheritance tree
        pub dit: Option<f64>,
        /// Lack of cohesion of methods
        pub lcom: Option<f64>,
        /// Lines of code
        pub loc: Option<f64>,
        /// Weighted methods per class
        pub wmc: Option<f64>,
    }

    impl ClassMetricRecord {
        /// Value of one metric, `None` when missing
        #[must_use]
        pub fn value(&self, metric: Metric) -> Option<f64> {
            match metric {
                Metric::Cbo => self.cbo,
                Metric::Dit => self.dit,
                Metric::Lcom => self.lcom,
                Metric::Loc => self.loc,
                Metric::Wmc => self.wmc,
            }
        }

        /// Set one metric value
        pub fn set(&mut self, metric: Metric, value: Option<f64>) {
            let slot = match metric {
                Metric::Cbo => &mut self.cbo,
                Metric::Dit => &mut self.dit,
                Metric::Lcom => &mut self.lcom,
                Metric::Loc => &mut self.loc,
                Metric::Wmc => &mut self.wmc,
            };
            *slot = value;
        }
    }

    // =========================================================================
    // Repository Level
    // =========================================================================

    /// Distributional summary of one metric within one repository
    ///
    /// Every field is `None` when the repository has no non-missing
    /// observation of the metric.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
    pub struct MetricSummary {
        /// Sum of observations
        pub sum: Option<f64>,
        /// Mean
        pub mean: Option<f64>,
        /// Median
        pub median: Option<f64>,
        /// Sample standard deviation, `None` below two observations
        pub std: Option<f64>,
    }

    impl MetricSummary {
        /// Value of one statistic
        #[must_use]
        pub fn get(&self, statistic: Statistic) -> Option<f64> {
            match statistic {
                Statistic::Sum => self.sum,
                Statistic::Mean => self.mean,
                Statistic::Median => self.median,
                Statistic::Std => self.std,
            }
        }
    }

    /// One row per distinct repository key of the class-level input
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct RepositoryMetricSummary {
        /// Normalized repository key
        pub repo_key: String,
        /// Number of class rows sharing this key
        pub num_classes: usize,
        /// Coupling between objects
        pub cbo: MetricSummary,
        /// Depth of inheritance tree
        pub dit: MetricSummary,
        /// Lack of cohesion of methods
        pub lcom: MetricSummary,
        /// Lines of code
        pub loc: MetricSummary,
        /// Weighted methods per class
        pub wmc: MetricSummary,
    }

    impl RepositoryMetricSummary {
        /// Summary of one metric
        #[must_use]
        pub fn metric(&self, metric: Metric) -> &MetricSummary {
            match metric {
                Metric::Cbo => &self.cbo,
                Metric::Dit => &self.dit,
                Metric::Lcom => &self.lcom,
                Metric::Loc => &self.loc,
                Metric::Wmc => &self.wmc,
            }
        }

        /// Mutable summary of one metric
        pub fn metric_mut(&mut self, metric: Metric) -> &mut MetricSummary {
            match metric {
                Metric::Cbo => &mut self.cbo,
                Metric::Dit => &mut self.dit,
                Metric::Lcom => &mut self.lcom,
                Metric::Loc => &mut self.loc,
                Metric::Wmc => &mut self.wmc,
            }
        }
    }

    // =========================================================================
    // Repository Metadata
    // =========================================================================

    /// Optional metadata concepts resolved from the search API export
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum MetadataField {
        /// Repository web URL
        Url,
        /// Star count
        Stars,
        /// Creation timestamp
        CreatedAt,
        /// Last push timestamp
        PushedAt,
        /// Disk usage (KB)
        DiskUsage,
        /// Fork count
        Forks,
        /// Release count
        Releases,
    }

    impl MetadataField {
        /// Every field, in canonical column order
        pub const ALL: [Self; 7] = [
            Self::Url,
            Self::Stars,
            Self::CreatedAt,
            Self::PushedAt,
            Self::DiskUsage,
            Self::Forks,
            Self::Releases,
        ];

        /// Canonical column name
        #[must_use]
        pub fn name(self) -> &'static str {
            match self {
                Self::Url => "url",
                Self::Stars => "stars",
                Self::CreatedAt => "created_at",
                Self::PushedAt => "pushed_at",
                Self::DiskUsage => "disk_usage",
                Self::Forks => "forks",
                Self::Releases => "releases",
            }
        }

        /// Whether the field is coerced to a number
        #[must_use]
        pub fn is_numeric(self) -> bool {
            matches!(self, Self::Stars | Self::DiskUsage | Self::Forks | Self::Releases)
        }
    }

    /// One repository known to the metadata source
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct RepositoryMetadata {
        /// Normalized repository key
        pub repo_key: String,
        /// Repository web URL
        pub url: Option<String>,
        /// Star count
        pub stars: Option<f64>,
        /// Raw creation timestamp
        pub created_at: Option<String>,
        /// Raw last push timestamp
        pub pushed_at: Option<String>,
        /// Disk usage
        pub disk_usage: Option<f64>,
        /// Fork count
        pub forks: Option<f64>,
        /// Release count
        pub releases: Option<f64>,
        /// Derived: years since creation
        pub age_years: Option<f64>,
        /// Derived: days since last push
        pub days_since_push: Option<f64>,
    }

    impl RepositoryMetadata {
        /// Numeric value of a numeric field
        #[must_use]
        pub fn number(&self, field: MetadataField) -> Option<f64> {
            match field {
                MetadataField::Stars => self.stars,
                MetadataField::DiskUsage => self.disk_usage,
                MetadataField::Forks => self.forks,
                MetadataField::Releases => self.releases,
                MetadataField::Url | MetadataField::CreatedAt | MetadataField::PushedAt => None,
            }
        }

        /// Text value of a textual field
        #[must_use]
        pub fn text(&self, field: MetadataField) -> Option<&str> {
            match field {
                MetadataField::Url => self.url.as_deref(),
                MetadataField::CreatedAt => self.created_at.as_deref(),
                MetadataField::PushedAt => self.pushed_at.as_deref(),
                _ => None,
            }
        }
    }

    // =========================================================================
    // Joined Profile
    // =========================================================================

    /// Metric summary joined with (optional) metadata
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct RepositoryProfile {
        /// Aggregated class metrics (always present)
        pub summary: RepositoryMetricSummary,
        /// Matching metadata row, `None` when the key had no match
        pub metadata: Option<RepositoryMetadata>,
    }

    impl RepositoryProfile {
        /// Repository key
        #[must_use]
        pub fn repo_key(&self) -> &str {
            &self.summary.repo_key
        }

        /// Years since creation
        #[must_use]
        pub fn age_years(&self) -> Option<f64> {
            self.metadata.as_ref().and_then(|m| m.age_years)
        }

        /// Days since last push
        #[must_use]
        pub fn days_since_push(&self) -> Option<f64> {
            self.metadata.as_ref().and_then(|m| m.days_since_push)
        }

        /// Star count
        #[must_use]
        pub fn stars(&self) -> Option<f64> {
            self.metadata.as_ref().and_then(|m| m.stars)
        }
    }

    // =========================================================================
    // Correlation
    // =========================================================================

    /// Result of one correlation test between two named columns
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct CorrelationResult {
        /// Pair label, `<x>_vs_<y>`
        pub pair: String,
        /// Number of rows with both values present
        pub n: usize,
        /// Spearman rank correlation coefficient
        pub spearman_r: f64,
        /// Two-sided p-value of the Spearman coefficient
        pub spearman_p: f64,
        /// Pearson coefficient, `None` when not computable
        pub pearson_r: Option<f64>,
        /// Two-sided p-value of the Pearson coefficient
        pub pearson_p: Option<f64>,
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::types::*;
    pub use anyhow::{Context, Result};
}

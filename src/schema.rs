// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Schema reconciliation
//!
//! Maps loosely named input columns onto the canonical concepts. All
//! tolerance for schema drift lives in the synonym tables below; the
//! lookup is resolved once per table and the rest of the pipeline only
//! sees typed records.

use crate::key::{leading_segment, normalize_repo_key};
use crate::table::RawTable;
use crate::types::{ClassMetricRecord, MetadataField, Metric, RepositoryMetadata};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

// =========================================================================
// Fail-soft Value Parsing
// =========================================================================

/// Parse a numeric cell; blanks, garbage and NaN are missing
#[must_use]
pub fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| !v.is_nan())
}

/// Parse a count (stars, forks, ...); negative values are missing
#[must_use]
pub fn parse_count(raw: Option<&str>) -> Option<f64> {
    parse_number(raw).filter(|v| *v >= 0.0)
}

// =========================================================================
// Synonym Tables
// =========================================================================

/// How a source column name is matched against a concept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamePattern {
    /// Whole name, case-insensitive
    Exact(&'static str),
    /// Substring of the lowercased name
    Contains(&'static str),
}

impl NamePattern {
    fn matches(self, lowered: &str) -> bool {
        match self {
            Self::Exact(name) => lowered == name,
            Self::Contains(part) => lowered.contains(part),
        }
    }
}

/// Accepted spellings for one metadata concept, tried in order
#[derive(Debug, Clone, Copy)]
pub struct Synonyms {
    /// Target concept
    pub field: MetadataField,
    /// Patterns in priority order
    pub patterns: &'static [NamePattern],
    /// Lowercased substrings that disqualify a column
    pub excludes: &'static [&'static str],
}

use NamePattern::{Contains, Exact};

/// Exact spellings of the repository name column, in priority order
pub const REPO_NAME_SYNONYMS: &[&str] = &[
    "namewithowner",
    "name_with_owner",
    "full_name",
    "repo_name",
    "repository",
    "name",
];

/// Spellings of every optional metadata concept
pub const METADATA_SYNONYMS: &[Synonyms] = &[
    Synonyms {
        field: MetadataField::Url,
        patterns: &[Exact("url"), Exact("html_url"), Contains("url")],
        excludes: &[],
    },
    Synonyms {
        field: MetadataField::Stars,
        patterns: &[
            Exact("stargazercount"),
            Exact("stargazers_count"),
            Exact("stars"),
            Contains("star"),
        ],
        excludes: &["url"],
    },
    Synonyms {
        field: MetadataField::CreatedAt,
        patterns: &[Exact("createdat"), Exact("created_at"), Contains("created")],
        excludes: &["url"],
    },
    Synonyms {
        field: MetadataField::PushedAt,
        patterns: &[
            Exact("pushedat"),
            Exact("pushed_at"),
            Contains("pushed"),
            Contains("updated"),
        ],
        excludes: &["url"],
    },
    Synonyms {
        field: MetadataField::DiskUsage,
        patterns: &[
            Exact("diskusage"),
            Exact("disk_usage"),
            Contains("disk"),
            Exact("size"),
        ],
        excludes: &["url"],
    },
    Synonyms {
        field: MetadataField::Forks,
        patterns: &[
            Exact("forkcount"),
            Exact("forks_count"),
            Exact("forks"),
            Contains("fork"),
        ],
        excludes: &["url"],
    },
    Synonyms {
        field: MetadataField::Releases,
        patterns: &[
            Exact("releasecount"),
            Exact("release_count"),
            Exact("releases"),
            Contains("release"),
        ],
        excludes: &["url"],
    },
];

// =========================================================================
// Metadata Reconciliation
// =========================================================================

/// Concept to column lookup for a metadata table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataSchema {
    /// Column holding the repository name
    pub name_column: Option<usize>,
    /// Resolved optional concepts
    pub fields: BTreeMap<MetadataField, usize>,
}

impl MetadataSchema {
    /// Resolve every concept against `headers`; each column serves one concept
    #[must_use]
    pub fn resolve(headers: &[String]) -> Self {
        let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let mut claimed = HashSet::new();

        let name_column = REPO_NAME_SYNONYMS
            .iter()
            .find_map(|syn| lowered.iter().position(|h| h == syn))
            .or_else(|| {
                if headers.is_empty() {
                    None
                } else {
                    warn!(
                        "No repository name column among {:?}; using '{}'",
                        headers, headers[0]
                    );
                    Some(0)
                }
            });
        if let Some(idx) = name_column {
            claimed.insert(idx);
        }

        let mut fields = BTreeMap::new();
        for synonyms in METADATA_SYNONYMS {
            let found = synonyms.patterns.iter().find_map(|pattern| {
                lowered.iter().enumerate().position(|(idx, h)| {
                    !claimed.contains(&idx)
                        && !synonyms.excludes.iter().any(|ex| h.contains(ex))
                        && pattern.matches(h)
                })
            });
            match found {
                Some(idx) => {
                    debug!("{} <- '{}'", synonyms.field.name(), headers[idx]);
                    claimed.insert(idx);
                    fields.insert(synonyms.field, idx);
                }
                None => debug!("{} not present in metadata", synonyms.field.name()),
            }
        }

        Self { name_column, fields }
    }

    /// Whether a concept was resolved
    #[must_use]
    pub fn has(&self, field: MetadataField) -> bool {
        self.fields.contains_key(&field)
    }

    /// Resolved concepts in canonical order
    #[must_use]
    pub fn resolved(&self) -> Vec<MetadataField> {
        MetadataField::ALL
            .into_iter()
            .filter(|f| self.has(*f))
            .collect()
    }
}

/// Reconciled metadata: typed rows plus the set of concepts the source had
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataTable {
    /// Concepts present in the source, canonical order
    pub fields: Vec<MetadataField>,
    /// One row per source row
    pub rows: Vec<RepositoryMetadata>,
}

impl MetadataTable {
    /// Whether the source resolved a concept
    #[must_use]
    pub fn has(&self, field: MetadataField) -> bool {
        self.fields.contains(&field)
    }
}

/// Map a raw metadata table onto [`RepositoryMetadata`] rows
#[must_use]
pub fn reconcile_metadata(table: &RawTable) -> MetadataTable {
    let schema = MetadataSchema::resolve(table.headers());
    let column = |field: MetadataField| schema.fields.get(&field).copied();

    let text = |row: usize, field: MetadataField| -> Option<String> {
        column(field)
            .and_then(|c| table.cell(row, c))
            .map(|s| s.trim().to_string())
    };
    let count = |row: usize, field: MetadataField| -> Option<f64> {
        column(field).and_then(|c| parse_count(table.cell(row, c)))
    };

    let rows = (0..table.len())
        .map(|row| RepositoryMetadata {
            repo_key: normalize_repo_key(schema.name_column.and_then(|c| table.cell(row, c))),
            url: text(row, MetadataField::Url),
            stars: count(row, MetadataField::Stars),
            created_at: text(row, MetadataField::CreatedAt),
            pushed_at: text(row, MetadataField::PushedAt),
            disk_usage: count(row, MetadataField::DiskUsage),
            forks: count(row, MetadataField::Forks),
            releases: count(row, MetadataField::Releases),
            age_years: None,
            days_since_push: None,
        })
        .collect();

    MetadataTable {
        fields: schema.resolved(),
        rows,
    }
}

// =========================================================================
// Class Metric Reconciliation
// =========================================================================

/// Concept to column lookup for a per-class metric table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassSchema {
    /// Resolved metric columns; unresolved metrics are synthesized as missing
    pub metrics: BTreeMap<Metric, usize>,
    /// Explicit repository name column
    pub repo_name: Option<usize>,
    /// File name column, used when no repository name column exists
    pub filename: Option<usize>,
}

impl ClassSchema {
    /// Resolve metric and key columns by case-insensitive exact name
    #[must_use]
    pub fn resolve(table: &RawTable) -> Self {
        let metrics = Metric::ALL
            .into_iter()
            .filter_map(|m| table.find_column(m.name()).map(|idx| (m, idx)))
            .collect::<BTreeMap<_, _>>();

        for metric in Metric::ALL {
            if !metrics.contains_key(&metric) {
                warn!("Metric column '{}' not found; treating as missing", metric.name());
            }
        }

        Self {
            metrics,
            repo_name: table.find_column("repo_name"),
            filename: table.find_column("filename"),
        }
    }

    /// Repository key of one row
    fn key(&self, table: &RawTable, row: usize) -> String {
        if let Some(col) = self.repo_name {
            normalize_repo_key(table.cell(row, col))
        } else if let Some(col) = self.filename {
            table
                .cell(row, col)
                .map(|f| normalize_repo_key(Some(leading_segment(f))))
                .unwrap_or_default()
        } else {
            String::new()
        }
    }
}

/// Map a raw per-class table onto [`ClassMetricRecord`] rows
///
/// Every input row produces exactly one record; unparseable metric cells
/// become missing values.
#[must_use]
pub fn reconcile_classes(table: &RawTable) -> Vec<ClassMetricRecord> {
    let schema = ClassSchema::resolve(table);

    (0..table.len())
        .map(|row| {
            let mut record = ClassMetricRecord {
                repo_key: schema.key(table, row),
                ..Default::default()
            };
            for (metric, col) in &schema.metrics {
                record.set(*metric, parse_number(table.cell(row, *col)));
            }
            record
        })
        .collect()
}

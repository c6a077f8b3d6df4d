// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Repository-level join of metric summaries with metadata

use crate::schema::MetadataTable;
use crate::stats::NumericColumn;
use crate::table::{format_number, RawTable};
use crate::types::{
    MetadataField, Metric, RepositoryMetadata, RepositoryMetricSummary, RepositoryProfile,
    Statistic,
};
use std::collections::HashMap;
use tracing::{debug, warn};

/// One column of the repository-level table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileColumn {
    /// Repository key
    Key,
    /// Aggregated metric statistic
    Statistic(Metric, Statistic),
    /// Number of analyzed classes
    NumClasses,
    /// Metadata concept
    Metadata(MetadataField),
    /// Years since creation
    AgeYears,
    /// Days since last push
    DaysSincePush,
}

impl ProfileColumn {
    /// Column name in persisted output
    #[must_use]
    pub fn name(self) -> String {
        match self {
            Self::Key => "repo_key".into(),
            Self::Statistic(metric, statistic) => metric.column(statistic),
            Self::NumClasses => "num_classes".into(),
            Self::Metadata(field) => field.name().into(),
            Self::AgeYears => "age_years".into(),
            Self::DaysSincePush => "days_since_push".into(),
        }
    }

    /// Whether the column holds numbers
    #[must_use]
    pub fn is_numeric(self) -> bool {
        match self {
            Self::Key => false,
            Self::Metadata(field) => field.is_numeric(),
            _ => true,
        }
    }
}

/// A single cell of the repository-level table
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    /// Text value
    Text(&'a str),
    /// Numeric value
    Number(f64),
    /// Missing value
    Missing,
}

impl Cell<'_> {
    /// Numeric content, if any
    #[must_use]
    pub fn number(self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(v),
            _ => None,
        }
    }

    /// CSV rendering; missing is an empty cell
    #[must_use]
    pub fn render(self) -> String {
        match self {
            Self::Text(s) => s.to_string(),
            Self::Number(v) => format_number(v),
            Self::Missing => String::new(),
        }
    }
}

fn number(value: Option<f64>) -> Cell<'static> {
    value.map_or(Cell::Missing, Cell::Number)
}

impl RepositoryProfile {
    /// Value of one column
    #[must_use]
    pub fn cell(&self, column: ProfileColumn) -> Cell<'_> {
        let meta = self.metadata.as_ref();
        match column {
            ProfileColumn::Key => Cell::Text(self.repo_key()),
            ProfileColumn::Statistic(metric, statistic) => {
                number(self.summary.metric(metric).get(statistic))
            }
            ProfileColumn::NumClasses => Cell::Number(self.summary.num_classes as f64),
            ProfileColumn::Metadata(field) if field.is_numeric() => {
                number(meta.and_then(|m| m.number(field)))
            }
            ProfileColumn::Metadata(field) => meta
                .and_then(|m| m.text(field))
                .map_or(Cell::Missing, Cell::Text),
            ProfileColumn::AgeYears => number(self.age_years()),
            ProfileColumn::DaysSincePush => number(self.days_since_push()),
        }
    }
}

/// The joined repository-level table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileTable {
    /// Metadata concepts carried as columns, canonical order
    pub metadata_fields: Vec<MetadataField>,
    /// One profile per summarized repository
    pub rows: Vec<RepositoryProfile>,
}

impl ProfileTable {
    /// Columns in output order
    #[must_use]
    pub fn columns(&self) -> Vec<ProfileColumn> {
        let mut columns = vec![ProfileColumn::Key];
        for metric in Metric::ALL {
            for statistic in metric.statistics() {
                columns.push(ProfileColumn::Statistic(metric, *statistic));
            }
        }
        columns.push(ProfileColumn::NumClasses);
        columns.extend(self.metadata_fields.iter().map(|f| ProfileColumn::Metadata(*f)));
        columns.push(ProfileColumn::AgeYears);
        columns.push(ProfileColumn::DaysSincePush);
        columns
    }

    /// Every numeric column with its values
    #[must_use]
    pub fn numeric_columns(&self) -> Vec<NumericColumn> {
        self.columns()
            .into_iter()
            .filter(|c| c.is_numeric())
            .map(|c| {
                let values = self.rows.iter().map(|r| r.cell(c).number()).collect();
                NumericColumn::new(c.name(), values)
            })
            .collect()
    }

    /// Profile of one repository
    #[must_use]
    pub fn get(&self, repo_key: &str) -> Option<&RepositoryProfile> {
        self.rows.iter().find(|r| r.repo_key() == repo_key)
    }

    /// Number of profiles with matched metadata
    #[must_use]
    pub fn matched(&self) -> usize {
        self.rows.iter().filter(|r| r.metadata.is_some()).count()
    }

    /// Render as a raw table for persistence
    #[must_use]
    pub fn to_raw(&self) -> RawTable {
        let columns = self.columns();
        let mut table = RawTable::new(columns.iter().map(|c| c.name()).collect());
        for row in &self.rows {
            table.push_row(columns.iter().map(|c| row.cell(*c).render()).collect());
        }
        table
    }
}

/// Left join summaries against metadata on repository key
///
/// Every summary yields exactly one profile. Metadata rows without a
/// summary are dropped, blank keys never match, and when a key repeats
/// in the metadata the first row wins. `stars` is always carried as a
/// column, all-missing when the source had none.
#[must_use]
pub fn join(summaries: Vec<RepositoryMetricSummary>, metadata: &MetadataTable) -> ProfileTable {
    let mut by_key: HashMap<&str, &RepositoryMetadata> = HashMap::new();
    for row in &metadata.rows {
        if row.repo_key.is_empty() {
            continue;
        }
        if by_key.contains_key(row.repo_key.as_str()) {
            warn!("Duplicate metadata for '{}'; keeping the first row", row.repo_key);
            continue;
        }
        by_key.insert(row.repo_key.as_str(), row);
    }

    let rows: Vec<RepositoryProfile> = summaries
        .into_iter()
        .map(|summary| {
            let metadata = by_key.get(summary.repo_key.as_str()).map(|m| (*m).clone());
            RepositoryProfile { summary, metadata }
        })
        .collect();

    let mut metadata_fields = metadata.fields.clone();
    if !metadata_fields.contains(&MetadataField::Stars) {
        metadata_fields.push(MetadataField::Stars);
        metadata_fields.sort();
    }

    let table = ProfileTable {
        metadata_fields,
        rows,
    };
    debug!("Joined {} repositories, {} with metadata", table.rows.len(), table.matched());
    table
}

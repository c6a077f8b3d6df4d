// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Loosely-typed in-memory CSV tables
//!
//! Inputs arrive with arbitrary, inconsistently cased headers and ragged
//! rows. A [`RawTable`] keeps every cell as text; typing happens later in
//! the schema reconciler.

use crate::error::PipelineError;
use anyhow::{Context, Result};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

/// Header row plus string cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Create an empty table with the given headers
    #[must_use]
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Parse CSV from any reader; rows may be shorter or longer than the header
    pub fn from_reader<R: Read>(reader: R) -> csv::Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Read a CSV file; a missing file is a fatal [`PipelineError::MissingInput`]
    pub fn read_path(path: &Path) -> Result<Self, PipelineError> {
        if !path.is_file() {
            return Err(PipelineError::MissingInput(path.to_path_buf()));
        }
        let file = fs::File::open(path).map_err(|e| PipelineError::Csv {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        Self::from_reader(file).map_err(|source| PipelineError::Csv {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Column names
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Row count
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column whose name equals `name`, ignoring ASCII case
    #[must_use]
    pub fn find_column(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    }

    /// Cell text, `None` when absent from a short row or blank
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// Append a row
    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// All rows
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Write as CSV, padding short rows to the header width
    pub fn to_writer<W: Write>(&self, writer: W) -> csv::Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(writer);

        writer.write_record(&self.headers)?;
        let width = self.headers.len();
        for row in &self.rows {
            if row.len() >= width {
                writer.write_record(row)?;
            } else {
                let mut padded = row.clone();
                padded.resize(width, String::new());
                writer.write_record(&padded)?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    /// Write as CSV to `path`, creating parent directories
    pub fn write_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {}", parent.display()))?;
            }
        }
        let file = fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        self.to_writer(file).map_err(|source| PipelineError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}

/// Render a number for CSV output; integral values have no decimal point
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Render an optional number; missing becomes an empty cell
#[must_use]
pub fn format_optional(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_default()
}

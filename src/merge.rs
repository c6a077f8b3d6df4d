// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Per-class file discovery and concatenation
//!
//! The static analyzer writes one `<repo>class.csv` per repository. These
//! are stacked into a single table carrying a `repo_name` column.

use crate::error::PipelineError;
use crate::table::RawTable;
use anyhow::{Context, Result};
use globset::Glob;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Default file name pattern of analyzer class output
pub const DEFAULT_CLASS_PATTERN: &str = "*class.csv";

/// Suffix stripped from file names to recover the repository name
const CLASS_SUFFIX: &str = "class.csv";

/// Column carrying the repository each class row came from
pub const REPO_NAME_COLUMN: &str = "repo_name";

/// Result of stacking per-class files
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Concatenated rows
    pub table: RawTable,
    /// Files that contributed rows
    pub merged: Vec<PathBuf>,
    /// Files that could not be read
    pub skipped: Vec<PathBuf>,
}

/// Files directly inside `dir` whose name matches `pattern`, sorted
pub fn discover_class_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(PipelineError::MissingInput(dir.to_path_buf()).into());
    }
    let matcher = Glob::new(pattern)
        .with_context(|| format!("Invalid file pattern '{pattern}'"))?
        .compile_matcher();

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        if entry.file_type().is_file() && matcher.is_match(entry.file_name()) {
            files.push(entry.into_path());
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(PipelineError::NoClassFiles {
            dir: dir.to_path_buf(),
            pattern: pattern.to_string(),
        }
        .into());
    }
    debug!("Found {} class files in {}", files.len(), dir.display());
    Ok(files)
}

/// Repository name encoded in an analyzer output file name
#[must_use]
pub fn repo_name_from_file(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if let Some(stripped) = name.strip_suffix(CLASS_SUFFIX) {
        return stripped.to_string();
    }
    match name.strip_suffix(".csv") {
        Some(stem) => stem.to_string(),
        None => name,
    }
}

/// Union of columns, in first-seen order
#[derive(Default)]
struct ColumnUnion {
    headers: Vec<String>,
    index: HashMap<String, usize>,
}

impl ColumnUnion {
    fn slot(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.headers.len();
        self.headers.push(name.to_string());
        self.index.insert(name.to_string(), idx);
        idx
    }
}

/// Stack per-class files into one table with a `repo_name` column
///
/// Unreadable files are logged and skipped. Fails when `files` is empty
/// or none of them can be read.
pub fn merge_class_files(files: &[PathBuf]) -> Result<MergeOutcome> {
    let dir = files
        .first()
        .and_then(|f| f.parent())
        .map(Path::to_path_buf)
        .unwrap_or_default();
    if files.is_empty() {
        return Err(PipelineError::NoClassFiles {
            dir,
            pattern: DEFAULT_CLASS_PATTERN.to_string(),
        }
        .into());
    }

    let mut union = ColumnUnion::default();
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut outcome = MergeOutcome::default();

    for file in files {
        let part = match RawTable::read_path(file) {
            Ok(t) => t,
            Err(e) => {
                warn!("Skipping {}: {}", file.display(), e);
                outcome.skipped.push(file.clone());
                continue;
            }
        };

        let slots: Vec<usize> = part.headers().iter().map(|h| union.slot(h)).collect();
        let repo_slot = union.slot(REPO_NAME_COLUMN);
        let repo_name = repo_name_from_file(file);

        for source in part.rows() {
            let mut row = Vec::new();
            for (value, &slot) in source.iter().zip(&slots) {
                if row.len() <= slot {
                    row.resize(slot + 1, String::new());
                }
                row[slot].clone_from(value);
            }
            if row.len() <= repo_slot {
                row.resize(repo_slot + 1, String::new());
            }
            row[repo_slot].clone_from(&repo_name);
            rows.push(row);
        }

        debug!("{}: {} classes as '{}'", file.display(), part.len(), repo_name);
        outcome.merged.push(file.clone());
    }

    if outcome.merged.is_empty() {
        return Err(PipelineError::NoReadableClassFiles {
            dir,
            count: files.len(),
        }
        .into());
    }

    let mut table = RawTable::new(union.headers);
    for row in rows {
        table.push_row(row);
    }
    info!(
        "Merged {} classes from {} files ({} skipped)",
        table.len(),
        outcome.merged.len(),
        outcome.skipped.len()
    );
    outcome.table = table;
    Ok(outcome)
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Repository key normalization
//!
//! Metric rows and metadata rows name the same repository differently
//! (`owner/repo`, `"owner/repo"`, ` owner_repo `). Both sides go through
//! [`normalize_repo_key`] so equal repositories produce equal join keys.

/// Canonicalize a raw repository identifier
///
/// Trims whitespace, turns `/` into `_` and strips quote characters.
/// Case is preserved. A missing identifier yields the empty key.
#[must_use]
pub fn normalize_repo_key(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };

    let key: String = raw
        .trim()
        .replace('/', "_")
        .chars()
        .filter(|c| !matches!(c, '\'' | '"'))
        .collect();

    // Quotes may have shielded whitespace from the first trim
    key.trim().to_string()
}

/// Leading path segment of a file name, e.g. `owner_repo` in `owner_repo/src/A.java`
#[must_use]
pub fn leading_segment(path: &str) -> &str {
    path.split('/').next().unwrap_or_default()
}

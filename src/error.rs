// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Fatal pipeline errors
//!
//! Per-value problems (bad numbers, bad timestamps, absent optional
//! columns) never surface here; they degrade to missing values.

use std::path::PathBuf;
use thiserror::Error;

/// Structural failures after which no meaningful output can be produced
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required input file does not exist
    #[error("required input not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// The per-class output directory holds no matching files
    #[error("no files matching '{pattern}' in {}", .dir.display())]
    NoClassFiles {
        /// Directory searched
        dir: PathBuf,
        /// Glob pattern used
        pattern: String,
    },

    /// Every discovered per-class file failed to parse
    #[error("none of the {count} per-class files in {} could be read", .dir.display())]
    NoReadableClassFiles {
        /// Directory searched
        dir: PathBuf,
        /// Number of files discovered
        count: usize,
    },

    /// CSV read or write failure
    #[error("CSV error in {}: {source}", .path.display())]
    Csv {
        /// File being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: csv::Error,
    },

    /// The search API token is not configured
    #[error("environment variable {0} must be set to query the search API")]
    MissingToken(&'static str),

    /// The search API answered with a non-success status
    #[error("search API request failed with status {status}: {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// The search API answered with an unexpected payload
    #[error("malformed search API response: {0}")]
    MalformedResponse(String),
}

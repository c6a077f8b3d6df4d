// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management
//!
//! Layers, lowest precedence first: built-in defaults, a TOML file, then
//! `REPOQUALITY_*` environment variables (`__` separates sections, e.g.
//! `REPOQUALITY_PATHS__RESULTS_DIR`). Command-line flags override all.

use crate::fetch::DEFAULT_ENDPOINT;
use crate::merge::DEFAULT_CLASS_PATTERN;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "REPOQUALITY";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Input and output locations
    pub paths: PathsConfig,
    /// Search API settings
    pub fetch: FetchConfig,
}

/// Input and output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding analyzer per-class files
    pub ck_output_dir: PathBuf,
    /// File name glob of per-class files
    pub class_pattern: String,
    /// Merged per-class table
    pub classes_csv: PathBuf,
    /// Repository metadata table
    pub metadata_csv: PathBuf,
    /// Directory receiving analysis tables
    pub results_dir: PathBuf,
}

/// Search API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// GraphQL endpoint
    pub endpoint: String,
    /// Search query
    pub query: String,
    /// Results per request
    pub per_page: u32,
    /// Repositories to collect
    pub target: usize,
    /// Pause between requests, milliseconds
    pub delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            paths: PathsConfig {
                ck_output_dir: PathBuf::from("ck_outputs"),
                class_pattern: DEFAULT_CLASS_PATTERN.to_string(),
                classes_csv: PathBuf::from("data/all_repos_metrics.csv"),
                metadata_csv: PathBuf::from("data/top1000_java_repos.csv"),
                results_dir: PathBuf::from("results"),
            },
            fetch: FetchConfig {
                endpoint: DEFAULT_ENDPOINT.to_string(),
                query: "language:Java sort:stars-desc".to_string(),
                per_page: 100,
                target: 1000,
                delay_ms: 1000,
            },
        }
    }
}

/// Per-user configuration file, if a home directory can be determined
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "hyperpolymath", "repoquality")
        .map(|d| d.config_dir().join("config.toml"))
}

/// Load configuration
///
/// An explicit `path` must exist; the per-user file is optional.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let defaults = config::Config::try_from(&Config::default())
        .context("Failed to encode default configuration")?;

    let mut builder = config::Config::builder().add_source(defaults);

    match path {
        Some(p) => {
            builder = builder.add_source(config::File::from(p.to_path_buf()).required(true));
        }
        None => {
            if let Some(p) = default_config_path() {
                builder = builder.add_source(config::File::from(p).required(false));
            }
        }
    }

    builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to load configuration")?
        .try_deserialize()
        .context("Invalid configuration")
}

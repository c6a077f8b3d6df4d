// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Fetch command - downloads repository metadata from the search API

use super::Output;
use crate::config::FetchConfig;
use crate::fetch::{collect_repositories, write_repositories, GithubSearch};
use anyhow::Result;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Run the fetch command
pub fn run(settings: &FetchConfig, output: &Path, out: Output) -> Result<()> {
    info!(
        "Searching '{}' for {} repositories ({} per page)",
        settings.query, settings.target, settings.per_page
    );

    let mut client = GithubSearch::from_env(settings.endpoint.clone())?;
    let repositories = collect_repositories(
        &mut client,
        &settings.query,
        settings.per_page,
        settings.target,
        Duration::from_millis(settings.delay_ms),
    )?;
    write_repositories(output, &repositories)?;

    if out.json {
        let summary = serde_json::json!({
            "output": output,
            "repositories": repositories.len(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Saved {} repositories to {}", repositories.len(), output.display());
    }
    Ok(())
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Config command - shows the effective configuration

use super::Output;
use crate::config::{default_config_path, Config};
use anyhow::{Context, Result};

/// Print the effective configuration, or only the default file location
pub fn run(config: &Config, path_only: bool, out: Output) -> Result<()> {
    if path_only {
        match default_config_path() {
            Some(p) => println!("{}", p.display()),
            None => anyhow::bail!("No configuration directory available on this platform"),
        }
        return Ok(());
    }

    let text = if out.json {
        serde_json::to_string_pretty(config).context("Failed to serialize configuration")?
    } else {
        toml::to_string_pretty(config).context("Failed to serialize configuration")?
    };
    println!("{}", text.trim_end());
    Ok(())
}

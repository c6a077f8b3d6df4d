// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Repoquality CLI - code-quality metrics meet repository metadata

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use repoquality::commands::{self, Output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "repoquality")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress non-error logging)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "REPOQUALITY_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", global = true, value_parser = clap::builder::BoolishValueParser::new())]
    no_color: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stack per-class analyzer files into one table
    Merge {
        /// Directory with analyzer output
        #[arg(long)]
        ck_dir: Option<PathBuf>,

        /// File name pattern of per-class files
        #[arg(long)]
        pattern: Option<String>,

        /// Merged table path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Download repository metadata from the GitHub search API
    Fetch {
        /// Search query
        #[arg(long)]
        query: Option<String>,

        /// Results per request
        #[arg(long)]
        per_page: Option<u32>,

        /// Repositories to collect
        #[arg(long)]
        target: Option<usize>,

        /// Pause between requests in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Metadata table path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build the repository-level table, statistics and correlations
    Analyze {
        /// Merged per-class table
        #[arg(long)]
        classes: Option<PathBuf>,

        /// Repository metadata table
        #[arg(long)]
        metadata: Option<PathBuf>,

        /// Directory for result tables
        #[arg(long)]
        results: Option<PathBuf>,
    },

    /// Merge then analyze with configured paths
    Run,

    /// Show the effective configuration
    Config {
        /// Print only the default configuration file path
        #[arg(long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = repoquality::config::load(cli.config.as_deref())?;

    // Initialize logging; RUST_LOG wins over flags and config
    let level = match cli.verbose {
        0 if cli.quiet => "error".to_string(),
        0 => config.log_level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let out = Output {
        json: cli.json,
        color: !cli.no_color,
    };

    // Execute command
    match cli.command {
        Commands::Merge { ck_dir, pattern, output } => {
            let paths = &config.paths;
            commands::merge::run(
                ck_dir.as_deref().unwrap_or(&paths.ck_output_dir),
                pattern.as_deref().unwrap_or(&paths.class_pattern),
                output.as_deref().unwrap_or(&paths.classes_csv),
                out,
            )
        }
        Commands::Fetch { query, per_page, target, delay_ms, output } => {
            let settings = &mut config.fetch;
            if let Some(q) = query {
                settings.query = q;
            }
            if let Some(n) = per_page {
                settings.per_page = n;
            }
            if let Some(n) = target {
                settings.target = n;
            }
            if let Some(ms) = delay_ms {
                settings.delay_ms = ms;
            }
            let output = output.unwrap_or_else(|| config.paths.metadata_csv.clone());
            commands::fetch::run(&config.fetch, &output, out)
        }
        Commands::Analyze { classes, metadata, results } => {
            let paths = &config.paths;
            commands::analyze::run(
                classes.as_deref().unwrap_or(&paths.classes_csv),
                metadata.as_deref().unwrap_or(&paths.metadata_csv),
                results.as_deref().unwrap_or(&paths.results_dir),
                out,
            )
        }
        Commands::Run => commands::run::run(&config.paths, out),
        Commands::Config { path } => commands::config::run(&config, path, out),
        Commands::Completions { shell } => commands::completions::run(shell, &mut Cli::command()),
    }
}

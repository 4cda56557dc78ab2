//! Relay - manifest delivery to Gerrit
//!
//! Usage:
//!   relay -c relay.toml -w /src/aosp            # Deliver checkouts under a work dir
//!   relay -c relay.toml -w /src/aosp --dry-run  # Show what would be pushed
//!   relay -c relay.toml -p platform/build=/src/build -f json

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use relay_core::config::load_config;
use relay_core::delivery::{DeliveryOrchestrator, DeliveryResult};

#[derive(Parser)]
#[command(name = "relay")]
#[command(about = "Deliver repo manifest projects to Gerrit", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Directory holding the project checkouts (also used for `repo init`)
    #[arg(short, long)]
    work_dir: Option<PathBuf>,

    /// Prepare branches and remotes but do not push
    #[arg(short, long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Local checkout of one project, as NAME=PATH (repeatable)
    #[arg(short, long = "project", value_name = "NAME=PATH", value_parser = parse_project_override)]
    projects: Vec<(String, PathBuf)>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable summary
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "relay=debug,relay_core=debug"
    } else {
        "relay=info,relay_core=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("Delivery failed: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

/// Run one delivery and print its summary. Returns whether every push succeeded.
fn run(cli: Cli) -> Result<bool> {
    let config = load_config(&cli.config)?;
    info!("Loaded configuration from {}", cli.config.display());

    let project_paths: HashMap<String, PathBuf> = cli.projects.into_iter().collect();
    let project_paths = (!project_paths.is_empty()).then_some(&project_paths);

    let mut orchestrator =
        DeliveryOrchestrator::new(config.manifest, config.delivery, cli.work_dir);
    let result = orchestrator
        .execute(project_paths, cli.dry_run)
        .context("Delivery aborted")?;

    match cli.format {
        OutputFormat::Table => print_table(&result, cli.dry_run),
        OutputFormat::Json => print_json(&result)?,
    }

    Ok(result.is_success())
}

fn parse_project_override(s: &str) -> Result<(String, PathBuf)> {
    let (name, path) = s
        .split_once('=')
        .with_context(|| format!("Expected NAME=PATH, got '{}'", s))?;
    let name = name.trim();
    let path = path.trim();
    if name.is_empty() || path.is_empty() {
        anyhow::bail!("Expected NAME=PATH, got '{}'", s);
    }
    Ok((name.to_string(), PathBuf::from(path)))
}

fn print_table(result: &DeliveryResult, dry_run: bool) {
    if dry_run {
        println!("Dry run: nothing was pushed.");
    }
    println!("{:<12} {}", "Projects", result.total_projects);
    println!("{:<12} {}", "Eligible", result.filtered_projects);
    println!("{:<12} {}", "Successful", result.successful);
    println!("{:<12} {}", "Failed", result.failed);
    println!("{:<12} {}", "Skipped", result.skipped);

    if !result.failed_projects.is_empty() {
        println!();
        println!("Failed projects:");
        for name in &result.failed_projects {
            println!("  ✗ {}", name);
        }
    }
    if !result.skipped_projects.is_empty() {
        println!();
        println!("Skipped projects:");
        for name in &result.skipped_projects {
            println!("  - {}", name);
        }
    }
}

fn print_json(result: &DeliveryResult) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, parse_project_override};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn parse_project_override_splits_on_first_equals() {
        let (name, path) = parse_project_override("platform/build=/src/a=b").unwrap();
        assert_eq!(name, "platform/build");
        assert_eq!(path, PathBuf::from("/src/a=b"));
    }

    #[test]
    fn parse_project_override_rejects_missing_parts() {
        assert!(parse_project_override("platform/build").is_err());
        assert!(parse_project_override("=/src/build").is_err());
        assert!(parse_project_override("platform/build=").is_err());
    }

    #[test]
    fn config_is_required() {
        assert!(Cli::try_parse_from(["relay", "--dry-run"]).is_err());
    }

    #[test]
    fn repeated_project_flags_are_collected() {
        let cli = Cli::try_parse_from([
            "relay",
            "-c",
            "relay.toml",
            "-p",
            "platform/build=/src/build",
            "--project",
            "platform/apps/S=/src/apps",
            "-d",
            "-f",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.projects.len(), 2);
        assert_eq!(cli.projects[1].0, "platform/apps/S");
        assert!(cli.dry_run);
        assert!(matches!(cli.format, super::OutputFormat::Json));
    }
}

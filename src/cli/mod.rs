//! CLI argument definitions for config-migrator.
//!
//! Uses clap derive macros to define the command structure and arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// config-migrator: carry customizations across template versions.
///
/// Given a customized (golden) configuration, the template version it was
/// made from and a new template version, produce a configuration for the
/// new version that keeps every customization it can and logs the rest.
#[derive(Parser, Debug)]
#[command(name = "config-migrator")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Migrate a golden configuration to a new template version.
    Migrate(MigrateArgs),

    /// Show what changed between two template versions.
    Diff(DiffArgs),

    /// Search the new template for the new home of orphaned customizations.
    Discover(DiscoverArgs),

    /// Find values duplicated at old and new paths in a merged configuration.
    Detect(DetectArgs),
}

/// Arguments for the `migrate` command.
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Customized configuration built from the old template.
    #[arg(long)]
    pub golden: PathBuf,

    /// Template version the golden configuration was made from.
    #[arg(long)]
    pub template: PathBuf,

    /// Template version to migrate to.
    #[arg(long)]
    pub new_template: PathBuf,

    /// Where to write the migrated configuration.
    #[arg(long)]
    pub output: PathBuf,

    /// Where to write the conflict log.
    #[arg(long)]
    pub log: PathBuf,

    /// JSON file mapping old paths to new paths.
    #[arg(long)]
    pub map: Option<PathBuf>,

    /// Conflict log format.
    #[arg(long, default_value = "json", value_parser = ["json", "csv"])]
    pub format: String,

    /// Only write log entries with this action (e.g. deleted, structural-mismatch).
    #[arg(long)]
    pub log_action: Option<String>,

    /// Only write log entries that need manual review.
    #[arg(long)]
    pub log_review_only: bool,

    /// Only write log entries whose path contains this text.
    #[arg(long)]
    pub log_path_contains: Option<String>,

    /// Run the migration and write the log, but not the configuration.
    #[arg(long)]
    pub dry_run: bool,

    /// Skip candidate discovery for orphaned customizations.
    #[arg(long)]
    pub no_discovery: bool,

    /// Write the discovery report to this file.
    #[arg(long)]
    pub discovery_report: Option<PathBuf>,

    /// Format of the discovery report.
    #[arg(long, default_value = "json", value_parser = ["json", "text"])]
    pub report_format: String,

    /// Also apply discovered renames that are only suggested for review.
    #[arg(long)]
    pub include_review_renames: bool,

    /// Skip transformation detection after the merge.
    #[arg(long)]
    pub no_transform: bool,

    /// Write the transformation report (JSON) to this file.
    #[arg(long)]
    pub transform_report: Option<PathBuf>,

    /// YAML settings file overriding thresholds and weights.
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, short)]
    pub verbose: bool,
}

/// Arguments for the `diff` command.
#[derive(Parser, Debug)]
pub struct DiffArgs {
    /// Old template version.
    #[arg(long)]
    pub template: PathBuf,

    /// New template version.
    #[arg(long)]
    pub new_template: PathBuf,

    /// Print the changes as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `discover` command.
#[derive(Parser, Debug)]
pub struct DiscoverArgs {
    #[arg(long)]
    pub golden: PathBuf,

    #[arg(long)]
    pub template: PathBuf,

    #[arg(long)]
    pub new_template: PathBuf,

    /// JSON rename map applied before discovery.
    #[arg(long)]
    pub map: Option<PathBuf>,

    /// Report format.
    #[arg(long, default_value = "text", value_parser = ["json", "text"])]
    pub format: String,

    /// Write the report to this file instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub settings: Option<PathBuf>,
}

/// Arguments for the `detect` command.
#[derive(Parser, Debug)]
pub struct DetectArgs {
    /// Merged configuration to inspect.
    #[arg(long)]
    pub merged: PathBuf,

    /// Template the merged configuration targets.
    #[arg(long)]
    pub reference: PathBuf,

    /// Apply Move records and write the result to --output.
    #[arg(long, requires = "output")]
    pub apply: bool,

    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,

    #[arg(long)]
    pub settings: Option<PathBuf>,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Whether debug logging was requested.
    pub fn verbose(&self) -> bool {
        matches!(&self.command, Command::Migrate(args) if args.verbose)
    }
}

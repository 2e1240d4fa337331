//! Implementation of the `config-migrator migrate` command.
//!
//! Loads the three input trees, runs the full pipeline and writes the
//! migrated configuration, the conflict log and the optional reports.
//! Every output is rendered before the first one is written, so a failure
//! never leaves a partial result behind. The `--log-*` filters narrow the
//! written log only; the printed summary always covers every entry.

use crate::cli::MigrateArgs;
use chrono::Utc;
use config_migrator::config::{RenameScope, Settings};
use config_migrator::discovery::DiscoveryReport;
use config_migrator::error::{MigrateError, Result};
use config_migrator::io::{self, TreeFormat};
use config_migrator::merge::{ConflictAction, ConflictLogEntry, LogFilter, RenameMap};
use config_migrator::pipeline::{Pipeline, StageOptions};
use config_migrator::report::{LogFormat, ReportFormat, RunSummary};
use config_migrator::transform::TransformationReport;
use std::path::PathBuf;
use tracing::{info, warn};

/// Execute the `migrate` command.
pub fn cmd_migrate(args: MigrateArgs) -> Result<()> {
    let log_format = LogFormat::from_str(&args.format)
        .ok_or_else(|| MigrateError::Input(format!("unsupported log format '{}'", args.format)))?;
    let report_format = ReportFormat::from_str(&args.report_format).ok_or_else(|| {
        MigrateError::Input(format!("unsupported report format '{}'", args.report_format))
    })?;
    let log_filter = log_filter(&args)?;

    let settings = Settings::load_or_default(args.settings.as_ref())?;
    let golden = io::load_tree(&args.golden, "golden config")?;
    let template_old = io::load_tree(&args.template, "template")?;
    let template_new = io::load_tree(&args.new_template, "new template")?;
    let user_map = args.map.as_ref().map(RenameMap::load).transpose()?;

    let stages = StageOptions {
        discovery: !args.no_discovery,
        transform: !args.no_transform,
        apply_transforms: true,
    };
    let mut pipeline = Pipeline::new(settings, stages);
    if args.include_review_renames {
        pipeline = pipeline.with_rename_scope(RenameScope::IncludeReview);
    }

    let run = pipeline.run(&golden, &template_old, &template_new, user_map.as_ref());

    for warning in io::output_warnings(&run.tree) {
        warn!(output = %args.output.display(), "{}", warning);
    }

    let mut outputs: Vec<(PathBuf, String)> = Vec::new();
    if args.dry_run {
        info!(output = %args.output.display(), "dry run, migrated configuration not written");
    } else {
        let rendered = io::render_tree(&run.tree, TreeFormat::from_path(&args.output))?;
        outputs.push((args.output.clone(), rendered));
    }
    let exported: Vec<ConflictLogEntry> = log_filter.apply(&run.log).into_iter().cloned().collect();
    if exported.len() < run.log.len() {
        info!(kept = exported.len(), total = run.log.len(), "conflict log filtered");
    }
    outputs.push((args.log.clone(), log_format.render(&exported, Utc::now())?));

    if let Some(path) = &args.discovery_report {
        let report = DiscoveryReport::build(&run.discovered, &pipeline.settings().discovery);
        let rendered = match report_format {
            ReportFormat::Json => report.to_json()?,
            ReportFormat::Text => report.to_string(),
        };
        outputs.push((path.clone(), rendered));
    }

    if let Some(path) = &args.transform_report {
        let mut report = TransformationReport::new(run.transformations.clone());
        if let Some(applied) = &run.applied {
            report = report.with_applied(applied);
        }
        outputs.push((path.clone(), report.to_json()?));
    }

    for (path, content) in &outputs {
        io::atomic_write_file(path, content)?;
        info!(path = %path.display(), "wrote output");
    }

    let summary = RunSummary::from_log(&run.log, pipeline.settings().summary.critical_paths_shown)
        .with_discovered_renames(run.discovered_renames.len())
        .with_transformations(run.transformations.len());
    print!("{}", summary);
    if args.dry_run {
        println!();
        println!("Dry run: {} was not written.", args.output.display());
    }

    Ok(())
}

/// Build the log export filter from the `--log-*` options.
fn log_filter(args: &MigrateArgs) -> Result<LogFilter> {
    let action = match &args.log_action {
        Some(name) => Some(ConflictAction::from_str(name).ok_or_else(|| {
            MigrateError::Input(format!("unknown conflict action '{}'", name))
        })?),
        None => None,
    };
    Ok(LogFilter {
        action,
        review_only: args.log_review_only,
        path_contains: args.log_path_contains.clone(),
    })
}

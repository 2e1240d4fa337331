//! Implementation of the `config-migrator detect` command.
//!
//! Runs the transformation detector on an existing merged configuration,
//! for instance one adjusted by hand after a migration, and optionally
//! writes the configuration with Move records applied.

use crate::cli::DetectArgs;
use config_migrator::config::Settings;
use config_migrator::error::{MigrateError, Result};
use config_migrator::io;
use config_migrator::transform::{TransformDetector, TransformationReport};
use tracing::{info, warn};

/// Execute the `detect` command.
pub fn cmd_detect(args: DetectArgs) -> Result<()> {
    let apply_to = match (args.apply, &args.output) {
        (true, Some(path)) => Some(path),
        (true, None) => return Err(MigrateError::Input("--apply requires --output".to_string())),
        (false, _) => None,
    };
    let settings = Settings::load_or_default(args.settings.as_ref())?;
    let merged = io::load_tree(&args.merged, "merged config")?;
    let reference = io::load_tree(&args.reference, "reference template")?;

    let detector = TransformDetector::new(settings.transform);
    let records = detector.detect(&merged, &reference);
    let mut report = TransformationReport::new(records.clone());

    if let Some(path) = apply_to {
        let result = detector.apply(&merged, &records);
        for warning in io::output_warnings(&result.tree) {
            warn!(output = %path.display(), "{}", warning);
        }
        io::write_tree(path, &result.tree)?;
        info!(path = %path.display(), applied = result.applied.len(), "wrote transformed configuration");
        report = report.with_applied(&result);
    }

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report);
    }
    Ok(())
}

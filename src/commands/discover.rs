//! Implementation of the `config-migrator discover` command.
//!
//! Runs the first merge pass and candidate discovery only, then prints or
//! exports the discovery report. Nothing is merged or written besides the
//! report.

use crate::cli::DiscoverArgs;
use config_migrator::config::Settings;
use config_migrator::discovery::DiscoveryReport;
use config_migrator::error::{MigrateError, Result};
use config_migrator::io;
use config_migrator::merge::RenameMap;
use config_migrator::pipeline::{Pipeline, StageOptions};
use config_migrator::report::ReportFormat;
use tracing::info;

/// Execute the `discover` command.
pub fn cmd_discover(args: DiscoverArgs) -> Result<()> {
    let format = ReportFormat::from_str(&args.format)
        .ok_or_else(|| MigrateError::Input(format!("unsupported report format '{}'", args.format)))?;

    let settings = Settings::load_or_default(args.settings.as_ref())?;
    let golden = io::load_tree(&args.golden, "golden config")?;
    let template_old = io::load_tree(&args.template, "template")?;
    let template_new = io::load_tree(&args.new_template, "new template")?;
    let user_map = args.map.as_ref().map(RenameMap::load).transpose()?;

    let pipeline = Pipeline::new(settings, StageOptions::default());
    let migrations = pipeline.discover(&golden, &template_old, &template_new, user_map.as_ref());
    let report = DiscoveryReport::build(&migrations, &pipeline.settings().discovery);

    let rendered = match format {
        ReportFormat::Json => report.to_json()?,
        ReportFormat::Text => report.to_string(),
    };

    match &args.output {
        Some(path) => {
            io::atomic_write_file(path, &rendered)?;
            info!(path = %path.display(), migrations = migrations.len(), "wrote discovery report");
            println!(
                "Discovery report written to {} ({} migration(s) found)",
                path.display(),
                migrations.len()
            );
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

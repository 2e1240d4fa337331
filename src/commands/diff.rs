//! Implementation of the `config-migrator diff` command.

use crate::cli::DiffArgs;
use config_migrator::differ::TemplateDiff;
use config_migrator::error::{MigrateError, Result};
use config_migrator::io;

/// Print what changed between two template versions.
pub fn cmd_diff(args: DiffArgs) -> Result<()> {
    let old = io::load_tree(&args.template, "template")?;
    let new = io::load_tree(&args.new_template, "new template")?;

    println!("{}", render(&TemplateDiff::between(&old, &new), args.json)?);
    Ok(())
}

fn render(diff: &TemplateDiff, json: bool) -> Result<String> {
    if json {
        serde_json::to_string_pretty(diff)
            .map_err(|e| MigrateError::Output(format!("failed to serialize template diff: {}", e)))
    } else {
        Ok(diff.to_string().trim_end().to_string())
    }
}

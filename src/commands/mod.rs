//! Command implementations for config-migrator.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Reports go to stdout; diagnostics go through `tracing`.

mod detect;
mod diff;
mod discover;
mod migrate;

use crate::cli::Command;
use config_migrator::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Migrate(args) => migrate::cmd_migrate(args),
        Command::Diff(args) => diff::cmd_diff(args),
        Command::Discover(args) => discover::cmd_discover(args),
        Command::Detect(args) => detect::cmd_detect(args),
    }
}

//! Exit code constants for the config-migrator CLI.
//!
//! - 0: Migration (or analysis command) completed
//! - 1: Fatal failure (missing input, invalid syntax, invalid rename map,
//!   unwritable output)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// Any fatal failure. The run aborts before writing a partial result.
pub const FAILURE: i32 = 1;

//! Conflict-resolution merge engine.
//!
//! - [`MergeEngine`] applies customizations onto a new template.
//! - [`RenameMap`] relocates customizations whose path moved.
//! - [`ConflictLogEntry`] records every non-trivial decision.

mod engine;
mod log;
mod rename_map;


pub use engine::{MergeEngine, MergeOutcome, merge};
pub use log::{ConflictAction, ConflictLogEntry, LogFilter, MergeStatistics};
pub use rename_map::RenameMap;

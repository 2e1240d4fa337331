//! Candidate discovery engine.
//!
//! When a customization's path disappears from the new template, the
//! setting has often just moved: renamed, nested deeper, or folded into a
//! list of accounts. Discovery scans the new template with four independent
//! similarity signals, ranks the candidates they propose, and turns the
//! confident ones into a rename map for a second merge pass.

mod engine;
pub mod report;
pub mod signals;
mod similarity;
mod types;


pub use engine::DiscoveryEngine;
pub use report::{DiscoveryReport, DiscoverySummary, ReportEntry, ReviewGuidance};
pub use similarity::{jaccard, jaccard_of, sequence_ratio};
pub use types::{DiscoveredMigration, DiscoveryTier, MigrationCandidate, MigrationType};

//! Post-merge transformation detector.
//!
//! A merge can leave the same setting at two live paths: the customization
//! carried over at its old location and the template's new home for it.
//! The detector indexes every field by name and value, taking a sequence
//! as a single value, compares the duplicates against a reference template,
//! and proposes which path should win. Applying a Move deletes the old path
//! and prunes emptied parents.

mod detector;
mod report;
mod types;


pub use detector::TransformDetector;
pub use report::{AppliedSummary, TransformationReport};
pub use types::{AppliedTransformations, Confidence, Recommendation, TransformationRecord};

//! Template-aware migration of customized configuration trees.
//!
//! A golden configuration is a copy of a template that someone customized.
//! When the template moves to a new version, [`pipeline::Pipeline`] carries
//! those customizations over: [`differ`] extracts them, [`merge`] applies
//! them to the new template and logs every conflict, [`discovery`] finds
//! new homes for settings whose paths vanished, and [`transform`] cleans up
//! values left behind at both their old and new locations.

pub mod config;
pub mod differ;
pub mod discovery;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod merge;
pub mod pipeline;
pub mod report;
pub mod transform;
pub mod tree;

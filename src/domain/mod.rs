//! Core domain models for depsync
//!
//! This module contains the fundamental types used throughout the application:
//! - Dependency instances extracted from package.json files
//! - Semver range prefixes enforced by semver groups
//! - Summary structures for fixing commands

mod instance;
mod semver_range;
mod summary;

pub use instance::{Instance, InstanceId, LOCAL_TYPE};
pub use semver_range::SemverRange;
pub use summary::{FileOutcome, FixSummary};

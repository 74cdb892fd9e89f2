//! depsync - dependency version consistency library
//!
//! This library provides the engine behind the depsync CLI:
//! - Parsing version specifiers of every npm grammar
//! - Assigning dependency instances to semver and version groups
//! - Inspecting instances against their group's policy
//! - Fixing mismatches in package.json files
//! - Sorting package.json properties

pub mod cli;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod fix;
pub mod format;
pub mod group;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod report;
pub mod semver_group;
pub mod specifier;
pub mod version_group;

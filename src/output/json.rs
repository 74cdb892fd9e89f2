//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of command results
//! - Structured dependency-by-dependency instance information

use crate::domain::FixSummary;
use crate::orchestrator::{DependencyResult, InstanceResult, OrchestratorResult};
use crate::output::{OutputFormatter, Verbosity};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// JSON representation of the full result
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput {
    command: &'static str,
    dry_run: bool,
    mismatches: usize,
    exit_code: u8,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    dependencies: Vec<JsonDependency>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    semver_ranges: Vec<JsonInstance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<JsonSummary>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    no_semver_groups: bool,
    /// Errors encountered
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

/// JSON representation of one dependency in one version group
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonDependency {
    group: String,
    policy: &'static str,
    name: String,
    is_valid: bool,
    instances: Vec<JsonInstance>,
}

/// JSON representation of an instance
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonInstance {
    name: String,
    package: String,
    dependency_type: String,
    specifier: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fix: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    remove: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    conflicts: Vec<String>,
}

/// JSON representation of the counters of a fixing command
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSummary {
    valid: usize,
    fixed: usize,
    unfixable: usize,
    dry_run: bool,
    /// Files whose contents changed
    files: Vec<String>,
}

impl JsonFormatter {
    fn instance_to_json(instance: &InstanceResult) -> JsonInstance {
        JsonInstance {
            name: instance.name.clone(),
            package: instance.package.clone(),
            dependency_type: instance.dependency_type.clone(),
            specifier: instance.specifier.clone(),
            status: instance.status,
            expected: instance.expected.clone(),
            fix: instance.fix.clone(),
            remove: instance.removed,
            conflicts: instance.conflicts.clone(),
        }
    }

    /// Valid instances are left out unless verbose
    fn dependency_to_json(&self, dependency: &DependencyResult) -> JsonDependency {
        let instances = dependency
            .instances
            .iter()
            .filter(|i| i.is_mismatch || self.verbosity == Verbosity::Verbose)
            .map(Self::instance_to_json)
            .collect();
        JsonDependency {
            group: dependency.group.clone(),
            policy: dependency.policy,
            name: dependency.name.clone(),
            is_valid: !dependency.has_mismatch(),
            instances,
        }
    }

    fn summary_to_json(summary: &FixSummary) -> JsonSummary {
        JsonSummary {
            valid: summary.valid,
            fixed: summary.fixed,
            unfixable: summary.unfixable,
            dry_run: summary.dry_run,
            files: summary
                .files
                .iter()
                .filter(|f| f.changed)
                .map(|f| f.path.display().to_string())
                .collect(),
        }
    }
}

fn write_json<T: Serialize>(value: &T, writer: &mut dyn Write) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    writeln!(writer, "{}", json)
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput {
            command: result.command.name(),
            dry_run: result.dry_run,
            mismatches: result.mismatch_count(),
            exit_code: result.exit_code(),
            dependencies: result
                .dependencies
                .iter()
                .map(|d| self.dependency_to_json(d))
                .collect(),
            semver_ranges: result
                .semver_ranges
                .iter()
                .map(Self::instance_to_json)
                .collect(),
            summary: result.fix_summary.as_ref().map(Self::summary_to_json),
            no_semver_groups: result.no_semver_groups,
            errors: result.errors.iter().map(|e| e.to_string()).collect(),
        };

        write_json(&output, writer)
    }

    fn format_summary(
        &self,
        summary: &FixSummary,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        write_json(&Self::summary_to_json(summary), writer)
    }
}

//! Command orchestration
//!
//! This module provides:
//! - Workflow coordination: config → discover → extract → inspect → fix → write
//! - Dry-run mode support
//! - Error handling with partial continuation across files
//! - Exit status selection

use tracing::{debug, warn};

use crate::cli::{CliArgs, Commands};
use crate::config::Config;
use crate::context::Context;
use crate::domain::FixSummary;
use crate::error::{AppError, ManifestError};
use crate::fix;
use crate::format;
use crate::manifest::ManifestWriter;
use crate::report::{Fix, Report};
use crate::version_group::DependencyReports;

/// Exit status when everything is valid
pub const EXIT_OK: u8 = 0;
/// Exit status for mismatches and fatal configuration errors
pub const EXIT_MISMATCH: u8 = 1;
/// Exit status when some files could not be read, parsed or written
pub const EXIT_FILE_ERRORS: u8 = 2;

/// Orchestrator for running one command
pub struct Orchestrator {
    /// CLI arguments for configuration
    args: CliArgs,
}

/// One inspected instance, resolved for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceResult {
    /// Dependency name
    pub name: String,
    /// Package declaring the dependency
    pub package: String,
    /// Dependency type, e.g. `prod`
    pub dependency_type: String,
    /// Specifier as currently written
    pub specifier: String,
    /// Report status, e.g. `HIGHEST_SEMVER_MISMATCH`
    pub status: &'static str,
    pub expected: Option<String>,
    /// Specifier the fix writes; `None` with `removed` set for banned instances
    pub fix: Option<String>,
    pub removed: bool,
    /// Conflicting specifiers of a same-range mismatch
    pub conflicts: Vec<String>,
    pub is_mismatch: bool,
    pub is_fixable: bool,
}

/// Every instance of one dependency within one version group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyResult {
    /// Display label of the version group
    pub group: String,
    /// Policy of the version group, e.g. `standard`
    pub policy: &'static str,
    pub name: String,
    pub instances: Vec<InstanceResult>,
}

impl DependencyResult {
    /// Returns true if any instance mismatches
    pub fn has_mismatch(&self) -> bool {
        self.instances.iter().any(|i| i.is_mismatch)
    }

    /// Distinct specifiers in use, in first-seen order
    pub fn specifiers(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for instance in &self.instances {
            if !seen.contains(&instance.specifier.as_str()) {
                seen.push(&instance.specifier);
            }
        }
        seen
    }
}

/// Result of running a command
#[derive(Debug)]
pub struct OrchestratorResult {
    /// The command that ran
    pub command: Commands,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Version group results, grouped by group then dependency name
    pub dependencies: Vec<DependencyResult>,
    /// Semver group results, in instance order
    pub semver_ranges: Vec<InstanceResult>,
    /// Counters of fixing commands
    pub fix_summary: Option<FixSummary>,
    /// A semver range command ran without any semver group configured
    pub no_semver_groups: bool,
    /// Files which could not be read, parsed or written
    pub errors: Vec<ManifestError>,
}

impl OrchestratorResult {
    fn new(command: Commands) -> Self {
        Self {
            dry_run: command.dry_run(),
            command,
            dependencies: Vec::new(),
            semver_ranges: Vec::new(),
            fix_summary: None,
            no_semver_groups: false,
            errors: Vec::new(),
        }
    }

    /// Number of mismatching instances reported
    pub fn mismatch_count(&self) -> usize {
        let versions = self
            .dependencies
            .iter()
            .flat_map(|d| &d.instances)
            .filter(|i| i.is_mismatch)
            .count();
        let ranges = self.semver_ranges.iter().filter(|i| i.is_mismatch).count();
        versions + ranges
    }

    /// Process exit status for this result
    pub fn exit_code(&self) -> u8 {
        if !self.errors.is_empty() {
            return EXIT_FILE_ERRORS;
        }
        if self.no_semver_groups {
            return EXIT_MISMATCH;
        }
        let failed = match &self.fix_summary {
            Some(summary) => summary.unfixable > 0,
            None => self.mismatch_count() > 0,
        };
        if failed {
            EXIT_MISMATCH
        } else {
            EXIT_OK
        }
    }
}

impl Orchestrator {
    /// Create a new orchestrator with the given CLI arguments
    pub fn new(args: CliArgs) -> Self {
        Self { args }
    }

    /// Loads config and files, then runs the command.
    ///
    /// Fails only on configuration errors and when no file could be found at
    /// all; per-file problems are collected into the result.
    pub fn run(&self) -> Result<OrchestratorResult, AppError> {
        let config = Config::load(&self.args.cwd, &self.args.overrides())?;
        debug!("using config {:?}", config.config_path);
        let ctx = Context::load(config)?;
        Ok(self.run_with_context(ctx))
    }

    /// Runs the command against an already loaded context
    pub fn run_with_context(&self, mut ctx: Context) -> OrchestratorResult {
        let command = self.args.command.clone();
        let mut result = OrchestratorResult::new(command.clone());
        result.errors = std::mem::take(&mut ctx.file_errors);

        match &command {
            Commands::List => {
                result.dependencies = dependency_results(&ctx, ctx.inspect_versions());
            }
            Commands::ListMismatches => {
                result.dependencies = only_mismatches(dependency_results(&ctx, ctx.inspect_versions()));
            }
            Commands::Lint => {
                result.dependencies = only_mismatches(dependency_results(&ctx, ctx.inspect_versions()));
                result.semver_ranges = instance_results(&ctx, &ctx.inspect_semver_ranges())
                    .into_iter()
                    .filter(|i| i.is_mismatch)
                    .collect();
            }
            Commands::LintSemverRanges => {
                if !self.check_semver_groups(&ctx, &mut result) {
                    return result;
                }
                result.semver_ranges = instance_results(&ctx, &ctx.inspect_semver_ranges())
                    .into_iter()
                    .filter(|i| i.is_mismatch)
                    .collect();
            }
            Commands::FixMismatches(args) => {
                let inspected = ctx.inspect_versions();
                let reports: Vec<Report> = inspected
                    .iter()
                    .flat_map(|d| d.reports.iter().cloned())
                    .collect();
                result.dependencies = only_mismatches(dependency_results(&ctx, inspected));
                self.fix(&mut ctx, &reports, args.dry_run, &mut result);
            }
            Commands::SetSemverRanges(args) => {
                if !self.check_semver_groups(&ctx, &mut result) {
                    return result;
                }
                let reports = ctx.inspect_semver_ranges();
                result.semver_ranges = instance_results(&ctx, &reports)
                    .into_iter()
                    .filter(|i| i.is_mismatch)
                    .collect();
                self.fix(&mut ctx, &reports, args.dry_run, &mut result);
            }
            Commands::Format(args) => {
                let mut summary = FixSummary::new(args.dry_run);
                format::format_files(&mut ctx.files, &ctx.config, &mut summary);
                self.write(&ctx, summary, &mut result);
            }
        }

        result
    }

    /// Flags the result when no semver group is configured
    fn check_semver_groups(&self, ctx: &Context, result: &mut OrchestratorResult) -> bool {
        if ctx.config.has_semver_groups() {
            return true;
        }
        warn!(
            "{} requires at least one semver group in the config",
            self.args.command.name()
        );
        result.no_semver_groups = true;
        false
    }

    fn fix(&self, ctx: &mut Context, reports: &[Report], dry_run: bool, result: &mut OrchestratorResult) {
        let mut summary = FixSummary::new(dry_run);
        fix::apply_fixes(ctx, reports, &mut summary);
        self.write(ctx, summary, result);
    }

    /// Writes every changed file and records the summary
    fn write(&self, ctx: &Context, mut summary: FixSummary, result: &mut OrchestratorResult) {
        let writer = ManifestWriter::new(summary.dry_run);
        let errors = fix::write_changed(&ctx.files, &writer, &mut summary);
        result.errors.extend(errors);
        result.fix_summary = Some(summary);
    }
}

/// Display label of the `index`th version group
fn group_label(ctx: &Context, index: usize) -> String {
    let group = &ctx.version_groups[index];
    match &group.label {
        Some(label) => label.clone(),
        None if group.is_catch_all => "Default Version Group".to_string(),
        None => format!("Version Group {}", index + 1),
    }
}

fn dependency_results(ctx: &Context, inspected: Vec<DependencyReports>) -> Vec<DependencyResult> {
    inspected
        .into_iter()
        .map(|deps| DependencyResult {
            group: group_label(ctx, deps.group),
            policy: ctx.version_groups[deps.group].kind.name(),
            instances: instance_results(ctx, &deps.reports),
            name: deps.name,
        })
        .collect()
}

fn only_mismatches(dependencies: Vec<DependencyResult>) -> Vec<DependencyResult> {
    dependencies
        .into_iter()
        .filter_map(|mut deps| {
            deps.instances.retain(|i| i.is_mismatch);
            (!deps.instances.is_empty()).then_some(deps)
        })
        .collect()
}

fn instance_results(ctx: &Context, reports: &[Report]) -> Vec<InstanceResult> {
    reports
        .iter()
        .map(|report| {
            let instance = ctx.instance(report.instance());
            let (fix, removed) = match report.fix() {
                Some(Fix::Set(specifier)) => (Some(specifier.raw().to_string()), false),
                Some(Fix::Remove) => (None, true),
                None => (None, false),
            };
            let conflicts = match report {
                Report::SameRangeMismatch { mismatches, .. } => mismatches.clone(),
                _ => Vec::new(),
            };
            InstanceResult {
                name: instance.name.clone(),
                package: instance.package_name.clone(),
                dependency_type: instance.dependency_type.name.clone(),
                specifier: instance.raw().to_string(),
                status: report.status(),
                expected: report.expected_version().map(String::from),
                fix,
                removed,
                conflicts,
                is_mismatch: report.is_mismatch(),
                is_fixable: report.is_fixable(),
            }
        })
        .collect()
}

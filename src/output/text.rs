//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Dependencies listed per version group, with their status
//! - The fix, expected version or conflicting ranges of each mismatch
//! - Semver range mismatches
//! - Summary of fixing commands

use crate::domain::FixSummary;
use crate::orchestrator::{DependencyResult, InstanceResult, OrchestratorResult};
use crate::output::{OutputFormatter, Verbosity};
use colored::{ColoredString, Colorize};
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn arrow(&self) -> String {
        if self.color {
            "→".dimmed().to_string()
        } else {
            "->".to_string()
        }
    }

    fn valid_icon(&self) -> String {
        if self.color {
            "✓".green().to_string()
        } else {
            "ok".to_string()
        }
    }

    fn mismatch_icon(&self) -> String {
        if self.color {
            "✗".red().to_string()
        } else {
            "x".to_string()
        }
    }

    /// Get the dry-run prefix if applicable
    fn dry_run_prefix(&self, dry_run: bool) -> String {
        if !dry_run {
            return String::new();
        }
        format!("{} ", self.paint("(dry-run)", |s| s.cyan()))
    }

    /// What fixing the instance does, or why it cannot be fixed
    fn describe(&self, instance: &InstanceResult) -> String {
        if let Some(fix) = &instance.fix {
            return format!("{} {}", self.arrow(), self.paint(fix, |s| s.bright_white().bold()));
        }
        if instance.removed {
            return format!("{} {}", self.arrow(), self.paint("(remove)", |s| s.red()));
        }
        if !instance.conflicts.is_empty() {
            let conflicts = format!("(does not intersect {})", instance.conflicts.join(", "));
            return self.paint(&conflicts, |s| s.yellow());
        }
        if instance.is_mismatch {
            return self.paint("(cannot be fixed automatically)", |s| s.yellow());
        }
        match &instance.expected {
            Some(expected) if self.verbosity == Verbosity::Verbose => {
                self.paint(&format!("(expected {})", expected), |s| s.dimmed())
            }
            _ => String::new(),
        }
    }

    fn format_instance_line(
        &self,
        instance: &InstanceResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let icon = if instance.is_mismatch {
            self.mismatch_icon()
        } else {
            self.valid_icon()
        };
        let location = format!("in {} [{}]", instance.package, instance.dependency_type);
        let status = if instance.is_mismatch {
            format!(" {}", self.paint(instance.status, |s| s.red()))
        } else {
            String::new()
        };
        let detail = self.describe(instance);
        writeln!(
            writer,
            "    {} {} {}{}{}",
            icon,
            instance.specifier,
            self.paint(&location, |s| s.dimmed()),
            status,
            if detail.is_empty() {
                String::new()
            } else {
                format!(" {}", detail)
            }
        )
    }

    fn format_dependency(
        &self,
        dependency: &DependencyResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let mismatch = dependency.has_mismatch();
        let icon = if mismatch {
            self.mismatch_icon()
        } else {
            self.valid_icon()
        };
        let name = if mismatch {
            self.paint(&dependency.name, |s| s.bold())
        } else {
            dependency.name.clone()
        };
        writeln!(
            writer,
            "  {} {} {}",
            icon,
            name,
            self.paint(&dependency.specifiers().join(", "), |s| s.dimmed())
        )?;

        if mismatch || self.verbosity == Verbosity::Verbose {
            for instance in &dependency.instances {
                self.format_instance_line(instance, writer)?;
            }
        }
        Ok(())
    }

    fn format_dependencies(
        &self,
        dependencies: &[DependencyResult],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let mut current_group: Option<&str> = None;
        for dependency in dependencies {
            if current_group != Some(dependency.group.as_str()) {
                if current_group.is_some() {
                    writeln!(writer)?;
                }
                let header = format!("= {} ({}) =", dependency.group, dependency.policy);
                writeln!(writer, "{}", self.paint(&header, |s| s.bold()))?;
                current_group = Some(&dependency.group);
            }
            self.format_dependency(dependency, writer)?;
        }
        if current_group.is_some() {
            writeln!(writer)?;
        }
        Ok(())
    }

    fn format_semver_ranges(
        &self,
        instances: &[InstanceResult],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if instances.is_empty() {
            return Ok(());
        }
        writeln!(writer, "{}", self.paint("= Semver Ranges =", |s| s.bold()))?;
        for instance in instances {
            let detail = self.describe(instance);
            writeln!(
                writer,
                "  {} {} {} {} {}",
                self.mismatch_icon(),
                instance.name,
                instance.specifier,
                detail,
                self.paint(
                    &format!("in {} [{}]", instance.package, instance.dependency_type),
                    |s| s.dimmed()
                )
            )?;
        }
        writeln!(writer)
    }

    fn format_quiet(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        if let Some(summary) = &result.fix_summary {
            let prefix = self.dry_run_prefix(summary.dry_run);
            return writeln!(
                writer,
                "{}{} fixed, {} unfixable",
                prefix, summary.fixed, summary.unfixable
            );
        }
        match result.mismatch_count() {
            0 => writeln!(writer, "{}", self.paint("No mismatches", |s| s.dimmed())),
            count => writeln!(
                writer,
                "{} {}",
                self.paint(&count.to_string(), |s| s.red()),
                if count == 1 { "mismatch" } else { "mismatches" }
            ),
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        // In quiet mode, only show counts
        if self.verbosity == Verbosity::Quiet {
            return self.format_quiet(result, writer);
        }

        if result.no_semver_groups {
            writeln!(
                writer,
                "{} {} needs \"semverGroups\" in the config",
                self.paint("warning:", |s| s.yellow().bold()),
                result.command.name()
            )?;
            return Ok(());
        }

        self.format_dependencies(&result.dependencies, writer)?;
        self.format_semver_ranges(&result.semver_ranges, writer)?;

        if !result.errors.is_empty() {
            writeln!(writer, "{}:", self.paint("Errors", |s| s.red().bold()))?;
            for error in &result.errors {
                writeln!(writer, "  {} {}", self.mismatch_icon(), error)?;
            }
            writeln!(writer)?;
        }

        match &result.fix_summary {
            Some(summary) => self.format_summary(summary, writer)?,
            None if result.mismatch_count() == 0 => {
                writeln!(writer, "{} No mismatches found", self.valid_icon())?;
            }
            None => {}
        }

        Ok(())
    }

    fn format_summary(
        &self,
        summary: &FixSummary,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let prefix = self.dry_run_prefix(summary.dry_run);
        writeln!(writer, "{}{}:", prefix, self.paint("Summary", |s| s.bold()))?;
        writeln!(
            writer,
            "  {} valid, {} fixed, {} unfixable",
            summary.valid,
            self.paint(&summary.fixed.to_string(), |s| s.green()),
            self.paint(&summary.unfixable.to_string(), |s| s.red()),
        )?;
        if summary.dry_run {
            writeln!(writer, "  {} file(s) would be written", summary.files_changed())?;
        } else {
            writeln!(writer, "  {} file(s) written", summary.files_written())?;
        }

        if self.verbosity == Verbosity::Verbose {
            for file in summary.files.iter().filter(|f| f.changed) {
                writeln!(writer, "    {}", self.paint(&file.path.display().to_string(), |s| s.dimmed()))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Commands, FixArgs};
    use crate::domain::FileOutcome;

    fn instance(package: &str, specifier: &str, status: &'static str) -> InstanceResult {
        InstanceResult {
            name: "react".to_string(),
            package: package.to_string(),
            dependency_type: "prod".to_string(),
            specifier: specifier.to_string(),
            status,
            expected: Some("18.2.0".to_string()),
            fix: None,
            removed: false,
            conflicts: Vec::new(),
            is_mismatch: status != "VALID",
            is_fixable: false,
        }
    }

    fn create_test_result(command: Commands) -> OrchestratorResult {
        let mut mismatch = instance("a", "17.0.0", "HIGHEST_SEMVER_MISMATCH");
        mismatch.fix = Some("18.2.0".to_string());
        mismatch.is_fixable = true;
        OrchestratorResult {
            dry_run: command.dry_run(),
            command,
            dependencies: vec![DependencyResult {
                group: "Default Version Group".to_string(),
                policy: "standard",
                name: "react".to_string(),
                instances: vec![mismatch, instance("b", "18.2.0", "VALID")],
            }],
            semver_ranges: Vec::new(),
            fix_summary: None,
            no_semver_groups: false,
            errors: Vec::new(),
        }
    }

    fn render(formatter: &TextFormatter, result: &OrchestratorResult) -> String {
        let mut output = Vec::new();
        formatter.format(result, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_format_mismatch() {
        let formatter = TextFormatter::with_color(Verbosity::Normal, false);
        let output = render(&formatter, &create_test_result(Commands::List));

        assert!(output.contains("= Default Version Group (standard) ="));
        assert!(output.contains("  x react 17.0.0, 18.2.0"));
        assert!(output.contains("    x 17.0.0 in a [prod] HIGHEST_SEMVER_MISMATCH -> 18.2.0"));
        assert!(output.contains("    ok 18.2.0 in b [prod]"));
        assert!(!output.contains("No mismatches found"));
    }

    #[test]
    fn test_valid_dependency_collapses() {
        let formatter = TextFormatter::with_color(Verbosity::Normal, false);
        let mut result = create_test_result(Commands::List);
        result.dependencies[0].instances.remove(0);
        let output = render(&formatter, &result);

        assert!(output.contains("  ok react 18.2.0"));
        assert!(!output.contains("in b [prod]"));
        assert!(output.contains("No mismatches found"));
    }

    #[test]
    fn test_verbose_shows_expected_versions() {
        let formatter = TextFormatter::with_color(Verbosity::Verbose, false);
        let mut result = create_test_result(Commands::List);
        result.dependencies[0].instances.remove(0);
        let output = render(&formatter, &result);

        assert!(output.contains("    ok 18.2.0 in b [prod] (expected 18.2.0)"));
    }

    #[test]
    fn test_unfixable_details() {
        let formatter = TextFormatter::with_color(Verbosity::Normal, false);
        let mut result = create_test_result(Commands::Lint);
        let mut conflict = instance("c", "^16.0.0", "SAME_RANGE_MISMATCH");
        conflict.conflicts = vec!["^18.0.0".to_string()];
        let unsupported = instance("d", "latest", "UNSUPPORTED_MISMATCH");
        result.dependencies[0].instances = vec![conflict, unsupported];
        let output = render(&formatter, &result);

        assert!(output.contains("(does not intersect ^18.0.0)"));
        assert!(output.contains("(cannot be fixed automatically)"));
    }

    #[test]
    fn test_format_summary_dry_run() {
        let formatter = TextFormatter::with_color(Verbosity::Normal, false);
        let mut result = create_test_result(Commands::FixMismatches(FixArgs { dry_run: true }));
        let mut summary = FixSummary::new(true);
        summary.valid = 1;
        summary.fixed = 1;
        summary.add_file(FileOutcome::new("a/package.json", true, false));
        result.fix_summary = Some(summary);
        let output = render(&formatter, &result);

        assert!(output.contains("(dry-run) Summary:"));
        assert!(output.contains("  1 valid, 1 fixed, 0 unfixable"));
        assert!(output.contains("  1 file(s) would be written"));
    }

    #[test]
    fn test_quiet_mode() {
        let formatter = TextFormatter::with_color(Verbosity::Quiet, false);
        let output = render(&formatter, &create_test_result(Commands::List));
        assert_eq!(output, "1 mismatch\n");
    }

    #[test]
    fn test_no_semver_groups_warning() {
        let formatter = TextFormatter::with_color(Verbosity::Normal, false);
        let mut result = create_test_result(Commands::LintSemverRanges);
        result.dependencies.clear();
        result.no_semver_groups = true;
        let output = render(&formatter, &result);
        assert!(output.contains("warning: lint-semver-ranges needs \"semverGroups\""));
    }

    #[test]
    fn test_semver_ranges_section() {
        let formatter = TextFormatter::with_color(Verbosity::Normal, false);
        let mut result = create_test_result(Commands::LintSemverRanges);
        result.dependencies.clear();
        let mut range = instance("a", "18.2.0", "SEMVER_RANGE_MISMATCH");
        range.fix = Some("^18.2.0".to_string());
        result.semver_ranges = vec![range];
        let output = render(&formatter, &result);

        assert!(output.contains("= Semver Ranges ="));
        assert!(output.contains("  x react 18.2.0 -> ^18.2.0 in a [prod]"));
    }
}

//! CLI argument parsing module for depsync

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CliOverrides;

/// Dependency version consistency checker for monorepos
#[derive(Parser, Debug, Clone)]
#[command(
    name = "depsync",
    version,
    about = "Keeps dependency versions consistent across the packages of a monorepo"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    /// Repository root (default: current directory)
    #[arg(short = 'C', long, global = true, default_value = ".")]
    pub cwd: PathBuf,

    /// Path to a config file, instead of searching for one
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Glob of package.json files to check (can be specified multiple times)
    #[arg(long, global = true, action = ArgAction::Append)]
    pub source: Vec<String>,

    /// Comma-separated dependency types to check, e.g. "prod,dev,!peer"
    #[arg(long, global = true)]
    pub types: Option<String>,

    /// Only check dependencies whose name matches this regex
    #[arg(long, global = true)]
    pub filter: Option<String>,

    /// Indentation used when writing package.json files
    #[arg(long, global = true)]
    pub indent: Option<String>,

    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Options shared by the commands which rewrite files
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct FixArgs {
    /// Show what would be fixed without writing any file
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Report version and semver range mismatches
    Lint,
    /// List every dependency and its status
    List,
    /// List only dependencies with mismatching versions
    ListMismatches,
    /// Rewrite mismatching versions
    FixMismatches(FixArgs),
    /// Report instances using the wrong semver range
    LintSemverRanges,
    /// Rewrite instances using the wrong semver range
    SetSemverRanges(FixArgs),
    /// Sort and shorten package.json properties
    Format(FixArgs),
}

impl Commands {
    /// Name of the command as typed on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Lint => "lint",
            Commands::List => "list",
            Commands::ListMismatches => "list-mismatches",
            Commands::FixMismatches(_) => "fix-mismatches",
            Commands::LintSemverRanges => "lint-semver-ranges",
            Commands::SetSemverRanges(_) => "set-semver-ranges",
            Commands::Format(_) => "format",
        }
    }

    /// Returns true for commands which rewrite files
    pub fn is_fix(&self) -> bool {
        matches!(
            self,
            Commands::FixMismatches(_) | Commands::SetSemverRanges(_) | Commands::Format(_)
        )
    }

    pub fn dry_run(&self) -> bool {
        match self {
            Commands::FixMismatches(args)
            | Commands::SetSemverRanges(args)
            | Commands::Format(args) => args.dry_run,
            _ => false,
        }
    }
}

impl CliArgs {
    /// Config values given on the command line
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            config: self.config.clone(),
            source: self.source.clone(),
            types: self.types.clone(),
            filter: self.filter.clone(),
            indent: self.indent.clone(),
        }
    }

    pub fn dry_run(&self) -> bool {
        self.command.dry_run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_args() {
        let args = CliArgs::parse_from(["depsync", "lint"]);
        assert_eq!(args.command, Commands::Lint);
        assert_eq!(args.cwd, PathBuf::from("."));
        assert!(args.config.is_none());
        assert!(args.source.is_empty());
        assert!(args.types.is_none());
        assert!(args.filter.is_none());
        assert!(args.indent.is_none());
        assert!(!args.json);
        assert!(!args.verbose);
        assert!(!args.quiet);
        assert!(!args.dry_run());
    }

    #[test]
    fn test_subcommands() {
        let cases = [
            ("lint", "lint"),
            ("list", "list"),
            ("list-mismatches", "list-mismatches"),
            ("fix-mismatches", "fix-mismatches"),
            ("lint-semver-ranges", "lint-semver-ranges"),
            ("set-semver-ranges", "set-semver-ranges"),
            ("format", "format"),
        ];
        for (arg, name) in cases {
            let args = CliArgs::parse_from(["depsync", arg]);
            assert_eq!(args.command.name(), name);
        }
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(CliArgs::try_parse_from(["depsync"]).is_err());
    }

    #[test]
    fn test_dry_run_short_flag() {
        let args = CliArgs::parse_from(["depsync", "fix-mismatches", "-n"]);
        assert!(args.dry_run());
        assert!(args.command.is_fix());
    }

    #[test]
    fn test_format_is_a_fixing_command() {
        let args = CliArgs::parse_from(["depsync", "format", "--dry-run"]);
        assert_eq!(args.command, Commands::Format(FixArgs { dry_run: true }));
        assert!(args.command.is_fix());
        assert!(args.dry_run());
    }

    #[test]
    fn test_dry_run_long_flag() {
        let args = CliArgs::parse_from(["depsync", "set-semver-ranges", "--dry-run"]);
        assert!(args.dry_run());
    }

    #[test]
    fn test_dry_run_only_on_fixing_commands() {
        assert!(CliArgs::try_parse_from(["depsync", "lint", "--dry-run"]).is_err());
        assert!(!CliArgs::parse_from(["depsync", "list"]).command.is_fix());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = CliArgs::parse_from([
            "depsync",
            "list",
            "--json",
            "--verbose",
            "--types",
            "prod,dev",
            "--filter",
            "^react",
        ]);
        assert!(args.json);
        assert!(args.verbose);
        assert_eq!(args.types.as_deref(), Some("prod,dev"));
        assert_eq!(args.filter.as_deref(), Some("^react"));
    }

    #[test]
    fn test_quiet_flags() {
        let args = CliArgs::parse_from(["depsync", "-q", "lint"]);
        assert!(args.quiet);

        let args = CliArgs::parse_from(["depsync", "lint", "--quiet"]);
        assert!(args.quiet);
    }

    #[test]
    fn test_source_multiple() {
        let args = CliArgs::parse_from([
            "depsync",
            "lint",
            "--source",
            "package.json",
            "--source",
            "apps/*/package.json",
        ]);
        assert_eq!(args.source, vec!["package.json", "apps/*/package.json"]);
    }

    #[test]
    fn test_overrides() {
        let args = CliArgs::parse_from([
            "depsync",
            "--config",
            "custom.json",
            "--indent",
            "    ",
            "list",
        ]);
        let overrides = args.overrides();
        assert_eq!(overrides.config, Some(PathBuf::from("custom.json")));
        assert_eq!(overrides.indent.as_deref(), Some("    "));
        assert!(overrides.source.is_empty());
    }

    #[test]
    fn test_cwd_flag() {
        let args = CliArgs::parse_from(["depsync", "-C", "/some/path", "list"]);
        assert_eq!(args.cwd, PathBuf::from("/some/path"));
    }
}

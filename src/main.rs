//! depsync - dependency version consistency checker for monorepos
//!
//! Finds every dependency declared in the package.json files of a
//! repository and checks that each one follows its version group's policy:
//! - one shared version per dependency (highest or lowest)
//! - local packages are the source of truth for their own version
//! - pinned, banned, snapped-to and same-range policies
//! - consistent semver range prefixes

use clap::Parser;
use depsync::cli::CliArgs;
use depsync::orchestrator::{Orchestrator, EXIT_MISMATCH};
use depsync::output::{create_formatter, OutputConfig};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(exit_code) => ExitCode::from(exit_code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_MISMATCH)
        }
    }
}

/// Logs go to stderr; `RUST_LOG` wins over `--verbose`
fn init_logging(verbose: bool) {
    let default_level = if verbose { "depsync=debug" } else { "depsync=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic
fn run(args: CliArgs) -> anyhow::Result<u8> {
    tracing::debug!(
        command = args.command.name(),
        cwd = %args.cwd.display(),
        "depsync v{}",
        env!("CARGO_PKG_VERSION")
    );

    let orchestrator = Orchestrator::new(args.clone());
    let result = orchestrator.run()?;

    let output_config = OutputConfig::from_cli(args.json, args.verbose, args.quiet);
    let formatter = create_formatter(output_config);

    let mut stdout = io::stdout().lock();
    formatter.format(&result, &mut stdout)?;
    stdout.flush()?;

    Ok(result.exit_code())
}

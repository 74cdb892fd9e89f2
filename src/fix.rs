//! Applying fixes to package.json files
//!
//! Fixes are written into the in-memory JSON of each file first. Files are
//! persisted afterwards, and only those whose contents actually changed.

use tracing::{debug, warn};

use crate::context::Context;
use crate::domain::FixSummary;
use crate::error::ManifestError;
use crate::manifest::{ManifestWriter, PackageJsonFile};
use crate::report::{Fix, Report};

/// Writes the fix of every fixable report into its file's contents.
///
/// Every report is counted once in `summary` as valid, fixed or unfixable.
pub fn apply_fixes(ctx: &mut Context, reports: &[Report], summary: &mut FixSummary) {
    let Context {
        instances, files, ..
    } = ctx;

    for report in reports {
        let instance = &instances[report.instance().0];
        let Some(fix) = report.fix() else {
            if report.is_mismatch() {
                summary.unfixable += 1;
            } else {
                summary.valid += 1;
            }
            continue;
        };

        let value = match fix {
            Fix::Set(specifier) => Some(specifier.raw()),
            Fix::Remove => None,
        };
        let contents = &mut files[instance.file].contents;
        match instance
            .dependency_type
            .write(contents, &instance.name, value)
        {
            Ok(()) => {
                debug!("fixed {} -> {}", instance, value.unwrap_or("(removed)"));
                summary.fixed += 1;
            }
            Err(e) => {
                warn!("cannot fix {}: {}", instance, e);
                summary.unfixable += 1;
            }
        }
    }
}

/// Persists every changed file, collecting write failures
pub fn write_changed(
    files: &[PackageJsonFile],
    writer: &ManifestWriter,
    summary: &mut FixSummary,
) -> Vec<ManifestError> {
    let mut errors = Vec::new();
    for file in files {
        match writer.write_if_changed(file) {
            Ok(outcome) => summary.add_file(outcome),
            Err(e) => {
                warn!("{}", e);
                errors.push(e);
            }
        }
    }
    errors
}

//! package.json discovery, reading and writing
//!
//! This module provides functionality to:
//! - Find package.json files from source globs and workspace settings
//! - Hold each file's JSON tree in memory for fixes
//! - Read and write dependency values through strategies
//! - Persist files whose values changed

mod detector;
mod package_json;
mod strategy;
mod writer;

pub use detector::{default_sources, discover_sources};
pub use package_json::{PackageJsonFile, DEFAULT_INDENT};
pub use strategy::{get_path, Strategy, DEFAULT_NAME_PATH};
pub use writer::ManifestWriter;

use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::ManifestError;

/// Reads every file, collecting failures instead of stopping at the first one
pub fn read_all(paths: &[PathBuf], cwd: &Path) -> (Vec<PackageJsonFile>, Vec<ManifestError>) {
    let mut files = Vec::new();
    let mut errors = Vec::new();

    for path in paths {
        match PackageJsonFile::read(path, cwd) {
            Ok(file) => files.push(file),
            Err(e) => {
                warn!("excluding {}: {}", path.display(), e);
                errors.push(e);
            }
        }
    }

    (files, errors)
}

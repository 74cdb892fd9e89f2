//! Manifest file writing
//!
//! This module provides:
//! - ManifestWriter for persisting fixed package.json files
//! - Dry-run mode support (no actual file modifications)
//! - Write-if-changed: untouched files are never rewritten

use std::fs;
use tracing::info;

use crate::domain::FileOutcome;
use crate::error::ManifestError;
use crate::manifest::PackageJsonFile;

/// Writer for package.json files changed by fixes
pub struct ManifestWriter {
    /// Whether to run in dry-run mode (no file modifications)
    dry_run: bool,
}

impl ManifestWriter {
    /// Create a new ManifestWriter
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Create a ManifestWriter in dry-run mode
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }

    /// Check if this writer is in dry-run mode
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Writes the file only if at least one of its values changed
    pub fn write_if_changed(&self, file: &PackageJsonFile) -> Result<FileOutcome, ManifestError> {
        if !file.has_changed() {
            return Ok(FileOutcome::new(&file.short_path, false, false));
        }

        if self.dry_run {
            info!("would write {}", file.short_path.display());
            return Ok(FileOutcome::new(&file.short_path, true, false));
        }

        let text = file.to_json_string()?;
        fs::write(&file.path, text).map_err(|e| ManifestError::write_error(&file.path, e))?;
        info!("wrote {}", file.short_path.display());
        Ok(FileOutcome::new(&file.short_path, true, true))
    }
}

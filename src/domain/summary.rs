//! Fix result summary types
//!
//! Provides structures for tracking fix outcomes at file and overall levels.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of fixing a single package.json file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOutcome {
    /// Path relative to the working directory
    pub path: PathBuf,
    /// Whether any instance in the file changed value
    pub changed: bool,
    /// Whether the file was actually written
    pub written: bool,
}

impl FileOutcome {
    /// Creates a new FileOutcome
    pub fn new(path: impl Into<PathBuf>, changed: bool, written: bool) -> Self {
        Self {
            path: path.into(),
            changed,
            written,
        }
    }
}

/// Counts of instances by what a fixing command did with them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixSummary {
    /// Instances which needed no change
    pub valid: usize,
    /// Instances which were rewritten or removed
    pub fixed: usize,
    /// Mismatching instances which cannot be fixed automatically
    pub unfixable: usize,
    /// Per-file outcomes, in file order
    pub files: Vec<FileOutcome>,
    /// Whether this was a dry run
    pub dry_run: bool,
}

impl FixSummary {
    /// Creates a new FixSummary
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Adds a file outcome
    pub fn add_file(&mut self, file: FileOutcome) {
        self.files.push(file);
    }

    /// Returns the total number of instances counted
    pub fn total(&self) -> usize {
        self.valid + self.fixed + self.unfixable
    }

    /// Returns the number of files whose contents changed
    pub fn files_changed(&self) -> usize {
        self.files.iter().filter(|f| f.changed).count()
    }

    /// Returns the number of files written to disk
    pub fn files_written(&self) -> usize {
        self.files.iter().filter(|f| f.written).count()
    }

    /// Returns true if any files changed
    pub fn has_changes(&self) -> bool {
        self.files_changed() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_summary_new() {
        let summary = FixSummary::new(true);
        assert!(summary.dry_run);
        assert_eq!(summary.total(), 0);
        assert!(!summary.has_changes());
    }

    #[test]
    fn test_fix_summary_counts() {
        let mut summary = FixSummary::new(false);
        summary.valid = 3;
        summary.fixed = 2;
        summary.unfixable = 1;
        assert_eq!(summary.total(), 6);
    }

    #[test]
    fn test_fix_summary_files() {
        let mut summary = FixSummary::new(false);
        summary.add_file(FileOutcome::new("packages/a/package.json", true, true));
        summary.add_file(FileOutcome::new("packages/b/package.json", false, false));
        summary.add_file(FileOutcome::new("packages/c/package.json", true, false));

        assert_eq!(summary.files_changed(), 2);
        assert_eq!(summary.files_written(), 1);
        assert!(summary.has_changes());
    }

    #[test]
    fn test_serde_fix_summary() {
        let mut summary = FixSummary::new(false);
        summary.fixed = 1;
        summary.add_file(FileOutcome::new("package.json", true, true));

        let json = serde_json::to_string(&summary).unwrap();
        let parsed: FixSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, summary);
    }
}

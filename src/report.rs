//! Inspection results
//!
//! One [`Report`] is produced for every instance by its version group, and one
//! by its semver group when ranges are linted. Fixable variants carry the
//! specifier to write; unfixable ones only point at the instance.

use crate::domain::InstanceId;
use crate::specifier::Specifier;

/// What applying a fix does to an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fix<'a> {
    /// Write this specifier
    Set(&'a Specifier),
    /// Remove the dependency
    Remove,
}

/// Result of inspecting one instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// The instance follows its group's policy
    Valid {
        instance: InstanceId,
        expected: Option<String>,
    },
    /// The instance is excluded from range enforcement
    Ignored { instance: InstanceId },
    /// Only the range prefix is wrong
    SemverRangeMismatch { instance: InstanceId, fix: Specifier },
    /// Does not use the pinned version
    PinnedMismatch {
        instance: InstanceId,
        expected: String,
        fix: Specifier,
    },
    /// Does not use the version of the snapped-to package
    SnappedToMismatch {
        instance: InstanceId,
        expected: String,
        fix: Specifier,
    },
    /// Does not use the version of the local package of the same name
    WorkspaceMismatch {
        instance: InstanceId,
        expected: String,
        fix: Specifier,
    },
    /// Lower than the highest version in use
    HighestSemverMismatch {
        instance: InstanceId,
        expected: String,
        fix: Specifier,
    },
    /// Higher than the lowest version in use
    LowestSemverMismatch {
        instance: InstanceId,
        expected: String,
        fix: Specifier,
    },
    /// The dependency must not be used
    BannedMismatch { instance: InstanceId },
    /// The range does not intersect with the ranges listed
    SameRangeMismatch {
        instance: InstanceId,
        mismatches: Vec<String>,
    },
    /// A mismatch which cannot be fixed automatically
    UnsupportedMismatch { instance: InstanceId },
}

impl Report {
    /// The instance this report is about
    pub fn instance(&self) -> InstanceId {
        match self {
            Report::Valid { instance, .. }
            | Report::Ignored { instance }
            | Report::SemverRangeMismatch { instance, .. }
            | Report::PinnedMismatch { instance, .. }
            | Report::SnappedToMismatch { instance, .. }
            | Report::WorkspaceMismatch { instance, .. }
            | Report::HighestSemverMismatch { instance, .. }
            | Report::LowestSemverMismatch { instance, .. }
            | Report::BannedMismatch { instance }
            | Report::SameRangeMismatch { instance, .. }
            | Report::UnsupportedMismatch { instance } => *instance,
        }
    }

    /// Machine readable status
    pub fn status(&self) -> &'static str {
        match self {
            Report::Valid { .. } => "VALID",
            Report::Ignored { .. } => "IGNORED",
            Report::SemverRangeMismatch { .. } => "SEMVER_RANGE_MISMATCH",
            Report::PinnedMismatch { .. } => "PINNED_MISMATCH",
            Report::SnappedToMismatch { .. } => "SNAPPED_TO_MISMATCH",
            Report::WorkspaceMismatch { .. } => "WORKSPACE_MISMATCH",
            Report::HighestSemverMismatch { .. } => "HIGHEST_SEMVER_MISMATCH",
            Report::LowestSemverMismatch { .. } => "LOWEST_SEMVER_MISMATCH",
            Report::BannedMismatch { .. } => "BANNED_MISMATCH",
            Report::SameRangeMismatch { .. } => "SAME_RANGE_MISMATCH",
            Report::UnsupportedMismatch { .. } => "UNSUPPORTED_MISMATCH",
        }
    }

    /// Returns true unless the report is `Valid` or `Ignored`
    pub fn is_mismatch(&self) -> bool {
        !matches!(self, Report::Valid { .. } | Report::Ignored { .. })
    }

    /// Returns true for mismatches carrying a fix
    pub fn is_fixable(&self) -> bool {
        self.fix().is_some()
    }

    /// Returns true for mismatches which cannot be fixed automatically
    pub fn is_unfixable(&self) -> bool {
        self.is_mismatch() && !self.is_fixable()
    }

    /// The fix to apply, if any
    pub fn fix(&self) -> Option<Fix<'_>> {
        match self {
            Report::SemverRangeMismatch { fix, .. }
            | Report::PinnedMismatch { fix, .. }
            | Report::SnappedToMismatch { fix, .. }
            | Report::WorkspaceMismatch { fix, .. }
            | Report::HighestSemverMismatch { fix, .. }
            | Report::LowestSemverMismatch { fix, .. } => Some(Fix::Set(fix)),
            Report::BannedMismatch { .. } => Some(Fix::Remove),
            Report::Valid { .. }
            | Report::Ignored { .. }
            | Report::SameRangeMismatch { .. }
            | Report::UnsupportedMismatch { .. } => None,
        }
    }

    /// The version the instance should use, when one is known
    pub fn expected_version(&self) -> Option<&str> {
        match self {
            Report::Valid { expected, .. } => expected.as_deref(),
            Report::PinnedMismatch { expected, .. }
            | Report::SnappedToMismatch { expected, .. }
            | Report::WorkspaceMismatch { expected, .. }
            | Report::HighestSemverMismatch { expected, .. }
            | Report::LowestSemverMismatch { expected, .. } => Some(expected),
            _ => None,
        }
    }
}

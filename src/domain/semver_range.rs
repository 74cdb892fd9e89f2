//! Semver range prefixes enforced by semver groups
//!
//! Handles the range styles a semver group can require:
//! - Exact: `1.2.3`
//! - Caret / tilde: `^1.2.3`, `~1.2.3`
//! - Comparators: `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3`
//! - Wildcards: `*`, `1.x.x`

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// A plain version, optionally preceded by a single range operator
static SIMPLE_SEMVER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\^|~|>=|>|<=|<|=)?v?(\d+)\.(\d+)\.(\d+)((?:-[0-9A-Za-z.-]+)?(?:\+[0-9A-Za-z.-]+)?)$")
        .unwrap()
});

/// The range prefix a semver group requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemverRange {
    /// `<1.2.3`
    #[serde(rename = "<")]
    Lt,
    /// `<=1.2.3`
    #[serde(rename = "<=")]
    Lte,
    /// `1.2.3`
    #[serde(rename = "")]
    Exact,
    /// `1.x.x`
    #[serde(rename = ".x")]
    Loose,
    /// `~1.2.3`
    #[serde(rename = "~")]
    Tilde,
    /// `^1.2.3`
    #[serde(rename = "^")]
    Caret,
    /// `>=1.2.3`
    #[serde(rename = ">=")]
    Gte,
    /// `>1.2.3`
    #[serde(rename = ">")]
    Gt,
    /// `*`
    #[serde(rename = "*")]
    Any,
}

impl SemverRange {
    /// Parses a configured range value such as `"^"` or `""`
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "<" => Some(SemverRange::Lt),
            "<=" => Some(SemverRange::Lte),
            "" => Some(SemverRange::Exact),
            ".x" => Some(SemverRange::Loose),
            "~" => Some(SemverRange::Tilde),
            "^" => Some(SemverRange::Caret),
            ">=" => Some(SemverRange::Gte),
            ">" => Some(SemverRange::Gt),
            "*" => Some(SemverRange::Any),
            _ => None,
        }
    }

    /// Returns the configuration spelling of this range
    pub fn as_str(&self) -> &'static str {
        match self {
            SemverRange::Lt => "<",
            SemverRange::Lte => "<=",
            SemverRange::Exact => "",
            SemverRange::Loose => ".x",
            SemverRange::Tilde => "~",
            SemverRange::Caret => "^",
            SemverRange::Gte => ">=",
            SemverRange::Gt => ">",
            SemverRange::Any => "*",
        }
    }

    /// Detects the range used by a simple semver string such as `~1.2.3`
    pub fn of(semver: &str) -> Option<Self> {
        let trimmed = semver.trim();
        if trimmed == "*" {
            return Some(SemverRange::Any);
        }
        let caps = SIMPLE_SEMVER_RE.captures(trimmed)?;
        Some(match caps.get(1).map(|m| m.as_str()) {
            Some("^") => SemverRange::Caret,
            Some("~") => SemverRange::Tilde,
            Some(">=") => SemverRange::Gte,
            Some(">") => SemverRange::Gt,
            Some("<=") => SemverRange::Lte,
            Some("<") => SemverRange::Lt,
            _ => SemverRange::Exact,
        })
    }

    /// How many versions this range admits relative to the others, used to
    /// break ties between specifiers sharing the same version
    pub fn greediness(&self) -> u8 {
        match self {
            SemverRange::Lt => 0,
            SemverRange::Lte => 1,
            SemverRange::Exact => 2,
            SemverRange::Loose => 3,
            SemverRange::Tilde => 4,
            SemverRange::Caret => 5,
            SemverRange::Gte => 6,
            SemverRange::Gt => 7,
            SemverRange::Any => 8,
        }
    }

    /// Re-serializes a simple semver string with this range.
    ///
    /// Returns `None` when `semver` is not a plain `x.y.z` version with at most
    /// one range operator; complex ranges are left for the caller to keep as-is.
    pub fn apply(&self, semver: &str) -> Option<String> {
        let caps = SIMPLE_SEMVER_RE.captures(semver.trim())?;
        let major = caps.get(2)?.as_str();
        let minor = caps.get(3)?.as_str();
        let patch = caps.get(4)?.as_str();
        let suffix = caps.get(5).map(|m| m.as_str()).unwrap_or_default();

        Some(match self {
            SemverRange::Any => "*".to_string(),
            SemverRange::Loose => format!("{}.x.x", major),
            _ => format!("{}{}.{}.{}{}", self.as_str(), major, minor, patch, suffix),
        })
    }
}

impl fmt::Display for SemverRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemverRange::Exact => write!(f, "exact"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

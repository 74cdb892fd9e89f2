//! Version specifiers found in package.json files
//!
//! Every raw dependency value is parsed into one [`Specifier`] variant:
//! - Exact: `1.2.3`
//! - Range: `^1.2.3`, `~1.2.3`, `>=1.0.0 <2.0.0`, `1.x`, `*`
//! - Tag: `latest`, `next`
//! - Alias: `npm:other@1.0.0`
//! - File / Url / Git: `file:../a`, `https://x.io/a.tgz`, `github:user/repo`
//! - WorkspaceProtocol: `workspace:*`, `workspace:~`, `workspace:^1.0.0`
//! - Unsupported: anything else
//!
//! Parsing never fails; values that cannot be understood become
//! [`Specifier::Unsupported`] and are reported rather than rejected.

pub mod range;

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::error::SpecifierError;
use range::VersionRange;

static EXACT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?(?:\+[0-9A-Za-z.-]+)?$").unwrap()
});
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][0-9A-Za-z._-]*$").unwrap());
static GIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:git\+|git://|github:|gitlab:|bitbucket:|gist:)|\.git(?:#.*)?$").unwrap()
});
static GIT_SHORTHAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][\w.-]*/[\w.-]+(?:#.+)?$").unwrap());
static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^https?://").unwrap());
static FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:file:|link:|portal:|\.{1,2}/|/|~/)").unwrap());

const WORKSPACE_PREFIX: &str = "workspace:";
const ALIAS_PREFIX: &str = "npm:";

/// Version used in place of a workspace reference that cannot be resolved
pub const FALLBACK_SEMVER: &str = "0.0.0";

/// A parsed dependency version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Specifier {
    /// `1.2.3`
    Exact { raw: String },
    /// Any npm range other than an exact version
    Range { raw: String },
    /// A dist-tag such as `latest`
    Tag { raw: String },
    /// `npm:<name>@<version>`
    Alias {
        raw: String,
        name: String,
        version: Option<String>,
    },
    /// A local path
    File { raw: String },
    /// A tarball URL
    Url { raw: String },
    /// A git repository
    Git { raw: String },
    /// `workspace:<semver>`
    WorkspaceProtocol { raw: String, semver: String },
    /// Anything not recognised
    Unsupported { raw: String },
}

impl Specifier {
    /// Parses a raw version string
    pub fn parse(raw: &str) -> Self {
        let owned = raw.to_string();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Specifier::Unsupported { raw: owned };
        }

        if let Some(semver) = trimmed.strip_prefix(WORKSPACE_PREFIX) {
            return Specifier::WorkspaceProtocol {
                raw: owned,
                semver: semver.to_string(),
            };
        }

        if let Some(rest) = trimmed.strip_prefix(ALIAS_PREFIX) {
            // scoped names start with '@', so only look for a separator after it
            let (name, version) = match rest.get(1..).and_then(|tail| tail.rfind('@')) {
                Some(at) => (&rest[..at + 1], Some(rest[at + 2..].to_string())),
                None => (rest, None),
            };
            if name.is_empty() {
                return Specifier::Unsupported { raw: owned };
            }
            return Specifier::Alias {
                raw: owned,
                name: name.to_string(),
                version,
            };
        }

        if GIT_RE.is_match(trimmed) {
            return Specifier::Git { raw: owned };
        }

        if URL_RE.is_match(trimmed) {
            return Specifier::Url { raw: owned };
        }

        if FILE_RE.is_match(trimmed) {
            return Specifier::File { raw: owned };
        }

        if EXACT_RE.is_match(trimmed) {
            return Specifier::Exact { raw: owned };
        }

        if VersionRange::parse(trimmed).is_some() {
            return Specifier::Range { raw: owned };
        }

        if GIT_SHORTHAND_RE.is_match(trimmed) {
            return Specifier::Git { raw: owned };
        }

        if TAG_RE.is_match(trimmed) {
            return Specifier::Tag { raw: owned };
        }

        Specifier::Unsupported { raw: owned }
    }

    /// The string exactly as written in the manifest
    pub fn raw(&self) -> &str {
        match self {
            Specifier::Exact { raw }
            | Specifier::Range { raw }
            | Specifier::Tag { raw }
            | Specifier::Alias { raw, .. }
            | Specifier::File { raw }
            | Specifier::Url { raw }
            | Specifier::Git { raw }
            | Specifier::WorkspaceProtocol { raw, .. }
            | Specifier::Unsupported { raw } => raw,
        }
    }

    /// A short name for the variant, used in output
    pub fn kind(&self) -> &'static str {
        match self {
            Specifier::Exact { .. } => "exact",
            Specifier::Range { .. } => "range",
            Specifier::Tag { .. } => "tag",
            Specifier::Alias { .. } => "alias",
            Specifier::File { .. } => "file",
            Specifier::Url { .. } => "url",
            Specifier::Git { .. } => "git",
            Specifier::WorkspaceProtocol { .. } => "workspace-protocol",
            Specifier::Unsupported { .. } => "unsupported",
        }
    }

    /// Returns the semver portion of this specifier.
    ///
    /// Fails with [`SpecifierError::NotSemver`] for tags, paths, URLs, git
    /// references, unsupported values and aliases without a semver version.
    pub fn get_semver(&self) -> Result<String, SpecifierError> {
        match self {
            Specifier::Exact { raw } | Specifier::Range { raw } => Ok(raw.trim().to_string()),
            Specifier::Alias {
                version: Some(version),
                ..
            } if VersionRange::parse(version).is_some() => Ok(version.clone()),
            Specifier::WorkspaceProtocol { semver, .. } => Ok(semver.clone()),
            _ => Err(SpecifierError::not_semver(self.raw())),
        }
    }

    /// Returns a new specifier of the same kind carrying `semver` instead.
    ///
    /// Aliases keep their `npm:<name>@` wrapper and workspace references keep
    /// their `workspace:` prefix. Fails for variants which cannot hold semver.
    pub fn set_semver(&self, semver: &str) -> Result<Specifier, SpecifierError> {
        match self {
            Specifier::Exact { .. } | Specifier::Range { .. } => Ok(Specifier::parse(semver)),
            Specifier::Alias { name, .. } => {
                Ok(Specifier::parse(&format!("{}{}@{}", ALIAS_PREFIX, name, semver)))
            }
            Specifier::WorkspaceProtocol { .. } => {
                Ok(Specifier::parse(&format!("{}{}", WORKSPACE_PREFIX, semver)))
            }
            _ => Err(SpecifierError::not_semver(self.raw())),
        }
    }

    /// Returns a real semver value usable for comparisons and sorting.
    ///
    /// Workspace references resolve against `local_version`, the version of the
    /// local package they point at: `workspace:*` is `*`, `workspace:~` and
    /// `workspace:^` become `~<version>` / `^<version>`. Anything that cannot be
    /// resolved degrades to `0.0.0`. The result is never written back.
    pub fn semver_equivalent(&self, local_version: Option<&str>) -> String {
        match self {
            Specifier::WorkspaceProtocol { semver, .. } => match semver.as_str() {
                "*" => "*".to_string(),
                "~" | "^" => local_version
                    .filter(|v| EXACT_RE.is_match(v))
                    .map(|v| format!("{}{}", semver, v))
                    .unwrap_or_else(|| FALLBACK_SEMVER.to_string()),
                other if VersionRange::parse(other).is_some() => other.to_string(),
                _ => FALLBACK_SEMVER.to_string(),
            },
            other => other
                .get_semver()
                .unwrap_or_else(|_| FALLBACK_SEMVER.to_string()),
        }
    }

    /// Returns true if this specifier carries a semver value
    pub fn is_semver(&self) -> bool {
        self.get_semver().is_ok()
    }

    /// Returns true for `workspace:` references
    pub fn is_workspace_protocol(&self) -> bool {
        matches!(self, Specifier::WorkspaceProtocol { .. })
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw())
    }
}

//! npm range arithmetic
//!
//! Desugars npm range syntax into unions of version intervals so that ranges
//! can be intersected and ordered:
//! - `1.2.3`, `=1.2.3`, `v1.2.3` - exact
//! - `^1.2.3`, `~1.2.3` - caret / tilde
//! - `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3` - comparators
//! - `*`, `1.x`, `1.2.*`, `1` - x-ranges
//! - `1.0.0 - 2.0.0` - hyphen ranges
//! - `>=1.0.0 <2.0.0` - comparator sets, `^1 || ^2` - unions
//!
//! Parsing is loose: leading `v`/`=` and whitespace after an operator are
//! accepted.

use regex::Regex;
use semver::{BuildMetadata, Prerelease, Version};
use std::cmp::Ordering;
use std::sync::LazyLock;

use crate::domain::SemverRange;

static OPERATOR_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(<=|>=|<|>|=|\^|~>?)\s+").unwrap());
static COMPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(<=|>=|<|>|=|\^|~>?)?=?v?(\d+|[xX*])(?:\.(\d+|[xX*]))?(?:\.(\d+|[xX*]))?(?:-([0-9A-Za-z.-]+))?(?:\+[0-9A-Za-z.-]+)?$",
    )
    .unwrap()
});

/// One end of an interval
#[derive(Debug, Clone, PartialEq, Eq)]
struct Bound {
    version: Version,
    inclusive: bool,
}

/// A contiguous run of versions; `None` means unbounded on that side
#[derive(Debug, Clone, PartialEq, Eq)]
struct Interval {
    lower: Option<Bound>,
    upper: Option<Bound>,
}

/// A parsed npm range: the union of its intervals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    intervals: Vec<Interval>,
}

/// A version where any component may be a wildcard
#[derive(Debug, Clone)]
struct Partial {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    pre: Prerelease,
}

impl Interval {
    fn any() -> Self {
        Self {
            lower: None,
            upper: None,
        }
    }

    fn empty() -> Self {
        let zero = Version::new(0, 0, 0);
        Self {
            lower: Some(Bound {
                version: zero.clone(),
                inclusive: false,
            }),
            upper: Some(Bound {
                version: zero,
                inclusive: false,
            }),
        }
    }

    fn from(lower: Version, upper: Option<Version>) -> Self {
        Self {
            lower: Some(Bound {
                version: lower,
                inclusive: true,
            }),
            upper: upper.map(|version| Bound {
                version,
                inclusive: false,
            }),
        }
    }

    fn below(upper: Version, inclusive: bool) -> Self {
        Self {
            lower: None,
            upper: Some(Bound {
                version: upper,
                inclusive,
            }),
        }
    }

    fn is_empty(&self) -> bool {
        match (&self.lower, &self.upper) {
            (Some(lo), Some(hi)) => match lo.version.cmp(&hi.version) {
                Ordering::Greater => true,
                Ordering::Equal => !(lo.inclusive && hi.inclusive),
                Ordering::Less => false,
            },
            _ => false,
        }
    }

    fn intersect(&self, other: &Interval) -> Interval {
        let lower = match (&self.lower, &other.lower) {
            (None, b) | (b, None) => b.clone(),
            (Some(a), Some(b)) => Some(match a.version.cmp(&b.version) {
                Ordering::Greater => a.clone(),
                Ordering::Less => b.clone(),
                Ordering::Equal => Bound {
                    version: a.version.clone(),
                    inclusive: a.inclusive && b.inclusive,
                },
            }),
        };
        let upper = match (&self.upper, &other.upper) {
            (None, b) | (b, None) => b.clone(),
            (Some(a), Some(b)) => Some(match a.version.cmp(&b.version) {
                Ordering::Less => a.clone(),
                Ordering::Greater => b.clone(),
                Ordering::Equal => Bound {
                    version: a.version.clone(),
                    inclusive: a.inclusive && b.inclusive,
                },
            }),
        };
        Interval { lower, upper }
    }

    fn contains(&self, version: &Version) -> bool {
        let above = match &self.lower {
            None => true,
            Some(b) if b.inclusive => version >= &b.version,
            Some(b) => version > &b.version,
        };
        let below = match &self.upper {
            None => true,
            Some(b) if b.inclusive => version <= &b.version,
            Some(b) => version < &b.version,
        };
        above && below
    }
}

impl Partial {
    fn parse(major: &str, minor: Option<&str>, patch: Option<&str>, pre: Option<&str>) -> Option<Self> {
        let number = |s: Option<&str>| -> Option<Option<u64>> {
            match s {
                None => Some(None),
                Some(v) if v.eq_ignore_ascii_case("x") || v == "*" => Some(None),
                Some(v) => v.parse().ok().map(Some),
            }
        };
        let major = number(Some(major))?;
        let mut minor = number(minor)?;
        let mut patch = number(patch)?;
        // components after a wildcard are wildcards too
        if major.is_none() {
            minor = None;
        }
        if minor.is_none() {
            patch = None;
        }
        let pre = match pre {
            Some(p) if patch.is_some() => Prerelease::new(p).ok()?,
            _ => Prerelease::EMPTY,
        };
        Some(Self {
            major,
            minor,
            patch,
            pre,
        })
    }

    /// The version with wildcards filled by zero
    fn floor(&self) -> Version {
        Version {
            major: self.major.unwrap_or(0),
            minor: self.minor.unwrap_or(0),
            patch: self.patch.unwrap_or(0),
            pre: self.pre.clone(),
            build: BuildMetadata::EMPTY,
        }
    }

    /// The first version past the last one matched by the wildcard part
    fn ceiling(&self) -> Option<Version> {
        match (self.major, self.minor, self.patch) {
            (None, _, _) => None,
            (Some(major), None, _) => Some(Version::new(major + 1, 0, 0)),
            (Some(major), Some(minor), None) => Some(Version::new(major, minor + 1, 0)),
            (Some(_), Some(_), Some(_)) => None,
        }
    }

    fn is_full(&self) -> bool {
        self.patch.is_some()
    }
}

/// Desugars a single comparator such as `^1.2` into an interval
fn comparator_interval(op: &str, partial: &Partial) -> Interval {
    if partial.major.is_none() {
        return match op {
            "<" | ">" => Interval::empty(),
            _ => Interval::any(),
        };
    }
    let floor = partial.floor();
    match op {
        "" | "=" => {
            if partial.is_full() {
                Interval {
                    lower: Some(Bound {
                        version: floor.clone(),
                        inclusive: true,
                    }),
                    upper: Some(Bound {
                        version: floor,
                        inclusive: true,
                    }),
                }
            } else {
                Interval::from(floor, partial.ceiling())
            }
        }
        "^" => {
            let major = floor.major;
            let upper = match (major, partial.minor, partial.patch) {
                (0, None, _) => Version::new(1, 0, 0),
                (0, Some(0), None) => Version::new(0, 1, 0),
                (0, Some(0), Some(patch)) => Version::new(0, 0, patch + 1),
                (0, Some(minor), _) => Version::new(0, minor + 1, 0),
                _ => Version::new(major + 1, 0, 0),
            };
            Interval::from(floor, Some(upper))
        }
        "~" | "~>" => {
            let upper = match partial.minor {
                None => Version::new(floor.major + 1, 0, 0),
                Some(minor) => Version::new(floor.major, minor + 1, 0),
            };
            Interval::from(floor, Some(upper))
        }
        ">" => match partial.ceiling() {
            Some(ceiling) => Interval::from(ceiling, None),
            None => Interval {
                lower: Some(Bound {
                    version: floor,
                    inclusive: false,
                }),
                upper: None,
            },
        },
        ">=" => Interval::from(floor, None),
        "<" => Interval::below(floor, false),
        "<=" => match partial.ceiling() {
            Some(ceiling) => Interval::below(ceiling, false),
            None => Interval::below(floor, true),
        },
        _ => Interval::empty(),
    }
}

fn parse_comparator(token: &str) -> Option<(String, Partial)> {
    let caps = COMPARATOR_RE.captures(token)?;
    let op = caps.get(1).map(|m| m.as_str()).unwrap_or_default().to_string();
    let partial = Partial::parse(
        caps.get(2)?.as_str(),
        caps.get(3).map(|m| m.as_str()),
        caps.get(4).map(|m| m.as_str()),
        caps.get(5).map(|m| m.as_str()),
    )?;
    Some((op, partial))
}

/// Parses one `||`-separated alternative into a single interval
fn parse_alternative(alternative: &str) -> Option<Interval> {
    let alternative = alternative.trim();
    if alternative.is_empty() || alternative == "*" {
        return Some(Interval::any());
    }

    if let Some((from, to)) = alternative.split_once(" - ") {
        let (from_op, from) = parse_comparator(from.trim())?;
        let (to_op, to) = parse_comparator(to.trim())?;
        if !from_op.is_empty() || !to_op.is_empty() {
            return None;
        }
        let upper = match to.ceiling() {
            Some(ceiling) => Interval::below(ceiling, false),
            None if to.major.is_none() => Interval::any(),
            None => Interval::below(to.floor(), true),
        };
        return Some(Interval::from(from.floor(), None).intersect(&upper));
    }

    let normalized = OPERATOR_SPACE_RE.replace_all(alternative, "$1");
    let mut interval = Interval::any();
    for token in normalized.split_whitespace() {
        let (op, partial) = parse_comparator(token)?;
        interval = interval.intersect(&comparator_interval(&op, &partial));
    }
    Some(interval)
}

impl VersionRange {
    /// Parses an npm range, returning `None` for anything that is not one
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let intervals = raw
            .split("||")
            .map(parse_alternative)
            .collect::<Option<Vec<_>>>()?;
        Some(Self { intervals })
    }

    /// Whether any version satisfies both ranges
    pub fn intersects(&self, other: &VersionRange) -> bool {
        self.intervals.iter().any(|a| {
            other
                .intervals
                .iter()
                .any(|b| !a.intersect(b).is_empty())
        })
    }

    /// Whether `version` is admitted by this range
    pub fn satisfies(&self, version: &Version) -> bool {
        self.intervals.iter().any(|i| !i.is_empty() && i.contains(version))
    }

    /// The lowest version admitted, `0.0.0` for ranges unbounded below
    pub fn min_version(&self) -> Option<Version> {
        self.intervals
            .iter()
            .filter(|i| !i.is_empty())
            .map(|i| match &i.lower {
                Some(b) => b.version.clone(),
                None => Version::new(0, 0, 0),
            })
            .min()
    }
}

/// Whether two npm ranges admit at least one common version; unparsable input
/// never intersects
pub fn intersects(a: &str, b: &str) -> bool {
    match (VersionRange::parse(a), VersionRange::parse(b)) {
        (Some(a), Some(b)) => a.intersects(&b),
        _ => false,
    }
}

/// Orders two semver strings by the lowest version they admit, then by how
/// greedy their range is. `*` sorts above everything else.
pub fn compare(a: &str, b: &str) -> Option<Ordering> {
    Some(sort_key(a)?.cmp(&sort_key(b)?))
}

/// Returns true if `semver` can be ordered by [`compare`]
pub fn is_comparable(semver: &str) -> bool {
    sort_key(semver).is_some()
}

fn sort_key(semver: &str) -> Option<(bool, Version, u8)> {
    let semver = semver.trim();
    if semver == "*" {
        return Some((true, Version::new(0, 0, 0), SemverRange::Any.greediness()));
    }
    let min = VersionRange::parse(semver)?.min_version()?;
    let greediness = SemverRange::of(semver)
        .unwrap_or(SemverRange::Exact)
        .greediness();
    Some((false, min, greediness))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn range(s: &str) -> VersionRange {
        VersionRange::parse(s).unwrap()
    }

    #[test]
    fn test_caret_satisfies() {
        assert!(range("^1.2.3").satisfies(&v("1.9.0")));
        assert!(!range("^1.2.3").satisfies(&v("2.0.0")));
        assert!(range("^0.2.3").satisfies(&v("0.2.9")));
        assert!(!range("^0.2.3").satisfies(&v("0.3.0")));
        assert!(range("^0.0.3").satisfies(&v("0.0.3")));
        assert!(!range("^0.0.3").satisfies(&v("0.0.4")));
    }

    #[test]
    fn test_tilde_satisfies() {
        assert!(range("~1.2.3").satisfies(&v("1.2.9")));
        assert!(!range("~1.2.3").satisfies(&v("1.3.0")));
        assert!(range("~1").satisfies(&v("1.9.9")));
    }

    #[test]
    fn test_x_ranges() {
        assert!(range("1.x").satisfies(&v("1.5.0")));
        assert!(!range("1.x").satisfies(&v("2.0.0")));
        assert!(range("1.2.*").satisfies(&v("1.2.7")));
        assert!(range("*").satisfies(&v("99.0.0")));
        assert!(range("1").satisfies(&v("1.0.1")));
    }

    #[test]
    fn test_comparator_partials() {
        assert!(range(">1").satisfies(&v("2.0.0")));
        assert!(!range(">1").satisfies(&v("1.9.0")));
        assert!(range("<=1.2").satisfies(&v("1.2.9")));
        assert!(!range("<=1.2").satisfies(&v("1.3.0")));
        assert!(!range("<1.2.0").satisfies(&v("1.2.0")));
    }

    #[test]
    fn test_hyphen_range() {
        let r = range("1.0.0 - 2.0.0");
        assert!(r.satisfies(&v("1.0.0")));
        assert!(r.satisfies(&v("2.0.0")));
        assert!(!r.satisfies(&v("2.0.1")));
        assert!(range("1.0.0 - 2").satisfies(&v("2.9.0")));
    }

    #[test]
    fn test_comparator_set_and_union() {
        let r = range(">=1.0.0 <2.0.0");
        assert!(r.satisfies(&v("1.5.0")));
        assert!(!r.satisfies(&v("2.0.0")));

        let u = range("^1.0.0 || ^3.0.0");
        assert!(u.satisfies(&v("3.1.0")));
        assert!(!u.satisfies(&v("2.1.0")));
    }

    #[test]
    fn test_loose_parsing() {
        assert!(range("v1.2.3").satisfies(&v("1.2.3")));
        assert!(range(">= 1.2.3").satisfies(&v("1.4.0")));
        assert!(range("=1.2.3").satisfies(&v("1.2.3")));
    }

    #[test]
    fn test_rejects_non_ranges() {
        assert!(VersionRange::parse("latest").is_none());
        assert!(VersionRange::parse("").is_none());
        assert!(VersionRange::parse("workspace:*").is_none());
        assert!(VersionRange::parse("1.2.3.4").is_none());
    }

    #[test]
    fn test_intersects() {
        assert!(intersects("^1.2.0", "^1.5.0"));
        assert!(!intersects("^1.2.0", "^2.0.0"));
        assert!(intersects(">=1.0.0", "<1.0.1"));
        assert!(!intersects("<1.0.0", ">=1.0.0"));
        assert!(intersects("*", "^9.0.0"));
        assert!(intersects("1.2.3", "~1.2.0"));
        assert!(!intersects("1.2.3", "latest"));
    }

    #[test]
    fn test_intersects_is_symmetric() {
        for (a, b) in [("^1.0.0", "~1.4.2"), ("1.x", ">=2.0.0"), ("^0.1.0", "0.1.5")] {
            assert_eq!(intersects(a, b), intersects(b, a));
        }
    }

    #[test]
    fn test_min_version() {
        assert_eq!(range("^1.2.3").min_version(), Some(v("1.2.3")));
        assert_eq!(range("<2.0.0").min_version(), Some(v("0.0.0")));
        assert_eq!(range("^3.0.0 || ^1.0.0").min_version(), Some(v("1.0.0")));
    }

    #[test]
    fn test_compare_by_version_then_greediness() {
        assert_eq!(compare("1.0.0", "2.0.0"), Some(Ordering::Less));
        assert_eq!(compare("^1.0.0", "1.0.0"), Some(Ordering::Greater));
        assert_eq!(compare("~1.0.0", "^1.0.0"), Some(Ordering::Less));
        assert_eq!(compare("*", "^99.0.0"), Some(Ordering::Greater));
        assert_eq!(compare("0.0.0", "0.0.1"), Some(Ordering::Less));
        assert_eq!(compare("latest", "1.0.0"), None);
    }

    #[test]
    fn test_is_comparable() {
        assert!(is_comparable("^1.0.0"));
        assert!(is_comparable("*"));
        assert!(!is_comparable("latest"));
        assert!(!is_comparable(">2.0.0 <1.0.0"));
    }
}

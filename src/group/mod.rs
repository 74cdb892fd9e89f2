//! Group selectors and instance-to-group assignment
//!
//! Every instance belongs to exactly one semver group and one version group:
//! the first group, in declaration order, whose selector matches it. The last
//! group of each list is a catch-all that matches everything.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::domain::{Instance, InstanceId};

/// Matches dependencies which are themselves packages in the repository
pub const LOCAL_PATTERN: &str = "$LOCAL";

/// Glob patterns over names, with `!` negations
#[derive(Debug, Clone, Default)]
struct NamePatterns {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
    include_local: bool,
}

impl NamePatterns {
    fn new(key: &str, patterns: Option<&[String]>, allow_local: bool) -> Result<Self, String> {
        let Some(patterns) = patterns else {
            return Ok(Self::default());
        };
        if patterns.is_empty() {
            return Err(format!("\"{}\" must not be empty", key));
        }

        let mut include = GlobSetBuilder::new();
        let mut exclude = GlobSetBuilder::new();
        let (mut has_include, mut has_exclude, mut include_local) = (false, false, false);

        for pattern in patterns {
            if pattern.trim().is_empty() {
                return Err(format!("\"{}\" contains an empty pattern", key));
            }
            if allow_local && pattern == LOCAL_PATTERN {
                include_local = true;
                continue;
            }
            let (negated, glob) = match pattern.strip_prefix('!') {
                Some(glob) => (true, glob),
                None => (false, pattern.as_str()),
            };
            let glob = GlobBuilder::new(glob)
                .literal_separator(true)
                .build()
                .map_err(|e| format!("invalid pattern '{}' in \"{}\": {}", pattern, key, e))?;
            if negated {
                exclude.add(glob);
                has_exclude = true;
            } else {
                include.add(glob);
                has_include = true;
            }
        }

        let build = |builder: GlobSetBuilder| {
            builder
                .build()
                .map_err(|e| format!("invalid patterns in \"{}\": {}", key, e))
        };
        Ok(Self {
            include: if has_include { Some(build(include)?) } else { None },
            exclude: if has_exclude { Some(build(exclude)?) } else { None },
            include_local,
        })
    }

    fn matches(&self, name: &str, is_local: bool) -> bool {
        let included = match (&self.include, self.include_local) {
            (None, false) => true,
            (include, local) => {
                (local && is_local) || include.as_ref().is_some_and(|set| set.is_match(name))
            }
        };
        included && !self.exclude.as_ref().is_some_and(|set| set.is_match(name))
    }
}

/// Which instances a group applies to.
///
/// All given criteria must match. A missing criterion matches anything.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    dependencies: NamePatterns,
    packages: NamePatterns,
    dependency_types: Vec<String>,
}

impl Selector {
    /// Builds a selector, returning a message describing the first problem found
    pub fn new(
        dependencies: Option<&[String]>,
        packages: Option<&[String]>,
        dependency_types: Option<&[String]>,
    ) -> Result<Self, String> {
        if let Some(types) = dependency_types {
            if types.iter().any(|t| t.trim().is_empty()) {
                return Err("\"dependencyTypes\" contains an empty name".to_string());
            }
        }
        Ok(Self {
            dependencies: NamePatterns::new("dependencies", dependencies, true)?,
            packages: NamePatterns::new("packages", packages, false)?,
            dependency_types: dependency_types.map(<[String]>::to_vec).unwrap_or_default(),
        })
    }

    /// A selector matching every instance
    pub fn any() -> Self {
        Self::default()
    }

    /// Returns true if the selector applies to `instance`.
    ///
    /// `is_local` tells whether a dependency name is a package of this repository.
    pub fn matches(&self, instance: &Instance, is_local: &dyn Fn(&str) -> bool) -> bool {
        self.dependencies
            .matches(&instance.name, is_local(&instance.name))
            && self.packages.matches(&instance.package_name, false)
            && self.matches_type(&instance.dependency_type.name)
    }

    fn matches_type(&self, type_name: &str) -> bool {
        let (excluded, included): (Vec<&String>, Vec<&String>) = self
            .dependency_types
            .iter()
            .partition(|t| t.starts_with('!'));
        let is_included = included.is_empty() || included.iter().any(|t| *t == type_name);
        let is_excluded = excluded.iter().any(|t| &t[1..] == type_name);
        is_included && !is_excluded
    }
}

/// Index of the semver group and version group of every instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    semver_groups: Vec<usize>,
    version_groups: Vec<usize>,
}

impl Assignment {
    /// Index of the semver group of an instance
    pub fn semver_group(&self, id: InstanceId) -> usize {
        self.semver_groups[id.0]
    }

    /// Index of the version group of an instance
    pub fn version_group(&self, id: InstanceId) -> usize {
        self.version_groups[id.0]
    }

    /// Instances of a semver group, in instance order
    pub fn semver_group_members(&self, group: usize) -> Vec<InstanceId> {
        members(&self.semver_groups, group)
    }

    /// Instances of a version group, in instance order
    pub fn version_group_members(&self, group: usize) -> Vec<InstanceId> {
        members(&self.version_groups, group)
    }
}

fn members(assigned: &[usize], group: usize) -> Vec<InstanceId> {
    assigned
        .iter()
        .enumerate()
        .filter(|(_, g)| **g == group)
        .map(|(i, _)| InstanceId(i))
        .collect()
}

/// Index of the first selector matching `instance`, defaulting to the last one
fn first_match(
    selectors: &[&Selector],
    instance: &Instance,
    is_local: &dyn Fn(&str) -> bool,
) -> usize {
    selectors
        .iter()
        .position(|selector| selector.matches(instance, is_local))
        .unwrap_or(selectors.len().saturating_sub(1))
}

/// Assigns every instance to its semver group and version group.
///
/// `instances` must be indexed by their [`InstanceId`].
pub fn assign(
    instances: &[Instance],
    semver_selectors: &[&Selector],
    version_selectors: &[&Selector],
    is_local: &dyn Fn(&str) -> bool,
) -> Assignment {
    let mut assignment = Assignment::default();
    for instance in instances {
        let semver_group = first_match(semver_selectors, instance, is_local);
        let version_group = first_match(version_selectors, instance, is_local);
        debug!(
            "{} -> semver group {}, version group {}",
            instance, semver_group, version_group
        );
        assignment.semver_groups.push(semver_group);
        assignment.version_groups.push(version_group);
    }
    assignment
}

//! Version groups: which version matching instances must converge on
//!
//! Instances of a group are inspected per dependency name. Each policy lives
//! in its own module:
//! - standard: one shared version, the local package's or the highest/lowest
//! - same_range: every range must intersect every other
//! - pinned: one configured version
//! - snapped_to: the version used by designated packages

mod pinned;
mod same_range;
mod snapped_to;
mod standard;

use std::collections::BTreeMap;

use crate::config::VersionGroupConfig;
use crate::context::Context;
use crate::domain::{Instance, InstanceId};
use crate::error::ConfigError;
use crate::group::Selector;
use crate::report::Report;

/// Value of `policy` selecting the same-range policy
const SAME_RANGE_POLICY: &str = "sameRange";

/// Which version the standard policy converges on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreferVersion {
    #[default]
    HighestSemver,
    LowestSemver,
}

impl PreferVersion {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "highestSemver" => Some(PreferVersion::HighestSemver),
            "lowestSemver" => Some(PreferVersion::LowestSemver),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PreferVersion::HighestSemver => "highestSemver",
            PreferVersion::LowestSemver => "lowestSemver",
        }
    }
}

/// The policy of a version group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionGroupKind {
    /// Anything goes
    Ignored,
    /// Every instance must use this version
    Pinned { pin: String },
    /// The dependency must not be used at all
    Banned,
    /// Every instance must use the version found in one of these packages
    SnappedTo { packages: Vec<String> },
    /// Every range must intersect every other
    SameRange,
    /// Every instance must use the same version
    Standard { prefer: PreferVersion },
}

impl VersionGroupKind {
    /// Short name used in output
    pub fn name(&self) -> &'static str {
        match self {
            VersionGroupKind::Ignored => "ignored",
            VersionGroupKind::Pinned { .. } => "pinned",
            VersionGroupKind::Banned => "banned",
            VersionGroupKind::SnappedTo { .. } => "snapped-to",
            VersionGroupKind::SameRange => "same-range",
            VersionGroupKind::Standard { .. } => "standard",
        }
    }
}

/// A configured version group
#[derive(Debug, Clone)]
pub struct VersionGroup {
    pub label: Option<String>,
    pub selector: Selector,
    pub kind: VersionGroupKind,
    /// Whether this is the implicit group matching everything left over
    pub is_catch_all: bool,
}

/// Reports of every instance of one dependency name within one version group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyReports {
    /// Index of the version group
    pub group: usize,
    /// Dependency name
    pub name: String,
    /// One report per instance
    pub reports: Vec<Report>,
}

impl DependencyReports {
    /// Returns true if any instance mismatches
    pub fn has_mismatch(&self) -> bool {
        self.reports.iter().any(Report::is_mismatch)
    }
}

impl VersionGroup {
    /// Validates the `index`th entry of `versionGroups`
    pub fn from_config(index: usize, config: &VersionGroupConfig) -> Result<Self, ConfigError> {
        let error = |message: String| ConfigError::VersionGroup { index, message };

        let selector = Selector::new(
            config.dependencies.as_deref(),
            config.packages.as_deref(),
            config.dependency_types.as_deref(),
        )
        .map_err(error)?;

        let mut policies = Vec::new();
        if config.is_ignored == Some(true) {
            policies.push(VersionGroupKind::Ignored);
        }
        if let Some(pin) = &config.pin_version {
            if pin.trim().is_empty() {
                return Err(error("\"pinVersion\" must not be empty".to_string()));
            }
            policies.push(VersionGroupKind::Pinned { pin: pin.clone() });
        }
        if config.is_banned == Some(true) {
            policies.push(VersionGroupKind::Banned);
        }
        if let Some(packages) = &config.snap_to {
            if packages.is_empty() || packages.iter().any(|p| p.trim().is_empty()) {
                return Err(error("\"snapTo\" must list package names".to_string()));
            }
            policies.push(VersionGroupKind::SnappedTo {
                packages: packages.clone(),
            });
        }
        if let Some(policy) = &config.policy {
            if policy != SAME_RANGE_POLICY {
                return Err(error(format!(
                    "unknown policy '{}', expected \"{}\"",
                    policy, SAME_RANGE_POLICY
                )));
            }
            policies.push(VersionGroupKind::SameRange);
        }

        let prefer = match config.prefer_version.as_deref() {
            Some(value) => Some(PreferVersion::parse(value).ok_or_else(|| {
                error(format!(
                    "invalid preferVersion '{}', expected \"highestSemver\" or \"lowestSemver\"",
                    value
                ))
            })?),
            None => None,
        };

        let kind = match (policies.len(), prefer) {
            (0, prefer) => VersionGroupKind::Standard {
                prefer: prefer.unwrap_or_default(),
            },
            (1, None) => policies.remove(0),
            (1, Some(_)) => {
                return Err(error(format!(
                    "\"preferVersion\" cannot be used with a {} group",
                    policies[0].name()
                )))
            }
            _ => {
                let names: Vec<&str> = policies.iter().map(VersionGroupKind::name).collect();
                return Err(error(format!(
                    "only one policy may be used, found {}",
                    names.join(", ")
                )));
            }
        };

        Ok(Self {
            label: config.label.clone(),
            selector,
            kind,
            is_catch_all: false,
        })
    }

    /// The group of instances not matched by any configured group
    pub fn catch_all() -> Self {
        Self {
            label: None,
            selector: Selector::any(),
            kind: VersionGroupKind::Standard {
                prefer: PreferVersion::HighestSemver,
            },
            is_catch_all: true,
        }
    }

    /// Inspects the members of this group, which is the `index`th group.
    ///
    /// Returns one entry per dependency name, sorted by name.
    pub fn inspect_all(
        &self,
        index: usize,
        members: &[InstanceId],
        ctx: &Context,
    ) -> Vec<DependencyReports> {
        let mut by_name: BTreeMap<&str, Vec<&Instance>> = BTreeMap::new();
        for id in members {
            let instance = ctx.instance(*id);
            by_name.entry(instance.name.as_str()).or_default().push(instance);
        }

        by_name
            .into_iter()
            .map(|(name, instances)| DependencyReports {
                group: index,
                name: name.to_string(),
                reports: self.inspect_dependency(&instances, ctx),
            })
            .collect()
    }

    /// Inspects every instance of one dependency name, in order
    fn inspect_dependency(&self, instances: &[&Instance], ctx: &Context) -> Vec<Report> {
        match &self.kind {
            VersionGroupKind::Ignored => instances
                .iter()
                .map(|instance| Report::Valid {
                    instance: instance.id,
                    expected: None,
                })
                .collect(),
            VersionGroupKind::Banned => instances
                .iter()
                .map(|instance| Report::BannedMismatch {
                    instance: instance.id,
                })
                .collect(),
            VersionGroupKind::Pinned { pin } => pinned::inspect(pin, instances, ctx),
            VersionGroupKind::SnappedTo { packages } => {
                snapped_to::inspect(packages, instances, ctx)
            }
            VersionGroupKind::SameRange => same_range::inspect(instances, ctx),
            VersionGroupKind::Standard { prefer } => standard::inspect(*prefer, instances, ctx),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    use crate::config::{CliOverrides, Config, RcFile};
    use crate::context::Context;
    use crate::manifest::PackageJsonFile;
    use crate::report::Report;

    /// Builds a context from an inline config and `(path, contents)` files
    pub fn context(config: &str, files: &[(&str, &str)]) -> Context {
        let rc_file: RcFile = serde_json::from_str(config).unwrap();
        let cli = CliOverrides {
            source: vec!["package.json".to_string()],
            ..Default::default()
        };
        let config = Config::resolve(Path::new("/repo"), None, rc_file, &cli).unwrap();
        let files = files
            .iter()
            .map(|(path, text)| {
                PackageJsonFile::from_text(Path::new("/repo").join(path), *path, text).unwrap()
            })
            .collect();
        Context::new(config, files, Vec::new()).unwrap()
    }

    /// Reports of one dependency, paired with the package each instance is in
    pub fn reports_for<'a>(ctx: &'a Context, name: &str) -> Vec<(&'a str, Report)> {
        ctx.inspect_versions()
            .into_iter()
            .filter(|deps| deps.name == name)
            .flat_map(|deps| deps.reports)
            .map(|report| {
                let package = ctx.instance(report.instance()).package_name.as_str();
                (package, report)
            })
            .collect()
    }

    /// Status of every report of one dependency, paired with the package
    pub fn statuses<'a>(ctx: &'a Context, name: &str) -> Vec<(&'a str, &'static str)> {
        reports_for(ctx, name)
            .into_iter()
            .map(|(package, report)| (package, report.status()))
            .collect()
    }
}

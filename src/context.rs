//! Run context: loaded files, extracted instances and their groups
//!
//! Built once per run. Everything here is read-only during inspection; only
//! the file contents are mutated afterwards when fixes are applied.

use std::collections::HashMap;
use tracing::{debug, info};

use crate::config::{Config, DependencyType};
use crate::domain::{Instance, InstanceId};
use crate::error::{AppError, ConfigError, ManifestError, SpecifierError};
use crate::group::{self, Assignment, Selector};
use crate::manifest::{self, PackageJsonFile};
use crate::report::Report;
use crate::semver_group::SemverGroup;
use crate::specifier::Specifier;
use crate::version_group::{DependencyReports, VersionGroup};

/// Name-indexed views over files and instances, built once
#[derive(Debug, Clone, Default)]
pub struct Lookup {
    /// Own version of every named package in the repository
    local_versions: HashMap<String, Option<String>>,
    /// Instances declared by a package, keyed by (package name, dependency name)
    by_package: HashMap<(String, String), Vec<InstanceId>>,
}

impl Lookup {
    pub fn build(files: &[PackageJsonFile], instances: &[Instance]) -> Self {
        let mut lookup = Lookup::default();
        for file in files {
            if let Some(name) = file.name() {
                lookup
                    .local_versions
                    .insert(name.to_string(), file.version().map(String::from));
            }
        }
        for instance in instances {
            lookup
                .by_package
                .entry((instance.package_name.clone(), instance.name.clone()))
                .or_default()
                .push(instance.id);
        }
        lookup
    }

    /// Returns true if a package of this name exists in the repository
    pub fn is_local(&self, name: &str) -> bool {
        self.local_versions.contains_key(name)
    }

    /// The `version` of the local package of this name
    pub fn local_version(&self, name: &str) -> Option<&str> {
        self.local_versions.get(name).and_then(|v| v.as_deref())
    }

    /// Instances of `dependency` declared by `package`
    pub fn instances_of(&self, package: &str, dependency: &str) -> &[InstanceId] {
        self.by_package
            .get(&(package.to_string(), dependency.to_string()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Everything a command needs to inspect and fix a repository
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    /// Files that were read successfully, in path order
    pub files: Vec<PackageJsonFile>,
    /// Files that could not be read or parsed
    pub file_errors: Vec<ManifestError>,
    /// Every instance, indexed by [`InstanceId`]
    pub instances: Vec<Instance>,
    pub lookup: Lookup,
    /// Configured semver groups followed by the catch-all
    pub semver_groups: Vec<SemverGroup>,
    /// Configured version groups followed by the catch-all
    pub version_groups: Vec<VersionGroup>,
    pub assignment: Assignment,
}

impl Context {
    /// Discovers and reads the package.json files named by `config`
    pub fn load(config: Config) -> Result<Self, AppError> {
        let paths = manifest::discover_sources(&config.cwd, &config.sources)?;
        let (mut files, file_errors) = manifest::read_all(&paths, &config.cwd);
        if let Some(indent) = &config.indent {
            for file in &mut files {
                file.set_indent(indent.clone());
            }
        }
        info!("loaded {} package.json files", files.len());
        Ok(Self::new(config, files, file_errors)?)
    }

    /// Builds groups, extracts instances and assigns them to groups
    pub fn new(
        config: Config,
        files: Vec<PackageJsonFile>,
        file_errors: Vec<ManifestError>,
    ) -> Result<Self, ConfigError> {
        let mut semver_groups = config
            .rc_file
            .semver_groups
            .iter()
            .enumerate()
            .map(|(index, group)| SemverGroup::from_config(index, group))
            .collect::<Result<Vec<_>, _>>()?;
        semver_groups.push(SemverGroup::catch_all());

        let mut version_groups = config
            .rc_file
            .version_groups
            .iter()
            .enumerate()
            .map(|(index, group)| VersionGroup::from_config(index, group))
            .collect::<Result<Vec<_>, _>>()?;
        version_groups.push(VersionGroup::catch_all());

        let instances = extract_instances(&files, &config);
        let lookup = Lookup::build(&files, &instances);

        let semver_selectors: Vec<&Selector> = semver_groups.iter().map(|g| &g.selector).collect();
        let version_selectors: Vec<&Selector> =
            version_groups.iter().map(|g| &g.selector).collect();
        let is_local = |name: &str| lookup.is_local(name);
        let assignment = group::assign(&instances, &semver_selectors, &version_selectors, &is_local);

        Ok(Self {
            config,
            files,
            file_errors,
            instances,
            lookup,
            semver_groups,
            version_groups,
            assignment,
        })
    }

    pub fn instance(&self, id: InstanceId) -> &Instance {
        &self.instances[id.0]
    }

    /// The semver group an instance was assigned to
    pub fn semver_group_of(&self, id: InstanceId) -> &SemverGroup {
        &self.semver_groups[self.assignment.semver_group(id)]
    }

    /// A real semver value for comparisons, resolving workspace references
    /// against the local package of the same name
    pub fn semver_equivalent(&self, instance: &Instance) -> String {
        instance
            .specifier
            .semver_equivalent(self.lookup.local_version(&instance.name))
    }

    /// Re-ranges `specifier` as the instance's semver group requires
    pub fn get_fixed(
        &self,
        instance: &Instance,
        specifier: &Specifier,
    ) -> Result<Specifier, SpecifierError> {
        self.semver_group_of(instance.id).get_fixed(instance, specifier)
    }

    /// Inspects every instance against its version group
    pub fn inspect_versions(&self) -> Vec<DependencyReports> {
        self.version_groups
            .iter()
            .enumerate()
            .flat_map(|(index, group)| {
                group.inspect_all(index, &self.assignment.version_group_members(index), self)
            })
            .collect()
    }

    /// Inspects every instance against its semver group, in instance order
    pub fn inspect_semver_ranges(&self) -> Vec<Report> {
        self.instances
            .iter()
            .map(|instance| self.semver_group_of(instance.id).inspect(instance))
            .collect()
    }
}

/// Reads every enabled dependency type of every file
fn extract_instances(files: &[PackageJsonFile], config: &Config) -> Vec<Instance> {
    let mut instances = Vec::new();
    for (file_index, file) in files.iter().enumerate() {
        let package_name = file.display_name();
        for dependency_type in &config.dependency_types {
            let pairs = match dependency_type.read(&file.contents) {
                Ok(pairs) => pairs,
                Err(e) => {
                    debug!("{}: {}", file.short_path.display(), e);
                    continue;
                }
            };
            for (name, raw) in pairs {
                if !config.matches_filter(&name) {
                    continue;
                }
                instances.push(new_instance(
                    InstanceId(instances.len()),
                    name,
                    &raw,
                    &package_name,
                    file_index,
                    dependency_type,
                ));
            }
        }
    }
    debug!("extracted {} instances", instances.len());
    instances
}

fn new_instance(
    id: InstanceId,
    name: String,
    raw: &str,
    package_name: &str,
    file: usize,
    dependency_type: &DependencyType,
) -> Instance {
    Instance {
        id,
        name,
        specifier: Specifier::parse(raw),
        package_name: package_name.to_string(),
        file,
        dependency_type: dependency_type.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CliOverrides, RcFile};
    use std::path::Path;

    fn file(path: &str, text: &str) -> PackageJsonFile {
        PackageJsonFile::from_text(Path::new("/repo").join(path), path, text).unwrap()
    }

    fn context(rc_file: RcFile, files: Vec<PackageJsonFile>) -> Context {
        let config = Config::resolve(
            Path::new("/repo"),
            None,
            rc_file,
            &CliOverrides {
                source: vec!["package.json".to_string()],
                ..Default::default()
            },
        )
        .unwrap();
        Context::new(config, files, Vec::new()).unwrap()
    }

    #[test]
    fn test_extracts_instances_per_type() {
        let ctx = context(
            RcFile::default(),
            vec![file(
                "packages/a/package.json",
                r#"{
                    "name": "a",
                    "version": "1.0.0",
                    "dependencies": { "react": "^18.0.0" },
                    "devDependencies": { "jest": "29.0.0" }
                }"#,
            )],
        );
        let described: Vec<String> = ctx.instances.iter().map(|i| i.to_string()).collect();
        assert_eq!(
            described,
            vec!["jest@29.0.0 in a [dev]", "a@1.0.0 in a [local]", "react@^18.0.0 in a [prod]"]
        );
        for (index, instance) in ctx.instances.iter().enumerate() {
            assert_eq!(instance.id, InstanceId(index));
        }
    }

    #[test]
    fn test_filter_limits_instances() {
        let rc_file = RcFile {
            filter: Some("^react".to_string()),
            ..Default::default()
        };
        let ctx = context(
            rc_file,
            vec![file(
                "package.json",
                r#"{ "dependencies": { "react": "18.0.0", "react-dom": "18.0.0", "vue": "3.0.0" } }"#,
            )],
        );
        let names: Vec<&str> = ctx.instances.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["react", "react-dom"]);
    }

    #[test]
    fn test_lookup() {
        let ctx = context(
            RcFile::default(),
            vec![
                file("a/package.json", r#"{ "name": "a", "dependencies": { "b": "1.0.0" } }"#),
                file("b/package.json", r#"{ "name": "b", "version": "2.0.0" }"#),
            ],
        );
        assert!(ctx.lookup.is_local("a"));
        assert_eq!(ctx.lookup.local_version("a"), None);
        assert_eq!(ctx.lookup.local_version("b"), Some("2.0.0"));
        assert_eq!(ctx.lookup.instances_of("a", "b"), &[InstanceId(0)]);
        assert!(ctx.lookup.instances_of("b", "a").is_empty());
    }

    #[test]
    fn test_invalid_group_is_a_config_error() {
        let rc_file: RcFile = serde_json::from_str(
            r#"{ "versionGroups": [{ "dependencies": ["react"], "isBanned": true, "pinVersion": "1.0.0" }] }"#,
        )
        .unwrap();
        let config = Config::resolve(Path::new("/repo"), None, rc_file, &CliOverrides::default())
            .unwrap();
        let err = Context::new(config, Vec::new(), Vec::new()).unwrap_err();
        assert!(matches!(err, ConfigError::VersionGroup { index: 0, .. }));
    }

    #[test]
    fn test_semver_equivalent_uses_local_version() {
        let ctx = context(
            RcFile::default(),
            vec![
                file("a/package.json", r#"{ "name": "a", "dependencies": { "b": "workspace:~" } }"#),
                file("b/package.json", r#"{ "name": "b", "version": "2.0.0" }"#),
            ],
        );
        assert_eq!(ctx.semver_equivalent(ctx.instance(InstanceId(0))), "~2.0.0");
    }
}

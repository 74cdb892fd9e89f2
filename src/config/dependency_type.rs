//! Dependency types: named locations inside package.json holding versions
//!
//! Built-in types cover the usual dependency maps plus the package's own
//! version (`local`). Custom types add any other location using one of the
//! read/write strategies.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::LOCAL_TYPE;
use crate::error::{ConfigError, StrategyError};
use crate::manifest::{Strategy, DEFAULT_NAME_PATH};

/// Old name of the `local` type
const RENAMED_WORKSPACE_TYPE: &str = "workspace";

/// A named location in package.json holding dependency versions
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyType {
    /// Name used in config and selectors, e.g. `prod`
    pub name: String,
    /// How the values are laid out
    pub strategy: Strategy,
    /// Dotted path of the values
    pub path: String,
    /// Dotted path of the name, for `name~version` only
    pub name_path: Option<String>,
}

/// A `customTypes` entry as written in the config file
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomTypeConfig {
    pub strategy: Option<String>,
    pub path: Option<String>,
    pub name_path: Option<String>,
}

impl DependencyType {
    pub fn new(name: impl Into<String>, strategy: Strategy, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strategy,
            path: path.into(),
            name_path: None,
        }
    }

    /// Sets the path of the name for `name~version`
    pub fn with_name_path(mut self, name_path: impl Into<String>) -> Self {
        self.name_path = Some(name_path.into());
        self
    }

    /// The types available without any configuration
    pub fn builtins() -> Vec<DependencyType> {
        vec![
            DependencyType::new("dev", Strategy::VersionsByName, "devDependencies"),
            DependencyType::new(LOCAL_TYPE, Strategy::NameTildeVersion, "version")
                .with_name_path(DEFAULT_NAME_PATH),
            DependencyType::new("overrides", Strategy::VersionsByName, "overrides"),
            DependencyType::new("peer", Strategy::VersionsByName, "peerDependencies"),
            DependencyType::new("pnpmOverrides", Strategy::VersionsByName, "pnpm.overrides"),
            DependencyType::new("prod", Strategy::VersionsByName, "dependencies"),
            DependencyType::new("resolutions", Strategy::VersionsByName, "resolutions"),
        ]
    }

    /// Validates a `customTypes` entry
    pub fn from_custom(name: &str, config: &CustomTypeConfig) -> Result<Self, ConfigError> {
        let strategy_name = config
            .strategy
            .as_deref()
            .ok_or_else(|| ConfigError::invalid_custom_type(name, "missing \"strategy\""))?;
        let strategy = Strategy::parse(strategy_name).ok_or_else(|| {
            ConfigError::invalid_custom_type(
                name,
                format!(
                    "unknown strategy '{}', expected one of name@version, name~version, version, versionsByName",
                    strategy_name
                ),
            )
        })?;

        let path = config
            .path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ConfigError::invalid_custom_type(name, "missing \"path\""))?;

        let mut dependency_type = DependencyType::new(name, strategy, path);
        if let Some(name_path) = config.name_path.as_deref() {
            if strategy != Strategy::NameTildeVersion {
                return Err(ConfigError::invalid_custom_type(
                    name,
                    "\"namePath\" is only used by the name~version strategy",
                ));
            }
            dependency_type = dependency_type.with_name_path(name_path);
        }
        Ok(dependency_type)
    }

    /// Reads every `(name, version)` pair of this type from a package.json
    pub fn read(&self, contents: &Value) -> Result<Vec<(String, String)>, StrategyError> {
        self.strategy
            .read(contents, &self.path, self.name_path.as_deref())
    }

    /// Writes a version, or removes the entry when `version` is `None`
    pub fn write(
        &self,
        contents: &mut Value,
        name: &str,
        version: Option<&str>,
    ) -> Result<(), StrategyError> {
        self.strategy.write(contents, &self.path, name, version)
    }
}

/// Resolves the enabled dependency types.
///
/// `enabled` lists type names, optionally negated with `!`. An empty list, or
/// one containing only negations, starts from every known type.
pub fn resolve_types(
    enabled: &[String],
    custom: &BTreeMap<String, CustomTypeConfig>,
) -> Result<Vec<DependencyType>, ConfigError> {
    let mut all = DependencyType::builtins();
    for (name, config) in custom {
        let custom_type = DependencyType::from_custom(name, config)?;
        match all.iter_mut().find(|t| t.name == custom_type.name) {
            Some(existing) => *existing = custom_type,
            None => all.push(custom_type),
        }
    }

    let mut included = Vec::new();
    let mut excluded = Vec::new();
    for entry in enabled {
        let (negated, name) = match entry.strip_prefix('!') {
            Some(name) => (true, name),
            None => (false, entry.as_str()),
        };
        if name == RENAMED_WORKSPACE_TYPE {
            return Err(ConfigError::RenamedWorkspaceType);
        }
        if !all.iter().any(|t| t.name == name) {
            return Err(ConfigError::UnknownDependencyType {
                name: name.to_string(),
            });
        }
        if negated {
            excluded.push(name);
        } else {
            included.push(name);
        }
    }

    Ok(all
        .into_iter()
        .filter(|t| included.is_empty() || included.contains(&t.name.as_str()))
        .filter(|t| !excluded.contains(&t.name.as_str()))
        .collect())
}

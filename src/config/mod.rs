//! Configuration loading
//!
//! Reads the depsync config from (in priority order):
//! - the file given with `--config`
//! - .depsyncrc, .depsyncrc.json, .depsyncrc.toml or depsync.config.json
//! - the "depsync" property of the root package.json
//!
//! Command line flags override values from the file.

mod dependency_type;
mod groups;

pub use dependency_type::{resolve_types, CustomTypeConfig, DependencyType};
pub use groups::{SemverGroupConfig, VersionGroupConfig};

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ConfigError;
use crate::manifest;

/// Config files looked up in the working directory
pub const CONFIG_FILE_NAMES: [&str; 4] = [
    ".depsyncrc",
    ".depsyncrc.json",
    ".depsyncrc.toml",
    "depsync.config.json",
];

/// Property of the root package.json which may hold the config
pub const PACKAGE_JSON_KEY: &str = "depsync";

/// Top-level keys replaced by `dependencyTypes`
const DEPRECATED_KEYS: [&str; 7] = [
    "dev",
    "overrides",
    "peer",
    "pnpmOverrides",
    "prod",
    "resolutions",
    "workspace",
];

/// Top-level package.json keys `format` puts first, in this order
pub const DEFAULT_SORT_FIRST: [&str; 4] = ["name", "description", "version", "author"];

/// Properties whose entries `format` sorts alphabetically
pub const DEFAULT_SORT_AZ: [&str; 7] = [
    "contributors",
    "dependencies",
    "devDependencies",
    "keywords",
    "peerDependencies",
    "resolutions",
    "scripts",
];

/// The config file as written
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RcFile {
    /// Globs of package.json files
    pub source: Vec<String>,
    /// Enabled dependency type names
    pub dependency_types: Vec<String>,
    /// Regex limiting which dependency names are processed
    pub filter: Option<String>,
    /// Indentation used when writing files
    pub indent: Option<String>,
    pub semver_groups: Vec<SemverGroupConfig>,
    pub version_groups: Vec<VersionGroupConfig>,
    pub custom_types: BTreeMap<String, CustomTypeConfig>,
    /// Keys put first by `format`
    pub sort_first: Option<Vec<String>>,
    /// Properties sorted alphabetically by `format`
    pub sort_az: Option<Vec<String>>,
}

impl RcFile {
    /// Parses config text; `.toml` files are TOML, everything else JSON
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let is_toml = path.extension().is_some_and(|ext| ext == "toml");
        let value: Value = if is_toml {
            toml::from_str(text).map_err(|e| ConfigError::parse_error(path, e.to_string()))?
        } else {
            serde_json::from_str(text).map_err(|e| ConfigError::parse_error(path, e.to_string()))?
        };
        Self::from_value(value, path)
    }

    /// Validates and deserializes an already parsed config
    pub fn from_value(value: Value, path: &Path) -> Result<Self, ConfigError> {
        let deprecated: Vec<String> = DEPRECATED_KEYS
            .iter()
            .filter(|key| value.get(**key).is_some())
            .map(|key| key.to_string())
            .collect();
        if !deprecated.is_empty() {
            return Err(ConfigError::DeprecatedTypes { keys: deprecated });
        }

        serde_json::from_value(value).map_err(|e| ConfigError::parse_error(path, e.to_string()))
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// Explicit config file
    pub config: Option<PathBuf>,
    /// Replaces `source`
    pub source: Vec<String>,
    /// Comma separated dependency type names, replaces `dependencyTypes`
    pub types: Option<String>,
    /// Replaces `filter`
    pub filter: Option<String>,
    /// Replaces `indent`
    pub indent: Option<String>,
}

/// Resolved configuration for one run
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory the run operates in
    pub cwd: PathBuf,
    /// Where the config came from, if anywhere
    pub config_path: Option<PathBuf>,
    /// The config as written
    pub rc_file: RcFile,
    /// Source globs, never empty
    pub sources: Vec<String>,
    /// Dependency types to read
    pub dependency_types: Vec<DependencyType>,
    /// Dependency name filter
    pub filter: Option<Regex>,
    /// Indentation override; files keep their own when `None`
    pub indent: Option<String>,
    pub sort_first: Vec<String>,
    pub sort_az: Vec<String>,
}

impl Config {
    /// Finds, reads and resolves the configuration for `cwd`
    pub fn load(cwd: &Path, cli: &CliOverrides) -> Result<Self, ConfigError> {
        let (config_path, rc_file) = match find_rc_file(cwd, cli.config.as_deref())? {
            Some((path, rc_file)) => (Some(path), rc_file),
            None => (None, RcFile::default()),
        };
        Self::resolve(cwd, config_path, rc_file, cli)
    }

    /// Applies command line overrides and validates the result
    pub fn resolve(
        cwd: &Path,
        config_path: Option<PathBuf>,
        rc_file: RcFile,
        cli: &CliOverrides,
    ) -> Result<Self, ConfigError> {
        let sources = if !cli.source.is_empty() {
            cli.source.clone()
        } else if !rc_file.source.is_empty() {
            rc_file.source.clone()
        } else {
            manifest::default_sources(cwd)
        };

        let enabled_types = match &cli.types {
            Some(types) => types
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect(),
            None => rc_file.dependency_types.clone(),
        };
        let dependency_types = resolve_types(&enabled_types, &rc_file.custom_types)?;

        let filter = match cli.filter.as_ref().or(rc_file.filter.as_ref()) {
            Some(pattern) => Some(Regex::new(pattern).map_err(|e| ConfigError::InvalidFilter {
                value: pattern.clone(),
                message: e.to_string(),
            })?),
            None => None,
        };

        let indent = cli.indent.clone().or_else(|| rc_file.indent.clone());
        let sort_first = rc_file
            .sort_first
            .clone()
            .unwrap_or_else(|| DEFAULT_SORT_FIRST.map(String::from).to_vec());
        let sort_az = rc_file
            .sort_az
            .clone()
            .unwrap_or_else(|| DEFAULT_SORT_AZ.map(String::from).to_vec());

        debug!(
            "sources: {:?}, dependency types: {:?}",
            sources,
            dependency_types.iter().map(|t| &t.name).collect::<Vec<_>>()
        );

        Ok(Self {
            cwd: cwd.to_path_buf(),
            config_path,
            rc_file,
            sources,
            dependency_types,
            filter,
            indent,
            sort_first,
            sort_az,
        })
    }

    /// Returns true if any semver group was configured
    pub fn has_semver_groups(&self) -> bool {
        !self.rc_file.semver_groups.is_empty()
    }

    /// Returns true if the dependency name passes the filter
    pub fn matches_filter(&self, name: &str) -> bool {
        self.filter.as_ref().is_none_or(|re| re.is_match(name))
    }
}

/// Locates and parses the config file, if any
fn find_rc_file(
    cwd: &Path,
    explicit: Option<&Path>,
) -> Result<Option<(PathBuf, RcFile)>, ConfigError> {
    if let Some(path) = explicit {
        let path = cwd.join(path);
        return read_rc_file(&path).map(|rc| Some((path, rc)));
    }

    for name in CONFIG_FILE_NAMES {
        let path = cwd.join(name);
        if path.is_file() {
            debug!("using config file {}", path.display());
            return read_rc_file(&path).map(|rc| Some((path, rc)));
        }
    }

    let package_json = cwd.join("package.json");
    let Ok(text) = fs::read_to_string(&package_json) else {
        return Ok(None);
    };
    // an unparsable root package.json is reported by the manifest layer
    let Ok(mut value) = serde_json::from_str::<Value>(&text) else {
        return Ok(None);
    };
    match value.get_mut(PACKAGE_JSON_KEY).map(Value::take) {
        Some(config) => {
            debug!("using \"{}\" property of {}", PACKAGE_JSON_KEY, package_json.display());
            RcFile::from_value(config, &package_json).map(|rc| Some((package_json, rc)))
        }
        None => Ok(None),
    }
}

fn read_rc_file(path: &Path) -> Result<RcFile, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    RcFile::parse(&text, path)
}

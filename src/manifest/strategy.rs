//! Read/write strategies for dependency locations inside package.json
//!
//! A strategy knows how versions are laid out at a (dotted) path:
//! - `versionsByName`: `{ "react": "^18.0.0", ... }`
//! - `version`: `"1.2.3"`, named after the last path segment
//! - `name@version`: `"yarn@4.0.0"`
//! - `name~version`: a name and a version held at two separate paths

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::StrategyError;

/// How a dependency type stores its versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// `"name@version"` string
    #[serde(rename = "name@version")]
    NameAtVersion,
    /// name and version at two paths
    #[serde(rename = "name~version")]
    NameTildeVersion,
    /// version string, named by the last path segment
    #[serde(rename = "version")]
    Version,
    /// object of name to version
    #[serde(rename = "versionsByName")]
    VersionsByName,
}

/// Path of the package name used by `name~version` when none is configured
pub const DEFAULT_NAME_PATH: &str = "name";

impl Strategy {
    /// Parses a configured strategy name
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name@version" => Some(Strategy::NameAtVersion),
            "name~version" => Some(Strategy::NameTildeVersion),
            "version" => Some(Strategy::Version),
            "versionsByName" => Some(Strategy::VersionsByName),
            _ => None,
        }
    }

    /// Returns the configuration spelling of this strategy
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::NameAtVersion => "name@version",
            Strategy::NameTildeVersion => "name~version",
            Strategy::Version => "version",
            Strategy::VersionsByName => "versionsByName",
        }
    }

    /// Reads every `(name, version)` pair stored at `path`
    pub fn read(
        &self,
        contents: &Value,
        path: &str,
        name_path: Option<&str>,
    ) -> Result<Vec<(String, String)>, StrategyError> {
        let missing = || StrategyError::Missing {
            strategy: self.as_str().to_string(),
            path: path.to_string(),
        };

        match self {
            Strategy::VersionsByName => {
                let map = get_path(contents, path)
                    .and_then(Value::as_object)
                    .ok_or_else(missing)?;
                Ok(map
                    .iter()
                    .filter_map(|(name, version)| {
                        version.as_str().map(|v| (name.clone(), v.to_string()))
                    })
                    .collect())
            }
            Strategy::Version => {
                let version = get_non_empty_str(contents, path).ok_or_else(missing)?;
                Ok(vec![(last_segment(path).to_string(), version.to_string())])
            }
            Strategy::NameAtVersion => {
                let value = get_non_empty_str(contents, path).ok_or_else(missing)?;
                let (name, version) = split_name_at_version(value).ok_or_else(missing)?;
                Ok(vec![(name.to_string(), version.to_string())])
            }
            Strategy::NameTildeVersion => {
                let name_path = name_path.unwrap_or(DEFAULT_NAME_PATH);
                let name = get_non_empty_str(contents, name_path).ok_or_else(missing)?;
                let version = get_non_empty_str(contents, path).ok_or_else(missing)?;
                Ok(vec![(name.to_string(), version.to_string())])
            }
        }
    }

    /// Writes `version` for `name` at `path`, or removes the entry when
    /// `version` is `None`
    pub fn write(
        &self,
        contents: &mut Value,
        path: &str,
        name: &str,
        version: Option<&str>,
    ) -> Result<(), StrategyError> {
        let not_writable = || StrategyError::NotWritable {
            strategy: self.as_str().to_string(),
            path: path.to_string(),
        };

        let (parent, key) = match self {
            Strategy::VersionsByName => {
                let map = get_path_mut(contents, path)
                    .and_then(Value::as_object_mut)
                    .ok_or_else(not_writable)?;
                (map, name.to_string())
            }
            _ => parent_of(contents, path).ok_or_else(not_writable)?,
        };

        match version {
            Some(version) => {
                let value = match self {
                    Strategy::NameAtVersion => format!("{}@{}", name, version),
                    _ => version.to_string(),
                };
                parent.insert(key, Value::String(value));
            }
            None => {
                parent.shift_remove(&key);
            }
        }
        Ok(())
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Splits `name@version`, allowing scoped names such as `@scope/pkg@1.0.0`
fn split_name_at_version(value: &str) -> Option<(&str, &str)> {
    let at = value.get(1..)?.rfind('@')? + 1;
    let (name, version) = (&value[..at], &value[at + 1..]);
    if name.is_empty() || version.is_empty() {
        return None;
    }
    Some((name, version))
}

fn last_segment(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

/// Resolves a dotted path such as `pnpm.overrides`
pub fn get_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.get(segment))
}

fn get_path_mut<'a>(value: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.get_mut(segment))
}

fn get_non_empty_str<'a>(value: &'a Value, path: &str) -> Option<&'a str> {
    get_path(value, path)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn parent_of<'a>(value: &'a mut Value, path: &str) -> Option<(&'a mut Map<String, Value>, String)> {
    let (parent_path, key) = match path.rsplit_once('.') {
        Some((parent, key)) => (Some(parent), key),
        None => (None, path),
    };
    let parent = match parent_path {
        Some(parent_path) => get_path_mut(value, parent_path)?,
        None => value,
    };
    Some((parent.as_object_mut()?, key.to_string()))
}

//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ConfigError: Invalid configuration, fatal to the run
//! - ManifestError: Issues reading, parsing or writing a package.json file
//! - StrategyError: A dependency type strategy could not read or write a value
//! - SpecifierError: A specifier has no semver value to offer
//!
//! Only configuration problems abort a run. Manifest errors are collected per
//! file and specifier errors always become an unsupported mismatch report.

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the config file
    #[error("failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    /// A semver group is malformed
    #[error("semver group {index} is invalid: {message}")]
    SemverGroup { index: usize, message: String },

    /// A version group is malformed
    #[error("version group {index} is invalid: {message}")]
    VersionGroup { index: usize, message: String },

    /// A custom type declaration is malformed
    #[error("custom type '{name}' is invalid: {message}")]
    InvalidCustomType { name: String, message: String },

    /// A dependency type name does not exist
    #[error("unknown dependency type '{name}'")]
    UnknownDependencyType { name: String },

    /// Top-level type toggles removed in favour of `dependencyTypes`
    #[error("deprecated config keys found: {}; use \"dependencyTypes\" instead", keys.join(", "))]
    DeprecatedTypes { keys: Vec<String> },

    /// The `workspace` dependency type was renamed to `local`
    #[error("the \"workspace\" dependency type was renamed to \"local\"")]
    RenamedWorkspaceType,

    /// The dependency name filter is not a valid regex
    #[error("invalid filter '{value}': {message}")]
    InvalidFilter { value: String, message: String },
}

/// Errors related to manifest file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// No package.json file matched the source patterns
    #[error("no package.json files found in {cwd} (sources: {})", patterns.join(", "))]
    NoSourcesFound { cwd: PathBuf, patterns: Vec<String> },

    /// A source pattern is not a valid glob
    #[error("invalid source pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write manifest file
    #[error("failed to write manifest file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error
    #[error("failed to parse JSON in {path}: {message}")]
    JsonParseError { path: PathBuf, message: String },
}

/// Errors raised by dependency type strategies
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    /// Nothing usable exists at the configured path
    #[error("strategy '{strategy}' found no value at '{path}'")]
    Missing { strategy: String, path: String },

    /// The parent of the configured path is not an object
    #[error("strategy '{strategy}' cannot write to '{path}'")]
    NotWritable { strategy: String, path: String },
}

/// Errors raised by specifiers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecifierError {
    /// The specifier carries no semver value
    #[error("'{raw}' is not a semver specifier")]
    NotSemver { raw: String },
}

impl ConfigError {
    /// Creates a new ParseError
    pub fn parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ConfigError::ParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidCustomType error
    pub fn invalid_custom_type(name: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidCustomType {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl ManifestError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::WriteError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new JsonParseError
    pub fn json_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::JsonParseError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl SpecifierError {
    /// Creates a new NotSemver error
    pub fn not_semver(raw: impl Into<String>) -> Self {
        SpecifierError::NotSemver { raw: raw.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_semver_group() {
        let err = ConfigError::SemverGroup {
            index: 2,
            message: "invalid range '^^'".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("semver group 2"));
        assert!(msg.contains("^^"));
    }

    #[test]
    fn test_config_error_deprecated_types() {
        let err = ConfigError::DeprecatedTypes {
            keys: vec!["dev".to_string(), "prod".to_string()],
        };
        let msg = format!("{}", err);
        assert!(msg.contains("dev, prod"));
        assert!(msg.contains("dependencyTypes"));
    }

    #[test]
    fn test_config_error_renamed_workspace() {
        let msg = format!("{}", ConfigError::RenamedWorkspaceType);
        assert!(msg.contains("renamed to \"local\""));
    }

    #[test]
    fn test_manifest_error_no_sources() {
        let err = ManifestError::NoSourcesFound {
            cwd: PathBuf::from("/repo"),
            patterns: vec!["package.json".to_string(), "packages/*/package.json".to_string()],
        };
        let msg = format!("{}", err);
        assert!(msg.contains("/repo"));
        assert!(msg.contains("packages/*/package.json"));
    }

    #[test]
    fn test_manifest_error_json_parse() {
        let err = ManifestError::json_parse_error("/path/to/package.json", "unexpected token");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to parse JSON"));
        assert!(msg.contains("unexpected token"));
    }

    #[test]
    fn test_specifier_error_not_semver() {
        let err = SpecifierError::not_semver("latest");
        assert_eq!(format!("{}", err), "'latest' is not a semver specifier");
    }

    #[test]
    fn test_app_error_from_config_error() {
        let app_err: AppError = ConfigError::RenamedWorkspaceType.into();
        assert!(format!("{}", app_err).contains("workspace"));
    }

    #[test]
    fn test_app_error_from_manifest_error() {
        let err = ManifestError::read_error(
            "/missing/package.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let app_err: AppError = err.into();
        assert!(format!("{}", app_err).contains("failed to read manifest file"));
    }
}

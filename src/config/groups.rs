//! Semver and version group entries as written in the config file
//!
//! These are deserialized as-is and validated into typed groups by
//! [`crate::semver_group::SemverGroup`] and [`crate::version_group::VersionGroup`].

use serde::Deserialize;

/// An entry of `semverGroups`
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct SemverGroupConfig {
    pub label: Option<String>,
    pub dependencies: Option<Vec<String>>,
    pub packages: Option<Vec<String>>,
    pub dependency_types: Option<Vec<String>>,
    pub range: Option<String>,
    pub is_ignored: Option<bool>,
}

/// An entry of `versionGroups`
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct VersionGroupConfig {
    pub label: Option<String>,
    pub dependencies: Option<Vec<String>>,
    pub packages: Option<Vec<String>>,
    pub dependency_types: Option<Vec<String>>,
    pub is_ignored: Option<bool>,
    pub pin_version: Option<String>,
    pub is_banned: Option<bool>,
    pub snap_to: Option<Vec<String>>,
    pub policy: Option<String>,
    pub prefer_version: Option<String>,
}

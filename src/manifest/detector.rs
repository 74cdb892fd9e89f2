//! package.json discovery
//!
//! Features:
//! - Expands configured source globs relative to the working directory
//! - Falls back to npm/yarn `workspaces` from the root package.json
//! - Supports pnpm-workspace.yaml `packages:` entries

use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::ManifestError;

const PACKAGE_JSON: &str = "package.json";

/// Source patterns used when none are configured
pub fn default_sources(cwd: &Path) -> Vec<String> {
    let mut sources = vec![PACKAGE_JSON.to_string()];

    let workspaces = read_package_json_workspaces(cwd);
    let pnpm = read_pnpm_workspace_packages(cwd);
    if workspaces.is_empty() && pnpm.is_empty() {
        sources.push("packages/*/package.json".to_string());
    }
    sources.extend(workspaces);
    sources.extend(pnpm);
    sources
}

/// Expands source patterns into a sorted, de-duplicated list of files
pub fn discover_sources(cwd: &Path, patterns: &[String]) -> Result<Vec<PathBuf>, ManifestError> {
    let mut paths = Vec::new();

    for pattern in patterns {
        let pattern = as_package_json_pattern(pattern);
        let full = cwd.join(&pattern);
        let entries = glob::glob(&full.to_string_lossy()).map_err(|e| {
            ManifestError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            }
        })?;

        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => paths.push(path),
                Ok(_) => {}
                Err(e) => warn!("skipping unreadable path while expanding {}: {}", pattern, e),
            }
        }
    }

    paths.sort();
    paths.dedup();
    debug!("found {} package.json files", paths.len());

    if paths.is_empty() {
        return Err(ManifestError::NoSourcesFound {
            cwd: cwd.to_path_buf(),
            patterns: patterns.to_vec(),
        });
    }
    Ok(paths)
}

/// Turns a directory pattern such as `packages/*` into `packages/*/package.json`
fn as_package_json_pattern(pattern: &str) -> String {
    let trimmed = pattern.trim_start_matches("./").trim_end_matches('/');
    if trimmed.ends_with(PACKAGE_JSON) {
        trimmed.to_string()
    } else {
        format!("{}/{}", trimmed, PACKAGE_JSON)
    }
}

/// Reads `workspaces` (array or `{ "packages": [...] }`) from the root package.json
fn read_package_json_workspaces(cwd: &Path) -> Vec<String> {
    let Ok(content) = std::fs::read_to_string(cwd.join(PACKAGE_JSON)) else {
        return Vec::new();
    };
    let Ok(json) = serde_json::from_str::<Value>(&content) else {
        return Vec::new();
    };

    let workspaces = match json.get("workspaces") {
        Some(Value::Array(items)) => items,
        Some(Value::Object(obj)) => match obj.get("packages") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    workspaces
        .iter()
        .filter_map(Value::as_str)
        .map(as_package_json_pattern)
        .collect()
}

/// Parse pnpm-workspace.yaml and return its package patterns
fn read_pnpm_workspace_packages(cwd: &Path) -> Vec<String> {
    let Ok(content) = std::fs::read_to_string(cwd.join("pnpm-workspace.yaml")) else {
        return Vec::new();
    };

    let mut patterns = Vec::new();

    // Simple YAML parsing for packages array
    // Format: packages:
    //           - 'packages/*'
    //           - 'apps/*'
    let mut in_packages = false;
    for line in content.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("packages:") {
            in_packages = true;
            continue;
        }

        if in_packages {
            // Check if we've moved to a new section
            if !trimmed.is_empty() && !trimmed.starts_with('-') && !trimmed.starts_with('#') {
                break;
            }

            if let Some(pattern) = trimmed.strip_prefix('-') {
                let pattern = pattern.trim().trim_matches('\'').trim_matches('"');
                // exclusions are not sources
                if !pattern.is_empty() && !pattern.starts_with('!') {
                    patterns.push(as_package_json_pattern(pattern));
                }
            }
        }
    }

    patterns
}

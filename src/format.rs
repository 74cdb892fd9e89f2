//! Consistent layout of package.json properties
//!
//! Puts the configured `sortFirst` keys at the top, followed by every other
//! key A-Z, sorts the entries of the `sortAz` properties and shortens the
//! `bugs` and `repository` properties where nothing is lost.

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::Config;
use crate::domain::FixSummary;
use crate::manifest::PackageJsonFile;

/// Formats every file in memory, counting files already formatted as valid
/// and reformatted files as fixed
pub fn format_files(files: &mut [PackageJsonFile], config: &Config, summary: &mut FixSummary) {
    for file in files.iter_mut() {
        format_file(file, config);
        if file.has_changed() {
            debug!("{} needs formatting", file.short_path.display());
            summary.fixed += 1;
        } else {
            summary.valid += 1;
        }
    }
}

pub fn format_file(file: &mut PackageJsonFile, config: &Config) {
    let Some(root) = file.contents.as_object_mut() else {
        return;
    };
    shorten_bugs(root);
    shorten_repository(root);
    for key in &config.sort_az {
        if let Some(value) = root.get_mut(key) {
            sort_alphabetically(value);
        }
    }
    let sorted = sort_first(std::mem::take(root), &config.sort_first);
    *root = sorted;
}

/// `{ "url": "…" }` becomes the url alone
fn shorten_bugs(root: &mut Map<String, Value>) {
    let url = match root.get("bugs") {
        Some(Value::Object(bugs)) if bugs.len() == 1 => bugs.get("url").and_then(Value::as_str),
        _ => None,
    };
    if let Some(url) = url.map(String::from) {
        root.insert("bugs".to_string(), Value::String(url));
    }
}

/// A GitHub repository without a `directory` becomes `owner/repo`
fn shorten_repository(root: &mut Map<String, Value>) {
    let shorthand = match root.get("repository") {
        Some(Value::Object(repository)) if !repository.contains_key("directory") => repository
            .get("url")
            .and_then(Value::as_str)
            .and_then(github_shorthand),
        _ => None,
    };
    if let Some(shorthand) = shorthand {
        root.insert("repository".to_string(), Value::String(shorthand));
    }
}

fn github_shorthand(url: &str) -> Option<String> {
    let (_, path) = url.split_once("github.com/")?;
    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let mut parts = path.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => {
            Some(format!("{}/{}", owner, repo))
        }
        _ => None,
    }
}

/// Sorts object keys or string array items; other values are left alone
fn sort_alphabetically(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            map.extend(entries);
        }
        Value::Array(items) if items.iter().all(Value::is_string) => {
            items.sort_by(|a, b| a.as_str().cmp(&b.as_str()));
        }
        _ => {}
    }
}

fn sort_first(mut map: Map<String, Value>, first: &[String]) -> Map<String, Value> {
    let mut sorted = Map::new();
    for key in first {
        if let Some(value) = map.remove(key) {
            sorted.insert(key.clone(), value);
        }
    }
    let mut rest: Vec<(String, Value)> = map.into_iter().collect();
    rest.sort_by(|a, b| a.0.cmp(&b.0));
    sorted.extend(rest);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CliOverrides, RcFile};
    use std::path::Path;

    fn config(rc: &str) -> Config {
        let rc_file: RcFile = serde_json::from_str(rc).unwrap();
        let cli = CliOverrides {
            source: vec!["package.json".to_string()],
            ..Default::default()
        };
        Config::resolve(Path::new("/repo"), None, rc_file, &cli).unwrap()
    }

    fn formatted(rc: &str, text: &str) -> PackageJsonFile {
        let mut file = PackageJsonFile::from_text("/repo/package.json", "package.json", text).unwrap();
        format_file(&mut file, &config(rc));
        file
    }

    fn keys(value: &Value) -> Vec<&str> {
        value.as_object().unwrap().keys().map(String::as_str).collect()
    }

    #[test]
    fn test_sort_first_then_alphabetical() {
        let file = formatted(
            r#"{ "sortFirst": ["F", "E", "D"] }"#,
            r#"{ "A": "", "F": "", "B": "", "D": "", "E": "" }"#,
        );
        assert_eq!(keys(&file.contents), vec!["F", "E", "D", "A", "B"]);
        assert!(file.has_changed());
    }

    #[test]
    fn test_default_sort_first() {
        let file = formatted(
            "{}",
            r#"{ "scripts": {}, "version": "1.0.0", "author": "me", "name": "a", "description": "d" }"#,
        );
        assert_eq!(
            keys(&file.contents),
            vec!["name", "description", "version", "author", "scripts"]
        );
    }

    #[test]
    fn test_sort_az_properties() {
        let file = formatted(
            "{}",
            r#"{ "name": "a", "dependencies": { "zod": "1.0.0", "axios": "1.0.0" }, "keywords": ["b", "a"], "files": ["z", "a"] }"#,
        );
        assert_eq!(keys(&file.contents["dependencies"]), vec!["axios", "zod"]);
        assert_eq!(file.contents["keywords"], serde_json::json!(["a", "b"]));
        // not listed in sortAz
        assert_eq!(file.contents["files"], serde_json::json!(["z", "a"]));
    }

    #[test]
    fn test_already_formatted_is_unchanged() {
        let file = formatted(
            "{}",
            r#"{ "name": "a", "version": "1.0.0", "dependencies": { "a": "1.0.0", "b": "1.0.0" }, "private": true }"#,
        );
        assert!(!file.has_changed());
    }

    #[test]
    fn test_shorten_bugs() {
        let file = formatted(
            "{}",
            r#"{ "name": "a", "bugs": { "url": "https://github.com/o/r/issues" } }"#,
        );
        assert_eq!(file.contents["bugs"], "https://github.com/o/r/issues");

        let file = formatted(
            "{}",
            r#"{ "name": "a", "bugs": { "url": "https://x.dev", "email": "a@x.dev" } }"#,
        );
        assert!(file.contents["bugs"].is_object());
    }

    #[test]
    fn test_shorten_repository() {
        let file = formatted(
            "{}",
            r#"{ "name": "a", "repository": { "type": "git", "url": "git+https://github.com/owner/repo.git" } }"#,
        );
        assert_eq!(file.contents["repository"], "owner/repo");

        let file = formatted(
            "{}",
            r#"{ "name": "a", "repository": { "type": "git", "url": "https://github.com/owner/repo", "directory": "packages/a" } }"#,
        );
        assert!(file.contents["repository"].is_object());

        let file = formatted(
            "{}",
            r#"{ "name": "a", "repository": { "type": "git", "url": "https://gitlab.com/owner/repo.git" } }"#,
        );
        assert!(file.contents["repository"].is_object());
    }

    #[test]
    fn test_format_files_counts() {
        let config = config("{}");
        let mut files = vec![
            PackageJsonFile::from_text("/repo/a/package.json", "a/package.json", r#"{ "version": "1.0.0", "name": "a" }"#)
                .unwrap(),
            PackageJsonFile::from_text("/repo/b/package.json", "b/package.json", r#"{ "name": "b" }"#).unwrap(),
        ];
        let mut summary = FixSummary::new(true);
        format_files(&mut files, &config, &mut summary);
        assert_eq!(summary.fixed, 1);
        assert_eq!(summary.valid, 1);
        assert_eq!(summary.unfixable, 0);
    }
}

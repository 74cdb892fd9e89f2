//! In-memory package.json files
//!
//! Keeps the parsed JSON tree (key order preserved), the tree as it was
//! loaded and the file's formatting so that fixes can be written back
//! without reformatting untouched files.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ManifestError;

/// Indentation used when a file's own indentation cannot be detected
pub const DEFAULT_INDENT: &str = "  ";

/// A package.json file loaded for processing
#[derive(Debug, Clone)]
pub struct PackageJsonFile {
    /// Path to the file
    pub path: PathBuf,
    /// Path relative to the working directory, used in output
    pub short_path: PathBuf,
    /// Current contents, mutated in place by fixes
    pub contents: Value,
    /// Contents as loaded from disk
    original: Value,
    /// Indentation detected in the file
    indent: String,
    /// Whether the file ended with a newline
    trailing_newline: bool,
}

impl PackageJsonFile {
    /// Reads and parses a package.json file
    pub fn read(path: &Path, cwd: &Path) -> Result<Self, ManifestError> {
        let text =
            fs::read_to_string(path).map_err(|e| ManifestError::read_error(path, e))?;
        let short_path = path.strip_prefix(cwd).unwrap_or(path).to_path_buf();
        Self::from_text(path, short_path, &text)
    }

    /// Parses package.json text
    pub fn from_text(
        path: impl Into<PathBuf>,
        short_path: impl Into<PathBuf>,
        text: &str,
    ) -> Result<Self, ManifestError> {
        let path = path.into();
        let contents: Value = serde_json::from_str(text)
            .map_err(|e| ManifestError::json_parse_error(&path, e.to_string()))?;
        if !contents.is_object() {
            return Err(ManifestError::json_parse_error(
                &path,
                "top-level value is not an object",
            ));
        }

        Ok(Self {
            path,
            short_path: short_path.into(),
            original: contents.clone(),
            contents,
            indent: detect_indent(text),
            trailing_newline: text.ends_with('\n'),
        })
    }

    /// The package's `name` property
    pub fn name(&self) -> Option<&str> {
        self.contents.get("name").and_then(Value::as_str)
    }

    /// The package's `version` property
    pub fn version(&self) -> Option<&str> {
        self.contents.get("version").and_then(Value::as_str)
    }

    /// Name used to identify this package in selectors and output
    pub fn display_name(&self) -> String {
        match self.name() {
            Some(name) => name.to_string(),
            None => self.short_path.display().to_string(),
        }
    }

    /// Returns true if the contents differ from what was loaded, including
    /// the order of object keys
    pub fn has_changed(&self) -> bool {
        self.contents != self.original || !same_key_order(&self.contents, &self.original)
    }

    /// Overrides the detected indentation
    pub fn set_indent(&mut self, indent: impl Into<String>) {
        self.indent = indent.into();
    }

    /// Serializes the current contents using the file's formatting
    pub fn to_json_string(&self) -> Result<String, ManifestError> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(self.indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.contents
            .serialize(&mut serializer)
            .map_err(|e| ManifestError::write_error(&self.path, std::io::Error::other(e)))?;

        let mut text = String::from_utf8_lossy(&buf).into_owned();
        if self.trailing_newline {
            text.push('\n');
        }
        Ok(text)
    }
}

/// Map equality ignores key order, so reordering has to be checked separately
fn same_key_order(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(a), Value::Object(b)) => {
            a.keys().eq(b.keys())
                && a.values().zip(b.values()).all(|(a, b)| same_key_order(a, b))
        }
        (Value::Array(a), Value::Array(b)) => {
            a.iter().zip(b.iter()).all(|(a, b)| same_key_order(a, b))
        }
        _ => true,
    }
}

/// Takes the leading whitespace of the first indented line
fn detect_indent(text: &str) -> String {
    text.lines()
        .skip(1)
        .map(|line| {
            line.chars()
                .take_while(|c| *c == ' ' || *c == '\t')
                .collect::<String>()
        })
        .find(|indent| !indent.is_empty())
        .unwrap_or_else(|| DEFAULT_INDENT.to_string())
}

//! Project and local configuration documents.
//!
//! Upgrade commands edit configuration files in place, so they work on the raw
//! JSON object rather than on a resolved [`pyre_config::Configuration`].

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use walkdir::WalkDir;

use pyre_config::configuration::{local_configuration_file, CONFIGURATION_FILE};

use crate::error::{Error, Result};

/// Walks up from `start` to the nearest `.pyre_configuration`.
///
/// # Errors
///
/// Returns [`Error::ProjectConfigurationNotFound`] when no ancestor has one.
pub fn find_project_configuration(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIGURATION_FILE);
        if candidate.is_file() {
            return Ok(candidate);
        }
        if !current.pop() {
            return Err(Error::ProjectConfigurationNotFound {
                start: start.to_path_buf(),
            });
        }
    }
}

/// Paths of every `.pyre_configuration.local` below `root`, sorted.
///
/// Hidden directories are not searched.
#[must_use]
pub fn local_configuration_paths(root: &Path) -> Vec<PathBuf> {
    let name = local_configuration_file();
    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !e.file_type().is_dir()
                || e.file_name().to_str().map_or(true, |s| !s.starts_with('.'))
        })
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file() && e.file_name().to_str() == Some(name.as_str()))
        .map(walkdir::DirEntry::into_path)
        .collect();
    paths.sort();

    log::debug!(
        "Found {} local configurations below {}",
        paths.len(),
        root.display()
    );
    paths
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(true, |n| n.abs() > 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
    }
}

/// A configuration file kept as its JSON object.
///
/// Written back with sorted keys and two-space indentation.
///
/// # Examples
///
/// ```
/// use pyre_upgrade::ConfigurationDocument;
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join(".pyre_configuration.local");
/// std::fs::write(&path, r#"{"targets": ["//a:b"]}"#).unwrap();
///
/// let mut document = ConfigurationDocument::load(&path).unwrap();
/// document.set_version("abc123");
/// document.write().unwrap();
///
/// let written = std::fs::read_to_string(&path).unwrap();
/// assert_eq!(written, "{\n  \"targets\": [\n    \"//a:b\"\n  ],\n  \"version\": \"abc123\"\n}\n");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationDocument {
    path: PathBuf,
    contents: Map<String, Value>,
}

impl ConfigurationDocument {
    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not JSON, or is not a
    /// JSON object.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        match serde_json::from_str(&text)? {
            Value::Object(contents) => Ok(Self {
                path: path.to_path_buf(),
                contents,
            }),
            _ => Err(Error::NotAnObject {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Every `.pyre_configuration.local` below `root`, sorted by path.
    ///
    /// Hidden directories are not searched.
    ///
    /// # Errors
    ///
    /// Returns an error if a discovered file cannot be loaded.
    pub fn gather_local(root: &Path) -> Result<Vec<Self>> {
        local_configuration_paths(root)
            .iter()
            .map(|path| Self::load(path))
            .collect()
    }

    /// Path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the file.
    #[must_use]
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }

    /// Whether this is a `.local` configuration.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name == local_configuration_file())
    }

    /// The pinned version hash, if any.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.contents.get("version").and_then(Value::as_str)
    }

    /// Whether the file has a `version` key at all.
    #[must_use]
    pub fn has_version(&self) -> bool {
        self.contents.contains_key("version")
    }

    /// The raw `version` value, whatever its JSON type.
    #[must_use]
    pub fn version_value(&self) -> Option<&Value> {
        self.contents.get("version")
    }

    /// Pins the version hash.
    pub fn set_version(&mut self, version: impl Into<Value>) {
        self.contents.insert("version".to_string(), version.into());
    }

    /// Removes the version pin, returning it.
    pub fn remove_version(&mut self) -> Option<Value> {
        self.contents.remove("version")
    }

    /// Whether the configuration is marked `differential`.
    ///
    /// Any truthy value counts: `true`, a non-zero number, or a non-empty
    /// string, list or object.
    #[must_use]
    pub fn is_differential(&self) -> bool {
        self.contents.get("differential").is_some_and(is_truthy)
    }

    /// The `targets` list.
    #[must_use]
    pub fn targets(&self) -> Vec<String> {
        self.contents
            .get("targets")
            .and_then(Value::as_array)
            .map(|targets| {
                targets
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Writes the document back to its path.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write(&self) -> Result<()> {
        let mut text = serde_json::to_string_pretty(&self.contents)?;
        text.push('\n');
        fs::write(&self.path, text)?;
        Ok(())
    }
}

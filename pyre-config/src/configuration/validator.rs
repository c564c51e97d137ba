//! Configuration validation.
//!
//! Each check returns [`Error::InvalidConfiguration`]; callers wrap the first
//! failure with [`Error::into_environment`].

use std::fs;
use std::path::Path;

use crate::configuration::schema::StringList;
use crate::error::{Error, Result};

/// Name of the typeshed child directory holding the standard library stubs.
pub const TYPESHED_STDLIB: &str = "stdlib";

/// Validation rules for a merged configuration.
pub struct ConfigurationValidator;

impl ConfigurationValidator {
    /// `targets` and `source_directories` must be lists of strings, and so
    /// must `autogenerated`.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending fields.
    pub fn check_lists(
        source_directories: &StringList,
        targets: &StringList,
        autogenerated: &StringList,
    ) -> Result<()> {
        if !source_directories.is_list_of_strings() || !targets.is_list_of_strings() {
            return Err(Error::invalid(
                "`target` and `source_directories` fields must be lists of strings.",
            ));
        }

        if !autogenerated.is_list_of_strings() {
            return Err(Error::invalid(
                "`autogenerated` field must be a list of strings.",
            ));
        }

        Ok(())
    }

    /// The binary must be defined and exist.
    ///
    /// # Errors
    ///
    /// Returns an error when the binary is unset or missing on disk.
    pub fn check_binary(binary: Option<&str>) -> Result<()> {
        let binary = binary
            .filter(|b| !b.is_empty())
            .ok_or_else(|| Error::invalid("`binary` location must be defined"))?;

        if !Path::new(binary).exists() {
            return Err(Error::invalid(format!("Binary at `{binary}` does not exist")));
        }

        Ok(())
    }

    /// There must be at least one worker.
    ///
    /// # Errors
    ///
    /// Returns an error for zero or negative counts.
    pub fn check_workers(workers: i64) -> Result<()> {
        if workers < 1 {
            return Err(Error::invalid("Number of workers must be greater than 0"));
        }
        Ok(())
    }

    /// Locates the versioned stub directory of a typeshed root.
    ///
    /// If the root has a `stdlib` entry the stubs live there. Every entry of
    /// the stub directory must start with a digit (`2`, `2and3`, `3.7`, ...).
    /// Returns the stub directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the typeshed is unset, unreadable, or contains
    /// an entry that is not version-numbered.
    pub fn locate_typeshed(typeshed: Option<&str>) -> Result<String> {
        let typeshed = typeshed
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::invalid("`typeshed` location must be defined"))?;

        let mut entries = Self::entries(typeshed)?;
        let mut located = typeshed.to_string();
        if entries.iter().any(|entry| entry == TYPESHED_STDLIB) {
            located = Path::new(typeshed)
                .join(TYPESHED_STDLIB)
                .display()
                .to_string();
            entries = Self::entries(&located)?;
        }

        let versioned = entries
            .iter()
            .all(|entry| entry.starts_with(|c: char| c.is_ascii_digit()));
        if !versioned {
            return Err(Error::invalid(
                "`typeshed` location must contain a stdlib directory which only contains \
                 subdirectories starting with a version number.",
            ));
        }

        Ok(located)
    }

    /// Every search path entry must be an existing directory.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first entry that is not a directory.
    pub fn check_search_path(search_path: &[String]) -> Result<()> {
        match search_path.iter().find(|path| !Path::new(path).is_dir()) {
            Some(path) => Err(Error::invalid(format!("`{path}` is not a valid directory"))),
            None => Ok(()),
        }
    }

    /// Names of the entries of a directory.
    fn entries(directory: &str) -> Result<Vec<String>> {
        let read_dir = fs::read_dir(directory).map_err(|e| {
            Error::invalid(format!(
                "`typeshed` location `{directory}` cannot be read: {e}"
            ))
        })?;

        let mut entries = Vec::new();
        for entry in read_dir {
            entries.push(entry?.file_name().to_string_lossy().into_owned());
        }
        Ok(entries)
    }
}

//! Environment variable layer.
//!
//! Environment lookups are captured in an [`Environment`] snapshot so the
//! resolver never reads process-global state behind the caller's back, and
//! tests can inject variables without `set_var`.

use std::collections::HashMap;
use std::env;
use std::path::Path;

use crate::configuration::merger::PartialConfiguration;

/// Unconditional override for the binary path.
pub const BINARY_OVERRIDE: &str = "PYRE_BINARY";

/// Unconditional override for the version hash.
pub const VERSION_HASH_OVERRIDE: &str = "PYRE_VERSION_HASH";

/// Colon-separated directories optionally imported into the search path.
pub const PYTHONPATH: &str = "PYTHONPATH";

/// A snapshot of environment variables.
///
/// Empty values are treated as unset.
///
/// # Examples
///
/// ```
/// use pyre_config::Environment;
///
/// let env = Environment::empty().with_var("PYRE_BINARY", "/opt/pyre.bin");
/// assert_eq!(env.get("PYRE_BINARY"), Some("/opt/pyre.bin"));
/// assert_eq!(env.get("PYRE_VERSION_HASH"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Captures the current process environment.
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    #[must_use]
    pub fn from_process() -> Self {
        let vars = env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// An environment without any variables.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns a copy with `key` set to `value`.
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Looks up a variable, treating empty values as unset.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Directories listed in `PYTHONPATH`.
    ///
    /// Entries that are not directories are dropped with a warning.
    #[must_use]
    pub fn pythonpath_directories(&self) -> Vec<String> {
        let Some(pythonpath) = self.get(PYTHONPATH) else {
            return Vec::new();
        };

        pythonpath
            .split(':')
            .filter(|path| {
                if Path::new(path).is_dir() {
                    true
                } else {
                    log::warn!("`{path}` is not a valid directory, dropping it from PYTHONPATH");
                    false
                }
            })
            .map(str::to_string)
            .collect()
    }

    /// Applies the override layer.
    ///
    /// `PYRE_BINARY` and `PYRE_VERSION_HASH` replace whatever the files
    /// provided.
    pub fn apply_overrides(&self, config: &mut PartialConfiguration) {
        if let Some(binary) = self.get(BINARY_OVERRIDE) {
            log::warn!("Binary overridden with `{binary}`");
            config.binary = Some(binary.to_string());
        }

        if let Some(version_hash) = self.get(VERSION_HASH_OVERRIDE) {
            log::warn!("Version hash overridden with `{version_hash}`");
            config.version_hash = Some(version_hash.to_string());
        }
    }
}

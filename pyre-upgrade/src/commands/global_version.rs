//! Global version update.
//!
//! Moves the project configuration to a new version hash while pinning every
//! local configuration to the hash it was using.

use std::path::{Path, PathBuf};

use serde_json::Value;

use pyre_config::configuration::local_configuration_file;

use super::{Command, Context};
use crate::error::Result;
use crate::project::{find_project_configuration, local_configuration_paths, ConfigurationDocument};
use crate::repository::{submit, SubmitOptions};

/// Paths containing this component hold test fixtures and are never pinned.
const MOCK_REPOSITORY: &str = "mock_repository";

/// Sets the global `version` and pins local configurations to the old one.
#[derive(Debug, Clone, Default)]
pub struct GlobalVersionUpdate {
    /// The new version hash.
    pub hash: String,
    /// Project directories to pin. Empty means every local configuration.
    pub paths: Vec<PathBuf>,
    /// Send the commit for review.
    pub submit: bool,
}

impl GlobalVersionUpdate {
    /// An update to `hash` over every local configuration.
    #[must_use]
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            ..Self::default()
        }
    }

    /// Restricts pinning to the given project directories.
    #[must_use]
    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    /// Sets whether to submit.
    #[must_use]
    pub const fn submit(mut self, submit: bool) -> Self {
        self.submit = submit;
        self
    }

    fn local_paths(&self, context: &Context<'_>, project_root: &Path) -> Vec<PathBuf> {
        if self.paths.is_empty() {
            local_configuration_paths(project_root)
        } else {
            self.paths
                .iter()
                .map(|path| context.resolve(path).join(local_configuration_file()))
                .collect()
        }
    }
}

/// Pins `path` to `version` unless it already has one or is differential.
fn pin_local(path: &Path, version: &Value) -> Result<bool> {
    let mut local = ConfigurationDocument::load(path)?;
    if local.has_version() {
        log::info!(
            "Skipping {} as it already has a custom version field.",
            path.display()
        );
        return Ok(false);
    }
    if local.is_differential() {
        log::info!("Skipping differential configuration at `{}`", path.display());
        return Ok(false);
    }
    local.set_version(version.clone());
    local.write()?;
    Ok(true)
}

impl Command for GlobalVersionUpdate {
    fn execute(&self, context: &Context<'_>) -> Result<()> {
        let project_path = find_project_configuration(&context.working_dir)?;
        let mut project = ConfigurationDocument::load(&project_path)?;
        let Some(old_version) = project.version_value().cloned() else {
            log::error!(
                "Global configuration at {} has no version field.",
                project_path.display()
            );
            return Ok(());
        };

        project.set_version(self.hash.as_str());
        project.write()?;
        log::info!("Updated {} from {old_version} to {}", project_path.display(), self.hash);

        let mut pinned = 0;
        for path in self.local_paths(context, project.directory()) {
            if path.to_string_lossy().contains(MOCK_REPOSITORY) {
                continue;
            }
            if pin_local(&path, &old_version)? {
                pinned += 1;
            }
        }
        log::info!("Pinned {pinned} local configurations to {old_version}");

        submit(
            context.repository,
            &SubmitOptions::new("Update pyre global configuration version")
                .with_summary(format!("Automatic upgrade to hash `{}`", self.hash))
                .submit(self.submit)
                .ignore_failures(true),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_pin_local_skips_existing_and_differential() {
        let temp = TempDir::new().unwrap();
        let pinned = temp.path().join("pinned.json");
        let differential = temp.path().join("differential.json");
        let plain = temp.path().join("plain.json");
        fs::write(&pinned, r#"{"version": "mine"}"#).unwrap();
        fs::write(&differential, r#"{"differential": true}"#).unwrap();
        fs::write(&plain, r#"{"targets": []}"#).unwrap();

        let old = Value::from("old");
        assert!(!pin_local(&pinned, &old).unwrap());
        assert!(!pin_local(&differential, &old).unwrap());
        assert!(pin_local(&plain, &old).unwrap());

        assert_eq!(
            ConfigurationDocument::load(&pinned).unwrap().version(),
            Some("mine")
        );
        assert!(!ConfigurationDocument::load(&differential).unwrap().has_version());
        assert_eq!(
            ConfigurationDocument::load(&plain).unwrap().version(),
            Some("old")
        );
    }

    #[test]
    fn test_builder() {
        let update = GlobalVersionUpdate::new("abc")
            .with_paths(vec![PathBuf::from("a")])
            .submit(true);
        assert_eq!(update.hash, "abc");
        assert_eq!(update.paths, vec![PathBuf::from("a")]);
        assert!(update.submit);
    }
}

//! Common test utilities for upgrade integration tests.
//!
//! This module provides:
//! - A repository layout in a temporary directory
//! - A repository fake that records submissions
//! - An error source that serves canned errors per project or target list

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use pyre_config::Environment;
use pyre_upgrade::{Context, ErrorSource, Repository, Result, SubmitOptions, TypeError};

/// A repository checkout in a temporary directory.
pub struct TestRepo {
    /// Temporary directory (kept alive for the duration of the test)
    temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestRepo {
    /// A checkout with a global configuration holding `contents`.
    pub fn with_global(contents: &str) -> Self {
        let repo = Self {
            temp_dir: tempfile::tempdir().expect("Failed to create temp dir"),
        };
        repo.write(".pyre_configuration", contents);
        repo
    }

    /// Root of the checkout.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes a file, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().expect("file has a parent"))
            .expect("Failed to create test directory");
        fs::write(&path, contents).expect("Failed to write test file");
        path
    }

    /// Reads a file.
    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root().join(relative)).expect("Failed to read test file")
    }

    /// Parses a file as JSON.
    pub fn json(&self, relative: &str) -> serde_json::Value {
        serde_json::from_str(&self.read(relative)).expect("Test file is not JSON")
    }

    /// A context rooted at the checkout with an empty environment.
    pub fn context<'a>(
        &self,
        repository: &'a dyn Repository,
        error_source: &'a dyn ErrorSource,
    ) -> Context<'a> {
        Context::new(self.root(), repository, error_source).with_environment(Environment::empty())
    }
}

/// Records every submission and formats according to a script.
#[derive(Default)]
pub struct RecordingRepository {
    pub submissions: RefCell<Vec<SubmitOptions>>,
    pub format_changes: Cell<bool>,
    pub formats: Cell<usize>,
    pub fail_submissions: bool,
}

#[allow(dead_code)]
impl RecordingRepository {
    /// A repository whose submissions fail.
    pub fn failing() -> Self {
        Self {
            fail_submissions: true,
            ..Self::default()
        }
    }

    /// Titles of the recorded submissions.
    pub fn titles(&self) -> Vec<String> {
        self.submissions
            .borrow()
            .iter()
            .map(|options| options.title.clone())
            .collect()
    }
}

impl Repository for RecordingRepository {
    fn format(&self) -> Result<bool> {
        self.formats.set(self.formats.get() + 1);
        Ok(self.format_changes.get())
    }

    fn submit_changes(&self, options: &SubmitOptions) -> Result<()> {
        self.submissions.borrow_mut().push(options.clone());
        if self.fail_submissions {
            return Err(pyre_upgrade::Error::SourceControl(
                "submission rejected".to_string(),
            ));
        }
        Ok(())
    }
}

/// Serves errors keyed by project directory or by the first target name.
#[derive(Default)]
pub struct CannedErrors {
    pub by_project: HashMap<PathBuf, Vec<TypeError>>,
    pub by_target: HashMap<String, Vec<TypeError>>,
    pub requests: RefCell<Vec<String>>,
}

#[allow(dead_code)]
impl CannedErrors {
    /// Adds an error for the project at `directory`.
    pub fn project_error(mut self, directory: &Path, error: TypeError) -> Self {
        self.by_project
            .entry(directory.to_path_buf())
            .or_default()
            .push(error);
        self
    }

    /// Adds an error returned when `target` is checked.
    pub fn target_error(mut self, target: &str, error: TypeError) -> Self {
        self.by_target
            .entry(target.to_string())
            .or_default()
            .push(error);
        self
    }
}

impl ErrorSource for CannedErrors {
    fn errors_for_project(&self, project_directory: &Path) -> Result<Vec<TypeError>> {
        self.requests
            .borrow_mut()
            .push(project_directory.display().to_string());
        Ok(self
            .by_project
            .get(project_directory)
            .cloned()
            .unwrap_or_default())
    }

    fn errors_for_targets(
        &self,
        _project_directory: &Path,
        targets: &[String],
    ) -> Result<Vec<TypeError>> {
        self.requests.borrow_mut().push(targets.join(" "));
        Ok(targets
            .iter()
            .filter_map(|target| self.by_target.get(target))
            .flatten()
            .cloned()
            .collect())
    }
}

/// A type error at `path:line`.
#[allow(dead_code)]
pub fn type_error(path: PathBuf, line: usize, code: u32, message: &str) -> TypeError {
    TypeError {
        path,
        line,
        column: 0,
        code,
        name: "Error".to_string(),
        description: format!("Error [{code}]: {message}"),
        concise_description: message.to_string(),
    }
}

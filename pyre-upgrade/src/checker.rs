//! Type errors reported by the checker.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;

use crate::error::{Error, Result};

/// One error from the checker's JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TypeError {
    /// File the error is in.
    pub path: PathBuf,
    /// One-based line number.
    pub line: usize,
    /// Column of the error.
    #[serde(default)]
    pub column: usize,
    /// Numeric error code.
    pub code: u32,
    /// Short error kind name.
    #[serde(default)]
    pub name: String,
    /// Full message, prefixed with `<name> [<code>]: `.
    pub description: String,
    /// Abbreviated message.
    #[serde(default)]
    pub concise_description: String,
}

impl TypeError {
    /// The description without its `Name [code]: ` prefix.
    ///
    /// # Examples
    ///
    /// ```
    /// use pyre_upgrade::TypeError;
    ///
    /// let error: TypeError = serde_json::from_str(
    ///     r#"{"path": "a.py", "line": 1, "code": 7, "description": "Incompatible return type [7]: Expected `int`."}"#,
    /// ).unwrap();
    /// assert_eq!(error.message(), "Expected `int`.");
    /// ```
    #[must_use]
    pub fn message(&self) -> &str {
        self.description
            .split_once("]: ")
            .map_or(self.description.as_str(), |(_, message)| message)
    }
}

/// Parses the checker's stdout.
///
/// Empty output means no errors. Relative paths are resolved against
/// `project_directory`.
///
/// # Errors
///
/// Returns [`Error::InvalidErrorOutput`] if the output is not a JSON list of
/// errors.
pub fn parse_errors(output: &str, project_directory: &Path) -> Result<Vec<TypeError>> {
    if output.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut errors: Vec<TypeError> =
        serde_json::from_str(output).map_err(|e| Error::InvalidErrorOutput {
            reason: e.to_string(),
        })?;
    for error in &mut errors {
        if error.path.is_relative() {
            error.path = project_directory.join(&error.path);
        }
    }
    Ok(errors)
}

/// Something that can report type errors for a project.
#[cfg_attr(test, mockall::automock)]
pub trait ErrorSource {
    /// Errors for the project rooted at `project_directory`.
    ///
    /// # Errors
    ///
    /// Returns an error if the checker cannot be run or its output is invalid.
    fn errors_for_project(&self, project_directory: &Path) -> Result<Vec<TypeError>>;

    /// Errors for the given build targets.
    ///
    /// # Errors
    ///
    /// Returns an error if the checker cannot be run or its output is invalid.
    fn errors_for_targets(
        &self,
        project_directory: &Path,
        targets: &[String],
    ) -> Result<Vec<TypeError>>;
}

/// Where a command takes its first round of type errors from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ErrorInput {
    /// Run the [`ErrorSource`].
    #[default]
    Generate,
    /// Checker output captured beforehand, usually from standard input.
    Read(String),
}

impl ErrorInput {
    /// Captures checker output from `reader`.
    ///
    /// # Errors
    ///
    /// Returns an error if `reader` fails or does not yield UTF-8.
    pub fn read(mut reader: impl Read) -> Result<Self> {
        let mut output = String::new();
        reader.read_to_string(&mut output)?;
        Ok(Self::Read(output))
    }

    /// Errors for the project rooted at `project_directory`.
    ///
    /// # Errors
    ///
    /// Returns an error if the checker fails or the output cannot be parsed.
    pub fn errors_for_project(
        &self,
        source: &dyn ErrorSource,
        project_directory: &Path,
    ) -> Result<Vec<TypeError>> {
        match self {
            Self::Generate => source.errors_for_project(project_directory),
            Self::Read(output) => parse_errors(output, project_directory),
        }
    }
}

/// Runs the checker executable and parses its JSON output.
#[derive(Debug, Clone)]
pub struct CheckerCommand {
    program: PathBuf,
}

impl CheckerCommand {
    /// A checker run through `program`.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The arguments for a check, optionally restricted to targets.
    #[must_use]
    pub fn arguments(targets: &[String]) -> Vec<String> {
        let mut arguments = vec!["--output=json".to_string()];
        if !targets.is_empty() {
            arguments.push("--targets".to_string());
            arguments.extend(targets.iter().cloned());
        }
        arguments.push("check".to_string());
        arguments
    }

    fn run(&self, project_directory: &Path, targets: &[String]) -> Result<Vec<TypeError>> {
        let arguments = Self::arguments(targets);
        let command_line = format!("{} {}", self.program.display(), arguments.join(" "));
        log::debug!("Running `{command_line}` in {}", project_directory.display());

        let output = Command::new(&self.program)
            .args(&arguments)
            .current_dir(project_directory)
            .output()
            .map_err(|e| Error::ExternalCommand {
                command: command_line.clone(),
                reason: e.to_string(),
            })?;

        // Exit status 1 means type errors were found.
        match output.status.code() {
            Some(0 | 1) => {}
            _ => {
                return Err(Error::ExternalCommand {
                    command: command_line,
                    reason: format!(
                        "{}: {}",
                        output.status,
                        String::from_utf8_lossy(&output.stderr).trim()
                    ),
                })
            }
        }

        parse_errors(&String::from_utf8_lossy(&output.stdout), project_directory)
    }
}

impl Default for CheckerCommand {
    fn default() -> Self {
        Self::new("pyre")
    }
}

impl ErrorSource for CheckerCommand {
    fn errors_for_project(&self, project_directory: &Path) -> Result<Vec<TypeError>> {
        self.run(project_directory, &[])
    }

    fn errors_for_targets(
        &self,
        project_directory: &Path,
        targets: &[String],
    ) -> Result<Vec<TypeError>> {
        self.run(project_directory, targets)
    }
}

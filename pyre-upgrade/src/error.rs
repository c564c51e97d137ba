//! Error types for the upgrade tooling.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for upgrade operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for upgrade operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Resolving a configuration failed.
    #[error(transparent)]
    Configuration(#[from] pyre_config::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON document could not be parsed or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No `.pyre_configuration` exists in or above the starting directory.
    #[error("no project configuration found above {}", start.display())]
    ProjectConfigurationNotFound {
        /// Directory the search started from.
        start: PathBuf,
    },

    /// A configuration file does not hold a JSON object.
    #[error("configuration at {} is not a JSON object", path.display())]
    NotAnObject {
        /// Path of the offending file.
        path: PathBuf,
    },

    /// An external command could not be run or failed.
    #[error("`{command}` failed: {reason}")]
    ExternalCommand {
        /// The command line.
        command: String,
        /// What went wrong.
        reason: String,
    },

    /// The checker produced output that is not a list of errors.
    #[error("could not parse type errors: {reason}")]
    InvalidErrorOutput {
        /// Parse failure details.
        reason: String,
    },

    /// The source-control collaborator reported a failure.
    #[error("source control error: {0}")]
    SourceControl(String),
}

/// Process exit status for a finished upgrade operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// The operation completed.
    Success,
    /// The operation failed.
    Failure,
}

impl ExitCode {
    /// Numeric exit status.
    ///
    /// # Examples
    ///
    /// ```
    /// use pyre_upgrade::ExitCode;
    ///
    /// assert_eq!(ExitCode::Success.code(), 0);
    /// assert_eq!(ExitCode::Failure.code(), 2);
    /// ```
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure => 2,
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

impl<T> From<&Result<T>> for ExitCode {
    fn from(result: &Result<T>) -> Self {
        if result.is_ok() {
            Self::Success
        } else {
            Self::Failure
        }
    }
}

//! Error types for configuration resolution.
//!
//! Resolution distinguishes the narrow [`Error::InvalidConfiguration`] raised
//! by individual validation rules from the user-facing [`Error::Environment`]
//! that [`Configuration::validate`](crate::Configuration::validate) reports.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for operations that may fail with a configuration error.
///
/// # Examples
///
/// ```
/// use pyre_config::{Error, Result};
///
/// fn example_operation() -> Result<usize> {
///     Ok(4)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for configuration resolution.
#[derive(Debug, Error)]
pub enum Error {
    /// A single validation rule was violated.
    #[error("{reason}")]
    InvalidConfiguration {
        /// Description of the violated rule.
        reason: String,
    },

    /// The configuration cannot be used in this environment.
    ///
    /// This is the wrapped form returned by validation.
    #[error("{message}")]
    Environment {
        /// User-facing message.
        message: String,
    },

    /// A configuration file exists but is not a valid JSON object.
    #[error("Configuration file at `{}` is invalid: {source}.", path.display())]
    MalformedFile {
        /// Path of the offending file.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A resolved accessor was used before the configuration was resolved.
    #[error("Configuration was not validated")]
    NotValidated,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Builds an [`Error::InvalidConfiguration`] from a message.
    ///
    /// # Examples
    ///
    /// ```
    /// use pyre_config::Error;
    ///
    /// let err = Error::invalid("`binary` location must be defined");
    /// assert_eq!(err.to_string(), "`binary` location must be defined");
    /// ```
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Wraps a validation failure into the user-facing environment error.
    ///
    /// Errors that are not [`Error::InvalidConfiguration`] are returned
    /// unchanged.
    #[must_use]
    pub fn into_environment(self) -> Self {
        match self {
            Self::InvalidConfiguration { reason } => Self::Environment {
                message: format!("Invalid configuration: {reason}."),
            },
            other => other,
        }
    }

    /// Check if the error stems from configuration content (as opposed to
    /// I/O or lifecycle misuse).
    ///
    /// # Examples
    ///
    /// ```
    /// use pyre_config::Error;
    ///
    /// assert!(Error::invalid("bad").is_configuration_error());
    /// assert!(!Error::NotValidated.is_configuration_error());
    /// ```
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration { .. }
                | Self::Environment { .. }
                | Self::MalformedFile { .. }
        )
    }
}

//! Upgrade operations.
//!
//! - `global_version`: pin local configurations and bump the global version
//! - `fixme`: suppress errors in one or every local project, or in captured
//!   checker output
//! - `fixme_targets`: suppress errors in type-checked build targets

pub mod fixme;
pub mod fixme_targets;
pub mod global_version;

pub use fixme::{Fixme, FixmeAll, FixmeOptions, FixmeSingle};
pub use fixme_targets::FixmeTargets;
pub use global_version::GlobalVersionUpdate;

use std::path::{Path, PathBuf};

use pyre_config::Environment;

use crate::checker::ErrorSource;
use crate::error::{ExitCode, Result};
use crate::repository::Repository;

/// What every operation runs against.
pub struct Context<'a> {
    /// Directory the operation was started from.
    pub working_dir: PathBuf,
    /// Environment used when resolving configurations.
    pub environment: Environment,
    /// Source control.
    pub repository: &'a dyn Repository,
    /// Where type errors come from.
    pub error_source: &'a dyn ErrorSource,
}

impl<'a> Context<'a> {
    /// A context rooted at `working_dir` with the process environment.
    #[must_use]
    pub fn new(
        working_dir: impl Into<PathBuf>,
        repository: &'a dyn Repository,
        error_source: &'a dyn ErrorSource,
    ) -> Self {
        Self {
            working_dir: working_dir.into(),
            environment: Environment::from_process(),
            repository,
            error_source,
        }
    }

    /// Replaces the environment snapshot.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// `path` resolved against the working directory.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.working_dir.join(path)
    }
}

/// An upgrade operation.
pub trait Command {
    /// Runs the operation.
    ///
    /// # Errors
    ///
    /// Returns the first error that stopped the operation.
    fn execute(&self, context: &Context<'_>) -> Result<()>;
}

/// Runs `command`, logging any failure, and maps the outcome to an exit code.
pub fn run_command(command: &dyn Command, context: &Context<'_>) -> ExitCode {
    let result = command.execute(context);
    if let Err(e) = &result {
        log::error!("{e}");
    }
    ExitCode::from(&result)
}

/// `path` relative to `root`, or `path` itself when it is outside `root`.
fn relative_to<'p>(path: &'p Path, root: &Path) -> &'p Path {
    path.strip_prefix(root).unwrap_or(path)
}

//! Error suppression for type-checked build targets.

use std::path::{Path, PathBuf};

use super::{relative_to, Command, Context};
use crate::error::Result;
use crate::project::find_project_configuration;
use crate::repository::{submit, SubmitOptions};
use crate::suppress::Suppressor;
use crate::targets::{find_targets, Target};

/// Suffix of the generated type-checking rule for a target.
const TYPECHECK_SUFFIX: &str = "-pyre-typecheck";

/// Suppresses errors in every type-checked target below a directory.
#[derive(Debug, Clone, Default)]
pub struct FixmeTargets {
    /// Directory to search. Defaults to the project root.
    pub subdirectory: Option<PathBuf>,
    /// Only suppress errors with this code.
    pub only_fix_error_code: Option<u32>,
    /// Leave the changes uncommitted.
    pub no_commit: bool,
    /// Send the commit for review.
    pub submit: bool,
    /// Run the formatter and suppress again if it changed anything.
    pub lint: bool,
}

/// The type-checking rule names for the targets of one `TARGETS` file.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use pyre_upgrade::targets::Target;
/// use pyre_upgrade::commands::fixme_targets::typecheck_target_names;
///
/// let targets = [Target { name: "library".to_string(), strict: false }];
/// assert_eq!(
///     typecheck_target_names(Path::new("a/b"), &targets),
///     vec!["a/b:library-pyre-typecheck"]
/// );
/// ```
#[must_use]
pub fn typecheck_target_names(directory: &Path, targets: &[Target]) -> Vec<String> {
    targets
        .iter()
        .map(|target| {
            format!(
                "{}:{}{TYPECHECK_SUFFIX}",
                directory.display(),
                target.name
            )
        })
        .collect()
}

impl FixmeTargets {
    fn suppressor(&self) -> Suppressor {
        Suppressor::new().only_fix_error_code(self.only_fix_error_code)
    }

    fn fix_targets_file(
        &self,
        context: &Context<'_>,
        project_directory: &Path,
        path: &Path,
        targets: &[Target],
    ) -> Result<()> {
        log::info!("Processing {}...", path.display());
        let directory = relative_to(path.parent().unwrap_or(path), project_directory);
        let names = typecheck_target_names(directory, targets);

        let errors = context
            .error_source
            .errors_for_targets(project_directory, &names)?;
        if errors.is_empty() {
            return Ok(());
        }
        log::info!("Found {} type errors in {}.", errors.len(), path.display());
        self.suppressor().suppress(&errors)?;

        if !self.lint || !context.repository.format()? {
            return Ok(());
        }
        let errors = context
            .error_source
            .errors_for_targets(project_directory, &names)?;
        if errors.is_empty() {
            log::info!("Errors unchanged after linting.");
            return Ok(());
        }
        log::info!("Found {} type errors after linting.", errors.len());
        self.suppressor().suppress(&errors)?;
        Ok(())
    }
}

impl Command for FixmeTargets {
    fn execute(&self, context: &Context<'_>) -> Result<()> {
        let subdirectory = self.subdirectory.as_deref().map(|sub| context.resolve(sub));
        let start = subdirectory.as_deref().unwrap_or(&context.working_dir);
        let project = find_project_configuration(start)?;
        let project_directory = project.parent().unwrap_or(Path::new("/"));
        let search_root = subdirectory.as_deref().unwrap_or(project_directory);

        let all_targets = find_targets(search_root)?;
        if all_targets.is_empty() {
            log::info!("No type-checked targets below {}", search_root.display());
            return Ok(());
        }
        for (path, targets) in &all_targets {
            self.fix_targets_file(context, project_directory, &search_root.join(path), targets)?;
        }

        let display = self.subdirectory.as_deref().unwrap_or(project_directory);
        submit(
            context.repository,
            &SubmitOptions::new(format!(
                "Upgrade pyre version for {} (TARGETS)",
                display.display()
            ))
            .commit(!self.no_commit)
            .submit(self.submit),
        )
    }
}

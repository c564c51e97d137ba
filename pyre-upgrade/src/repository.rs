//! The source-control collaborator.

use crate::error::Result;

/// Options for [`Repository::submit_changes`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitOptions {
    /// Commit the working changes first.
    pub commit: bool,
    /// Send the commit for review.
    pub submit: bool,
    /// Commit title.
    pub title: String,
    /// Commit summary.
    pub summary: Option<String>,
    /// Log failures instead of returning them.
    pub ignore_failures: bool,
}

impl SubmitOptions {
    /// Options that commit with `title`.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            commit: true,
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the summary.
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets whether to commit.
    #[must_use]
    pub const fn commit(mut self, commit: bool) -> Self {
        self.commit = commit;
        self
    }

    /// Sets whether to submit.
    #[must_use]
    pub const fn submit(mut self, submit: bool) -> Self {
        self.submit = submit;
        self
    }

    /// Sets whether failures are ignored.
    #[must_use]
    pub const fn ignore_failures(mut self, ignore: bool) -> Self {
        self.ignore_failures = ignore;
        self
    }
}

/// Format and submit operations on the working copy.
#[cfg_attr(test, mockall::automock)]
pub trait Repository {
    /// Runs the formatter, returning whether it changed anything.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::SourceControl`] if the formatter fails.
    fn format(&self) -> Result<bool>;

    /// Commits and optionally submits the working changes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::SourceControl`] if the submission fails.
    fn submit_changes(&self, options: &SubmitOptions) -> Result<()>;
}

/// Submits through `repository`, honouring `ignore_failures`.
///
/// # Errors
///
/// Returns the repository's error unless failures are ignored.
pub fn submit(repository: &dyn Repository, options: &SubmitOptions) -> Result<()> {
    log::info!("Submitting changes: {}", options.title);
    match repository.submit_changes(options) {
        Err(e) if options.ignore_failures => {
            log::warn!("Ignoring failed submission: {e}");
            Ok(())
        }
        result => result,
    }
}

//! Error suppression for local projects and for captured checker output.

use std::io::Read;
use std::path::{Path, PathBuf};

use pyre_config::configuration::local_configuration_file;
use pyre_config::ConfigurationBuilder;

use super::{relative_to, Command, Context};
use crate::checker::{parse_errors, ErrorInput};
use crate::error::Result;
use crate::project::{find_project_configuration, ConfigurationDocument};
use crate::repository::{submit, SubmitOptions};
use crate::suppress::{SuppressionReport, Suppressor};

/// Options shared by the project fixme commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixmeOptions {
    /// Only suppress errors with this code.
    pub only_fix_error_code: Option<u32>,
    /// Drop the project's version pin before checking.
    pub upgrade_version: bool,
    /// Leave the changes uncommitted.
    pub no_commit: bool,
    /// Send the commit for review.
    pub submit: bool,
    /// Run the formatter and suppress again if it changed anything.
    pub lint: bool,
}

impl FixmeOptions {
    fn suppressor(self) -> Suppressor {
        Suppressor::new().only_fix_error_code(self.only_fix_error_code)
    }

    /// Checks the project of `local`, suppresses its errors and submits.
    ///
    /// Returns what was suppressed. Disabled projects are skipped, and with
    /// `upgrade_version` so are projects without a version pin. The first
    /// round of errors comes from `input`. The re-check after linting always
    /// runs the checker.
    fn suppress_errors_in_project(
        self,
        context: &Context<'_>,
        input: &ErrorInput,
        local: &mut ConfigurationDocument,
        project_root: &Path,
    ) -> Result<SuppressionReport> {
        let directory = local.directory().to_path_buf();
        let name = relative_to(&directory, project_root).display().to_string();

        let configuration = ConfigurationBuilder::new()
            .with_local_configuration(local.path())
            .with_working_dir(project_root)
            .with_environment(context.environment.clone())
            .build()?;
        if configuration.disabled() {
            log::info!("Skipping disabled project {name}");
            return Ok(SuppressionReport::default());
        }

        let mut upgraded = false;
        if self.upgrade_version {
            let Some(version) = local.remove_version() else {
                log::info!("Skipping {name}, it has no version pin");
                return Ok(SuppressionReport::default());
            };
            local.write()?;
            log::info!("Removed version pin {version} from {name}");
            upgraded = true;
        }

        log::info!("Processing {name}...");
        let suppressor = self.suppressor();
        let errors = input.errors_for_project(context.error_source, &directory)?;
        if errors.is_empty() {
            log::info!("No errors in {name}");
        }
        let mut report = suppressor.suppress(&errors)?;

        if self.lint && context.repository.format()? {
            let errors = context.error_source.errors_for_project(&directory)?;
            log::info!("Found {} type errors after linting.", errors.len());
            report.extend(suppressor.suppress(&errors)?);
        }

        if upgraded || !report.is_empty() {
            submit(
                context.repository,
                &SubmitOptions::new(format!("Update pyre version for {name}"))
                    .with_summary(format!("Suppressed {} errors", report.suppressed))
                    .commit(!self.no_commit)
                    .submit(self.submit),
            )?;
        }
        Ok(report)
    }
}

/// Suppresses errors in the project at one directory.
#[derive(Debug, Clone, Default)]
pub struct FixmeSingle {
    /// Directory holding the `.pyre_configuration.local`.
    pub path: PathBuf,
    /// Shared options.
    pub options: FixmeOptions,
    /// Where the errors come from.
    pub input: ErrorInput,
}

impl FixmeSingle {
    /// Suppression for the project at `path`, running the checker.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, options: FixmeOptions) -> Self {
        Self {
            path: path.into(),
            options,
            input: ErrorInput::Generate,
        }
    }

    /// Takes the errors from `input` instead.
    #[must_use]
    pub fn with_error_input(mut self, input: ErrorInput) -> Self {
        self.input = input;
        self
    }
}

impl Command for FixmeSingle {
    fn execute(&self, context: &Context<'_>) -> Result<()> {
        let project = find_project_configuration(&context.working_dir)?;
        let project_root = project.parent().unwrap_or(Path::new("/"));
        let path = context.resolve(&self.path).join(local_configuration_file());

        let mut local = ConfigurationDocument::load(&path)?;
        self.options
            .suppress_errors_in_project(context, &self.input, &mut local, project_root)?;
        Ok(())
    }
}

/// Suppresses errors in every local project.
#[derive(Debug, Clone, Default)]
pub struct FixmeAll {
    /// Shared options.
    pub options: FixmeOptions,
}

impl FixmeAll {
    /// Suppression for every project.
    #[must_use]
    pub const fn new(options: FixmeOptions) -> Self {
        Self { options }
    }
}

impl Command for FixmeAll {
    fn execute(&self, context: &Context<'_>) -> Result<()> {
        let project = find_project_configuration(&context.working_dir)?;
        let project_root = project.parent().unwrap_or(Path::new("/"));

        let mut total = SuppressionReport::default();
        for mut local in ConfigurationDocument::gather_local(project_root)? {
            let report = self.options.suppress_errors_in_project(
                context,
                &ErrorInput::Generate,
                &mut local,
                project_root,
            )?;
            total.extend(report);
        }
        log::info!(
            "Suppressed {} errors in {} files",
            total.suppressed,
            total.files.len()
        );
        Ok(())
    }
}

/// Suppresses the errors in captured checker output.
///
/// Relative paths in the output are resolved against the working directory.
/// Nothing is committed.
#[derive(Debug, Clone, Default)]
pub struct Fixme {
    /// The checker's JSON output.
    pub output: String,
    /// Only suppress errors with this code.
    pub only_fix_error_code: Option<u32>,
}

impl Fixme {
    /// Suppression of the errors in `output`.
    #[must_use]
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            only_fix_error_code: None,
        }
    }

    /// Suppression of the errors read from `reader`, usually standard input.
    ///
    /// # Errors
    ///
    /// Returns an error if `reader` fails or does not yield UTF-8.
    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut output = String::new();
        reader.read_to_string(&mut output)?;
        Ok(Self::new(output))
    }

    /// Restricts suppression to a single error code.
    #[must_use]
    pub const fn only_fix_error_code(mut self, code: Option<u32>) -> Self {
        self.only_fix_error_code = code;
        self
    }
}

impl Command for Fixme {
    fn execute(&self, context: &Context<'_>) -> Result<()> {
        let errors = parse_errors(&self.output, &context.working_dir)?;
        if errors.is_empty() {
            log::info!("No errors to suppress.");
            return Ok(());
        }
        let report = Suppressor::new()
            .only_fix_error_code(self.only_fix_error_code)
            .suppress(&errors)?;
        log::info!(
            "Suppressed {} errors in {} files",
            report.suppressed,
            report.files.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{MockErrorSource, TypeError};
    use crate::repository::MockRepository;
    use pyre_config::Environment;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".pyre_configuration"), r#"{"version": "v"}"#).unwrap();
        fs::create_dir_all(temp.path().join("proj")).unwrap();
        fs::write(temp.path().join("proj/module.py"), "x: int = ''\n").unwrap();
        temp
    }

    fn error(path: PathBuf) -> TypeError {
        TypeError {
            path,
            line: 1,
            column: 0,
            code: 9,
            name: "Incompatible variable type".to_string(),
            description: "Incompatible variable type [9]: x is declared to have type `int`."
                .to_string(),
            concise_description: String::new(),
        }
    }

    #[test]
    fn test_fixme_single_suppresses_and_submits() {
        let temp = project();
        fs::write(temp.path().join("proj/.pyre_configuration.local"), "{}").unwrap();
        let module = temp.path().join("proj/module.py");

        let mut error_source = MockErrorSource::new();
        let returned = error(module.clone());
        error_source
            .expect_errors_for_project()
            .times(1)
            .returning(move |_| Ok(vec![returned.clone()]));
        let mut repository = MockRepository::new();
        repository
            .expect_submit_changes()
            .withf(|options| options.title == "Update pyre version for proj" && options.commit)
            .times(1)
            .returning(|_| Ok(()));

        let context = Context::new(temp.path(), &repository, &error_source)
            .with_environment(Environment::empty());
        FixmeSingle::new("proj", FixmeOptions::default())
            .execute(&context)
            .unwrap();

        assert_eq!(
            fs::read_to_string(module).unwrap(),
            "# pyre-fixme[9]: x is declared to have type `int`.\nx: int = ''\n"
        );
    }

    #[test]
    fn test_disabled_project_is_skipped() {
        let temp = project();
        fs::write(
            temp.path().join("proj/.pyre_configuration.local"),
            r#"{"disabled": true}"#,
        )
        .unwrap();

        let error_source = MockErrorSource::new();
        let repository = MockRepository::new();
        let context = Context::new(temp.path(), &repository, &error_source)
            .with_environment(Environment::empty());

        FixmeSingle::new("proj", FixmeOptions::default())
            .execute(&context)
            .unwrap();
    }

    #[test]
    fn test_upgrade_version_without_pin_is_skipped() {
        let temp = project();
        fs::write(temp.path().join("proj/.pyre_configuration.local"), "{}").unwrap();

        let error_source = MockErrorSource::new();
        let repository = MockRepository::new();
        let context = Context::new(temp.path(), &repository, &error_source)
            .with_environment(Environment::empty());
        let options = FixmeOptions {
            upgrade_version: true,
            ..FixmeOptions::default()
        };

        FixmeSingle::new("proj", options).execute(&context).unwrap();
    }

    #[test]
    fn test_lint_reruns_checker_after_format() {
        let temp = project();
        fs::write(temp.path().join("proj/.pyre_configuration.local"), "{}").unwrap();
        let module = temp.path().join("proj/module.py");

        let mut error_source = MockErrorSource::new();
        let returned = error(module);
        error_source
            .expect_errors_for_project()
            .times(2)
            .returning(move |_| Ok(vec![returned.clone()]));
        let mut repository = MockRepository::new();
        repository.expect_format().times(1).returning(|| Ok(true));
        repository
            .expect_submit_changes()
            .times(1)
            .returning(|_| Ok(()));

        let context = Context::new(temp.path(), &repository, &error_source)
            .with_environment(Environment::empty());
        let options = FixmeOptions {
            lint: true,
            ..FixmeOptions::default()
        };
        FixmeAll::new(options).execute(&context).unwrap();
    }

    const CAPTURED: &str = r#"[{
        "path": "module.py",
        "line": 1,
        "code": 9,
        "description": "Incompatible variable type [9]: x is declared to have type `int`."
    }]"#;

    #[test]
    fn test_fixme_single_reads_captured_errors() {
        let temp = project();
        fs::write(temp.path().join("proj/.pyre_configuration.local"), "{}").unwrap();

        let error_source = MockErrorSource::new();
        let mut repository = MockRepository::new();
        repository
            .expect_submit_changes()
            .times(1)
            .returning(|_| Ok(()));

        let context = Context::new(temp.path(), &repository, &error_source)
            .with_environment(Environment::empty());
        let input = ErrorInput::read(CAPTURED.as_bytes()).unwrap();
        FixmeSingle::new("proj", FixmeOptions::default())
            .with_error_input(input)
            .execute(&context)
            .unwrap();

        assert_eq!(
            fs::read_to_string(temp.path().join("proj/module.py")).unwrap(),
            "# pyre-fixme[9]: x is declared to have type `int`.\nx: int = ''\n"
        );
    }

    #[test]
    fn test_fixme_suppresses_output_from_reader() {
        let temp = project();
        let working_dir = temp.path().join("proj");

        let error_source = MockErrorSource::new();
        let repository = MockRepository::new();
        let context = Context::new(&working_dir, &repository, &error_source)
            .with_environment(Environment::empty());
        Fixme::from_reader(CAPTURED.as_bytes())
            .unwrap()
            .execute(&context)
            .unwrap();

        assert_eq!(
            fs::read_to_string(working_dir.join("module.py")).unwrap(),
            "# pyre-fixme[9]: x is declared to have type `int`.\nx: int = ''\n"
        );
    }

    #[test]
    fn test_fixme_respects_only_fix_error_code() {
        let temp = project();
        let working_dir = temp.path().join("proj");

        let error_source = MockErrorSource::new();
        let repository = MockRepository::new();
        let context = Context::new(&working_dir, &repository, &error_source)
            .with_environment(Environment::empty());
        Fixme::new(CAPTURED)
            .only_fix_error_code(Some(7))
            .execute(&context)
            .unwrap();

        assert_eq!(
            fs::read_to_string(working_dir.join("module.py")).unwrap(),
            "x: int = ''\n"
        );
    }

    #[test]
    fn test_fixme_with_empty_output_does_nothing() {
        let temp = project();
        let error_source = MockErrorSource::new();
        let repository = MockRepository::new();
        let context = Context::new(temp.path(), &repository, &error_source)
            .with_environment(Environment::empty());

        Fixme::from_reader(&b""[..]).unwrap().execute(&context).unwrap();
    }
}

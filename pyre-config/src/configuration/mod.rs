//! Layered configuration for the type checker.
//!
//! A [`Configuration`] is assembled from up to three JSON files, the
//! environment, and computed defaults:
//!
//! 1. the explicit local configuration (or `<dir>/.pyre_configuration.local`)
//! 2. `.pyre_configuration.local` in the working directory
//! 3. `.pyre_configuration` in the working directory
//! 4. `PYRE_BINARY` / `PYRE_VERSION_HASH`
//! 5. defaults (`PATH` lookup, worker count, typeshed discovery)
//!
//! Files only fill fields that are still unset, except `search_path`, which
//! accumulates, and `disabled`, which sticks once set. The environment
//! overrides replace file values.
//!
//! Loading never validates. Callers check [`Configuration::disabled`] and then
//! call [`Configuration::validate`], after which the resolved accessors are
//! available.
//!
//! # Examples
//!
//! ```
//! use pyre_config::{ConfigurationBuilder, Environment};
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(
//!     dir.path().join(".pyre_configuration"),
//!     r#"{"binary": "/opt/pyre-%V/pyre.bin", "version": "abc123", "workers": 2}"#,
//! )
//! .unwrap();
//!
//! let configuration = ConfigurationBuilder::new()
//!     .with_working_dir(dir.path())
//!     .with_environment(Environment::empty())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(configuration.unresolved_binary(), Some("/opt/pyre-abc123/pyre.bin"));
//! assert_eq!(configuration.source_directories(), ["."]);
//! assert_eq!(configuration.number_of_workers(), 2);
//! ```

pub mod builder;
pub mod defaults;
pub mod environment;
pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

pub use builder::ConfigurationBuilder;
pub use environment::Environment;
pub use loader::{Candidate, CandidateKind, ConfigurationLoader};
pub use merger::{ConfigurationMerger, Field, MergeRule, PartialConfiguration, Setting};
pub use schema::{
    local_configuration_file, ConfigurationFile, StringList, BINARY_NAME, CONFIGURATION_FILE,
    LOCAL_SUFFIX, VERSION_PLACEHOLDER,
};
pub use validator::ConfigurationValidator;

use crate::error::{Error, Result};

/// Values computed by [`Configuration::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedPaths {
    binary: String,
    search_path: Vec<String>,
}

/// A fully merged configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    source_directories: StringList,
    targets: StringList,
    autogenerated: StringList,
    logger: Option<String>,
    number_of_workers: i64,
    binary: Option<String>,
    version_hash: Option<String>,
    typeshed: Option<String>,
    search_directories: Vec<String>,
    disabled: bool,
    resolved: Option<ResolvedPaths>,
}

impl Configuration {
    /// Builds a configuration from merged values that already went through
    /// substitution and defaults.
    #[must_use]
    pub fn from_partial(partial: PartialConfiguration) -> Self {
        Self {
            source_directories: partial.source_directories,
            targets: partial.targets,
            autogenerated: partial.autogenerated,
            logger: partial.logger,
            number_of_workers: partial.workers.unwrap_or_default(),
            binary: partial.binary,
            version_hash: partial.version_hash,
            typeshed: partial.typeshed,
            search_directories: partial.search_directories,
            disabled: partial.disabled,
            resolved: None,
        }
    }

    /// Checks every invariant and resolves the accessors.
    ///
    /// The typeshed path is replaced by its `stdlib` child when it has one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Environment`] wrapping the first violated rule.
    pub fn validate(&mut self) -> Result<()> {
        self.check().map_err(Error::into_environment)
    }

    fn check(&mut self) -> Result<()> {
        ConfigurationValidator::check_lists(
            &self.source_directories,
            &self.targets,
            &self.autogenerated,
        )?;
        ConfigurationValidator::check_binary(self.binary.as_deref())?;
        ConfigurationValidator::check_workers(self.number_of_workers)?;

        let typeshed = ConfigurationValidator::locate_typeshed(self.typeshed.as_deref())?;
        if self.resolved.is_none() {
            self.typeshed = Some(typeshed);
        }
        self.resolve()?;

        ConfigurationValidator::check_search_path(self.search_path()?)
    }

    /// Computes the binary path and search path once.
    ///
    /// Later calls keep the first result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotValidated`] when the binary or typeshed is unset.
    pub fn resolve(&mut self) -> Result<()> {
        if self.resolved.is_some() {
            return Ok(());
        }

        let binary = self
            .binary
            .clone()
            .filter(|b| !b.is_empty())
            .ok_or(Error::NotValidated)?;
        let typeshed = self
            .typeshed
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or(Error::NotValidated)?;

        let mut search_path = self.search_directories.clone();
        if !search_path.contains(&typeshed) {
            search_path.push(typeshed);
        }

        self.resolved = Some(ResolvedPaths {
            binary,
            search_path,
        });
        Ok(())
    }

    /// The resolved binary path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotValidated`] before [`Configuration::resolve`].
    pub fn binary(&self) -> Result<&str> {
        self.resolved
            .as_ref()
            .map(|resolved| resolved.binary.as_str())
            .ok_or(Error::NotValidated)
    }

    /// The resolved search path: accumulated search directories followed by
    /// the typeshed directory (once).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotValidated`] before [`Configuration::resolve`].
    pub fn search_path(&self) -> Result<&[String]> {
        self.resolved
            .as_ref()
            .map(|resolved| resolved.search_path.as_slice())
            .ok_or(Error::NotValidated)
    }

    /// Whether any configuration file disabled the checker.
    #[must_use]
    pub fn disabled(&self) -> bool {
        self.disabled
    }

    /// The version hash, if any.
    #[must_use]
    pub fn version_hash(&self) -> Option<&str> {
        self.version_hash.as_deref()
    }

    /// Source directories (empty if the field is malformed).
    #[must_use]
    pub fn source_directories(&self) -> &[String] {
        self.source_directories.as_slice()
    }

    /// Build targets (empty if the field is malformed).
    #[must_use]
    pub fn targets(&self) -> &[String] {
        self.targets.as_slice()
    }

    /// Generated code paths (empty if the field is malformed).
    #[must_use]
    pub fn autogenerated(&self) -> &[String] {
        self.autogenerated.as_slice()
    }

    /// Logging hook.
    #[must_use]
    pub fn logger(&self) -> Option<&str> {
        self.logger.as_deref()
    }

    /// Number of analysis workers.
    #[must_use]
    pub fn number_of_workers(&self) -> i64 {
        self.number_of_workers
    }

    /// The binary before resolution, possibly unset.
    #[must_use]
    pub fn unresolved_binary(&self) -> Option<&str> {
        self.binary.as_deref()
    }

    /// The typeshed root before resolution, possibly unset.
    #[must_use]
    pub fn typeshed(&self) -> Option<&str> {
        self.typeshed.as_deref()
    }

    /// Search directories accumulated from the inputs, without typeshed.
    #[must_use]
    pub fn search_directories(&self) -> &[String] {
        &self.search_directories
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// A temp directory holding a binary and a valid typeshed.
    struct Fixture {
        temp: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            fs::write(temp.path().join("pyre.bin"), "").unwrap();
            fs::create_dir_all(temp.path().join("typeshed/stdlib/3")).unwrap();
            fs::create_dir_all(temp.path().join("stubs")).unwrap();
            Self { temp }
        }

        fn path(&self, relative: &str) -> String {
            self.temp.path().join(relative).display().to_string()
        }

        fn partial(&self) -> PartialConfiguration {
            PartialConfiguration {
                source_directories: vec![".".to_string()].into(),
                binary: Some(self.path("pyre.bin")),
                typeshed: Some(self.path("typeshed")),
                search_directories: vec![self.path("stubs")],
                workers: Some(4),
                ..Default::default()
            }
        }
    }

    #[test]
    fn test_accessors_fail_before_resolution() {
        let fixture = Fixture::new();
        let configuration = Configuration::from_partial(fixture.partial());
        assert!(matches!(configuration.binary(), Err(Error::NotValidated)));
        assert!(matches!(configuration.search_path(), Err(Error::NotValidated)));
    }

    #[test]
    fn test_validate_resolves_paths() {
        let fixture = Fixture::new();
        let mut configuration = Configuration::from_partial(fixture.partial());
        configuration.validate().unwrap();

        assert_eq!(configuration.binary().unwrap(), fixture.path("pyre.bin"));
        assert_eq!(
            configuration.search_path().unwrap(),
            [fixture.path("stubs"), fixture.path("typeshed/stdlib")]
        );
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let fixture = Fixture::new();
        let mut configuration = Configuration::from_partial(fixture.partial());
        configuration.resolve().unwrap();
        let first = configuration.search_path().unwrap().to_vec();

        configuration.search_directories.push("/late".to_string());
        configuration.resolve().unwrap();
        assert_eq!(configuration.search_path().unwrap(), first.as_slice());
    }

    #[test]
    fn test_typeshed_not_duplicated_in_search_path() {
        let fixture = Fixture::new();
        let mut partial = fixture.partial();
        partial.search_directories = vec![fixture.path("typeshed")];
        let mut configuration = Configuration::from_partial(partial);
        configuration.resolve().unwrap();

        assert_eq!(configuration.search_path().unwrap(), [fixture.path("typeshed")]);
    }

    #[test]
    fn test_resolve_without_binary() {
        let fixture = Fixture::new();
        let mut partial = fixture.partial();
        partial.binary = None;
        let mut configuration = Configuration::from_partial(partial);
        assert!(matches!(configuration.resolve(), Err(Error::NotValidated)));
    }

    #[test]
    fn test_validation_failure_is_environment_error() {
        let fixture = Fixture::new();
        let mut partial = fixture.partial();
        partial.workers = Some(-1);
        let mut configuration = Configuration::from_partial(partial);

        let err = configuration.validate().unwrap_err();
        assert!(matches!(err, Error::Environment { .. }));
        assert_eq!(
            err.to_string(),
            "Invalid configuration: Number of workers must be greater than 0."
        );
    }

    #[test]
    fn test_validation_rejects_missing_search_directory() {
        let fixture = Fixture::new();
        let mut partial = fixture.partial();
        partial.search_directories.push(fixture.path("missing"));
        let mut configuration = Configuration::from_partial(partial);

        let err = configuration.validate().unwrap_err();
        assert!(err.to_string().contains("is not a valid directory"));
    }

    #[test]
    fn test_disabled_does_not_affect_validation() {
        let fixture = Fixture::new();
        let mut partial = fixture.partial();
        partial.disabled = true;
        let mut configuration = Configuration::from_partial(partial);
        assert!(configuration.disabled());
        assert!(configuration.validate().is_ok());
    }
}

//! Builder for loading a [`Configuration`].

use std::env;
use std::path::{Path, PathBuf};

use crate::configuration::defaults;
use crate::configuration::environment::Environment;
use crate::configuration::loader::ConfigurationLoader;
use crate::configuration::merger::{ConfigurationMerger, PartialConfiguration};
use crate::configuration::Configuration;
use crate::error::Result;

/// Collects the construction inputs of a [`Configuration`].
///
/// # Examples
///
/// ```no_run
/// use pyre_config::ConfigurationBuilder;
///
/// let mut configuration = ConfigurationBuilder::new()
///     .with_local_configuration("project/subdir")
///     .preserve_pythonpath(true)
///     .build()
///     .unwrap();
///
/// if !configuration.disabled() {
///     configuration.validate().unwrap();
///     println!("{}", configuration.binary().unwrap());
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigurationBuilder {
    original_directory: Option<PathBuf>,
    local_configuration: Option<PathBuf>,
    search_path: Vec<String>,
    typeshed: Option<String>,
    preserve_pythonpath: bool,
    working_dir: Option<PathBuf>,
    environment: Option<Environment>,
}

impl ConfigurationBuilder {
    /// Creates a builder with no explicit inputs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory the invocation started from; used as the local
    /// configuration when none is given explicitly.
    #[must_use]
    pub fn with_original_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.original_directory = Some(directory.into());
        self
    }

    /// Local configuration file, or a directory containing one.
    #[must_use]
    pub fn with_local_configuration(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_configuration = Some(path.into());
        self
    }

    /// Explicit search directories, placed before any from files.
    #[must_use]
    pub fn with_search_path(mut self, search_path: Vec<String>) -> Self {
        self.search_path = search_path;
        self
    }

    /// Explicit typeshed root, taking priority over every file.
    #[must_use]
    pub fn with_typeshed(mut self, typeshed: impl Into<String>) -> Self {
        self.typeshed = Some(typeshed.into());
        self
    }

    /// Import `PYTHONPATH` directories into the search path.
    #[must_use]
    pub fn preserve_pythonpath(mut self, preserve: bool) -> Self {
        self.preserve_pythonpath = preserve;
        self
    }

    /// Directory the relative candidates are resolved against.
    ///
    /// Defaults to the process working directory.
    #[must_use]
    pub fn with_working_dir(mut self, working_dir: &Path) -> Self {
        self.working_dir = Some(working_dir.to_path_buf());
        self
    }

    /// Environment snapshot to use instead of the process environment.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Reads the candidate files and resolves the configuration.
    ///
    /// The result is not validated; see [`Configuration::validate`].
    ///
    /// # Errors
    ///
    /// Returns an error if a candidate file is malformed or cannot be read,
    /// or if the working directory cannot be determined.
    pub fn build(self) -> Result<Configuration> {
        let environment = self.environment.unwrap_or_else(Environment::from_process);
        let working_dir = match self.working_dir {
            Some(dir) => dir,
            None => env::current_dir()?,
        };

        let mut partial = PartialConfiguration::default();
        if self.preserve_pythonpath {
            partial.search_directories = environment.pythonpath_directories();
        }
        partial.search_directories.extend(self.search_path);
        partial.typeshed = self.typeshed;

        let local = self.local_configuration.or(self.original_directory);
        for candidate in ConfigurationLoader::candidates(local.as_deref(), &working_dir) {
            if let Some(file) = ConfigurationLoader::load_file(&candidate.path)? {
                ConfigurationMerger::merge_into(&mut partial, file);
            }
        }

        defaults::resolve_versioned_paths(&mut partial);
        environment.apply_overrides(&mut partial);
        defaults::apply_defaults(&mut partial, &environment, &working_dir);

        Ok(Configuration::from_partial(partial))
    }
}

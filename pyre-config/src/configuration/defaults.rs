//! Computed defaults and placeholder substitution.

use std::path::{Path, PathBuf};
use std::thread;

use crate::configuration::environment::Environment;
use crate::configuration::merger::PartialConfiguration;
use crate::configuration::schema::{BINARY_NAME, VERSION_PLACEHOLDER};

/// Workers reserved for the rest of the machine.
const RESERVED_CORES: usize = 4;

/// Worker count used when parallelism cannot be queried.
const FALLBACK_WORKERS: i64 = 4;

/// Replaces `%V` in the binary and typeshed paths with the version hash.
///
/// Nothing happens without a version hash.
///
/// # Examples
///
/// ```
/// use pyre_config::configuration::{defaults, PartialConfiguration};
///
/// let mut config = PartialConfiguration {
///     binary: Some("/opt/bin-%V".to_string()),
///     version_hash: Some("abc123".to_string()),
///     ..Default::default()
/// };
/// defaults::resolve_versioned_paths(&mut config);
/// assert_eq!(config.binary.as_deref(), Some("/opt/bin-abc123"));
/// ```
pub fn resolve_versioned_paths(config: &mut PartialConfiguration) {
    let Some(version_hash) = config.version_hash.as_deref().filter(|v| !v.is_empty()) else {
        return;
    };

    for path in [&mut config.binary, &mut config.typeshed]
        .into_iter()
        .flatten()
    {
        *path = path.replace(VERSION_PLACEHOLDER, version_hash);
    }
}

/// Default worker count: available parallelism minus four, at least one.
#[must_use]
pub fn number_of_workers() -> i64 {
    match thread::available_parallelism() {
        Ok(cores) => {
            let workers = cores.get().saturating_sub(RESERVED_CORES).max(1);
            i64::try_from(workers).unwrap_or(FALLBACK_WORKERS)
        }
        Err(_) => FALLBACK_WORKERS,
    }
}

/// Looks up [`BINARY_NAME`] on the environment's `PATH`.
#[must_use]
pub fn find_binary(environment: &Environment, working_dir: &Path) -> Option<String> {
    let path = environment.get("PATH")?;
    which::which_in(BINARY_NAME, Some(path), working_dir)
        .ok()
        .map(|binary| binary.display().to_string())
}

/// Known typeshed installation locations, in search order.
#[must_use]
pub fn typeshed_candidates(environment: &Environment) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(exe_dir.join("../lib/pyre_check/typeshed"));
        candidates.push(exe_dir.join("typeshed"));
    }

    let home = environment
        .get("HOME")
        .map(PathBuf::from)
        .or_else(home::home_dir);
    if let Some(home) = home {
        candidates.push(home.join(".local/lib/pyre_check/typeshed"));
    }

    candidates.push(PathBuf::from("/usr/local/lib/pyre_check/typeshed"));
    candidates.push(PathBuf::from("/usr/lib/pyre_check/typeshed"));
    candidates
}

/// The first existing typeshed among [`typeshed_candidates`].
#[must_use]
pub fn find_typeshed(environment: &Environment) -> Option<String> {
    typeshed_candidates(environment)
        .into_iter()
        .find(|candidate| candidate.is_dir())
        .map(|typeshed| typeshed.display().to_string())
}

/// Fills every field that is still unset.
///
/// Runs after [`Environment::apply_overrides`], so an overridden binary is
/// never replaced by the `PATH` lookup.
pub fn apply_defaults(
    config: &mut PartialConfiguration,
    environment: &Environment,
    working_dir: &Path,
) {
    if config.source_directories.is_empty() {
        config.source_directories = vec![".".to_string()].into();
        log::info!("No source directory specified, using current directory");
    }

    if config.binary.as_deref().map_or(true, str::is_empty) {
        log::info!("No binary specified, looking for `{BINARY_NAME}` in PATH");
        config.binary = find_binary(environment, working_dir);
        match &config.binary {
            Some(binary) => log::info!("Found: `{binary}`"),
            None => log::warn!("Could not find `{BINARY_NAME}` in PATH"),
        }
    }

    if matches!(config.workers, None | Some(0)) {
        config.workers = Some(number_of_workers());
    }

    if config.typeshed.as_deref().map_or(true, str::is_empty) {
        log::info!("No typeshed specified, looking for it");
        config.typeshed = find_typeshed(environment);
        match &config.typeshed {
            Some(typeshed) => log::info!("Found: `{typeshed}`"),
            None => log::warn!("Could not find a suitable typeshed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::schema::StringList;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_substitution_replaces_every_occurrence() {
        let mut config = PartialConfiguration {
            binary: Some("/opt/%V/bin-%V".to_string()),
            typeshed: Some("/opt/typeshed-%V".to_string()),
            version_hash: Some("abc123".to_string()),
            ..Default::default()
        };
        resolve_versioned_paths(&mut config);
        assert_eq!(config.binary.as_deref(), Some("/opt/abc123/bin-abc123"));
        assert_eq!(config.typeshed.as_deref(), Some("/opt/typeshed-abc123"));
    }

    #[test]
    fn test_substitution_requires_version() {
        let mut config = PartialConfiguration {
            binary: Some("/opt/bin-%V".to_string()),
            ..Default::default()
        };
        resolve_versioned_paths(&mut config);
        assert_eq!(config.binary.as_deref(), Some("/opt/bin-%V"));
    }

    #[test]
    fn test_number_of_workers_is_positive() {
        assert!(number_of_workers() >= 1);
    }

    #[test]
    fn test_find_binary_on_path() {
        let temp = TempDir::new().unwrap();
        let binary = temp.path().join(BINARY_NAME);
        fs::write(&binary, "#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&binary, fs::Permissions::from_mode(0o755)).unwrap();
        }

        let env = Environment::empty().with_var("PATH", temp.path().display().to_string());
        let found = find_binary(&env, temp.path()).unwrap();
        assert!(found.ends_with(BINARY_NAME));
    }

    #[test]
    fn test_find_binary_without_path() {
        let temp = TempDir::new().unwrap();
        assert_eq!(find_binary(&Environment::empty(), temp.path()), None);
    }

    #[test]
    fn test_find_typeshed_in_home() {
        let temp = TempDir::new().unwrap();
        let typeshed = temp.path().join(".local/lib/pyre_check/typeshed");
        fs::create_dir_all(&typeshed).unwrap();

        let env = Environment::empty().with_var("HOME", temp.path().display().to_string());
        assert!(typeshed_candidates(&env).contains(&typeshed));
        assert!(find_typeshed(&env).is_some());
    }

    #[test]
    fn test_defaults_fill_unset_fields() {
        let temp = TempDir::new().unwrap();
        let mut config = PartialConfiguration::default();
        apply_defaults(&mut config, &Environment::empty(), temp.path());

        assert_eq!(config.source_directories, StringList::from(vec![".".to_string()]));
        assert!(config.workers.unwrap() >= 1);
    }

    #[test]
    fn test_defaults_keep_explicit_values() {
        let temp = TempDir::new().unwrap();
        let mut config = PartialConfiguration {
            source_directories: vec!["src".to_string()].into(),
            binary: Some("/explicit/pyre.bin".to_string()),
            workers: Some(2),
            typeshed: Some("/explicit/typeshed".to_string()),
            ..Default::default()
        };
        apply_defaults(&mut config, &Environment::empty(), temp.path());

        assert_eq!(config.source_directories.as_slice(), ["src".to_string()]);
        assert_eq!(config.binary.as_deref(), Some("/explicit/pyre.bin"));
        assert_eq!(config.workers, Some(2));
        assert_eq!(config.typeshed.as_deref(), Some("/explicit/typeshed"));
    }
}

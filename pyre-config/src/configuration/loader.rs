//! Configuration file discovery and loading.
//!
//! Candidates are read in a fixed priority order: the explicit local
//! configuration, the `.local` file of the working directory, then the
//! project configuration of the working directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::configuration::schema::{local_configuration_file, ConfigurationFile, CONFIGURATION_FILE};
use crate::error::{Error, Result};

/// Which layer a candidate file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CandidateKind {
    /// The local configuration passed by the caller.
    LocalOverride,
    /// `.pyre_configuration.local` in the working directory.
    Local,
    /// `.pyre_configuration` in the working directory.
    Global,
}

/// A configuration file that may or may not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Where to look.
    pub path: PathBuf,
    /// Layer of this candidate.
    pub kind: CandidateKind,
}

/// Locates and parses configuration files.
///
/// # Examples
///
/// ```
/// use pyre_config::configuration::{CandidateKind, ConfigurationLoader};
/// use std::path::Path;
///
/// let candidates = ConfigurationLoader::candidates(None, Path::new("/project"));
/// assert_eq!(candidates.len(), 2);
/// assert_eq!(candidates[0].kind, CandidateKind::Local);
/// assert_eq!(candidates[1].path, Path::new("/project/.pyre_configuration"));
/// ```
pub struct ConfigurationLoader;

impl ConfigurationLoader {
    /// Candidate files in priority order (highest first).
    ///
    /// `local` may name a file or a directory; a directory (or anything that
    /// is not an existing file) gets `.pyre_configuration.local` appended.
    /// Relative paths are resolved against `working_dir`.
    #[must_use]
    pub fn candidates(local: Option<&Path>, working_dir: &Path) -> Vec<Candidate> {
        let mut candidates = Vec::with_capacity(3);

        if let Some(local) = local {
            let local = working_dir.join(local);
            let path = if local.is_file() {
                local
            } else {
                local.join(local_configuration_file())
            };
            candidates.push(Candidate {
                path,
                kind: CandidateKind::LocalOverride,
            });
        }

        candidates.push(Candidate {
            path: working_dir.join(local_configuration_file()),
            kind: CandidateKind::Local,
        });
        candidates.push(Candidate {
            path: working_dir.join(CONFIGURATION_FILE),
            kind: CandidateKind::Global,
        });

        candidates
    }

    /// Load and parse one configuration file.
    ///
    /// A missing file yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedFile`] if the file is not a JSON object and
    /// [`Error::Io`] for any other read failure.
    pub fn load_file(path: &Path) -> Result<Option<ConfigurationFile>> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No configuration found at `{}`.", path.display());
                return Ok(None);
            }
            Err(e) => return Err(Error::Io(e)),
        };

        log::debug!("Reading configuration `{}`...", path.display());
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| Error::MalformedFile {
                path: path.to_path_buf(),
                source,
            })
    }
}

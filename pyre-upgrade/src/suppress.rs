//! Suppressing type errors with fixme comments.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::checker::TypeError;
use crate::error::Result;

/// Comments to insert, keyed by one-based line, then by error code.
type LineComments = BTreeMap<usize, BTreeMap<u32, String>>;

/// What a suppression pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuppressionReport {
    /// Files that were rewritten, sorted.
    pub files: Vec<PathBuf>,
    /// Number of comments inserted.
    pub suppressed: usize,
}

impl SuppressionReport {
    /// Whether anything was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Folds another pass into this one.
    pub fn extend(&mut self, other: Self) {
        self.suppressed += other.suppressed;
        for file in other.files {
            if !self.files.contains(&file) {
                self.files.push(file);
            }
        }
        self.files.sort();
    }
}

/// Inserts `# pyre-fixme[<code>]: <message>` lines above erroneous lines.
///
/// # Examples
///
/// ```
/// use pyre_upgrade::{Suppressor, TypeError};
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("a.py");
/// std::fs::write(&path, "def f() -> int:\n    return ''\n").unwrap();
///
/// let error = TypeError {
///     path: path.clone(),
///     line: 2,
///     column: 4,
///     code: 7,
///     name: "Incompatible return type".to_string(),
///     description: "Incompatible return type [7]: Expected `int`.".to_string(),
///     concise_description: String::new(),
/// };
/// let report = Suppressor::new().suppress(&[error]).unwrap();
///
/// assert_eq!(report.suppressed, 1);
/// assert_eq!(
///     std::fs::read_to_string(&path).unwrap(),
///     "def f() -> int:\n    # pyre-fixme[7]: Expected `int`.\n    return ''\n"
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Suppressor {
    only_fix_error_code: Option<u32>,
}

impl Suppressor {
    /// A suppressor for every error code.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            only_fix_error_code: None,
        }
    }

    /// Restricts suppression to a single error code.
    #[must_use]
    pub const fn only_fix_error_code(mut self, code: Option<u32>) -> Self {
        self.only_fix_error_code = code;
        self
    }

    /// Suppresses `errors`, rewriting each affected file once.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or written.
    pub fn suppress(&self, errors: &[TypeError]) -> Result<SuppressionReport> {
        let mut report = SuppressionReport::default();
        for (path, comments) in self.group(errors) {
            let original = fs::read_to_string(&path)?;
            let (rewritten, inserted) = insert_comments(&path, &original, &comments);
            if inserted == 0 {
                continue;
            }
            fs::write(&path, rewritten)?;
            log::info!("Added {inserted} fixme comments to {}", path.display());
            report.files.push(path);
            report.suppressed += inserted;
        }
        Ok(report)
    }

    fn group(&self, errors: &[TypeError]) -> BTreeMap<PathBuf, LineComments> {
        let mut grouped: BTreeMap<PathBuf, LineComments> = BTreeMap::new();
        for error in errors {
            if self
                .only_fix_error_code
                .is_some_and(|code| code != error.code)
            {
                continue;
            }
            grouped
                .entry(error.path.clone())
                .or_default()
                .entry(error.line)
                .or_default()
                .entry(error.code)
                .or_insert_with(|| fixme_comment(error.code, error.message()));
        }
        grouped
    }
}

/// The comment text for one error code.
#[must_use]
pub fn fixme_comment(code: u32, message: &str) -> String {
    if message.is_empty() {
        format!("# pyre-fixme[{code}]")
    } else {
        format!("# pyre-fixme[{code}]: {message}")
    }
}

fn insert_comments(path: &Path, original: &str, comments: &LineComments) -> (String, usize) {
    let lines: Vec<&str> = original.lines().collect();
    if let Some(line) = comments.keys().find(|line| **line == 0 || **line > lines.len()) {
        log::warn!(
            "Skipping error at {}:{line}, the file has {} lines",
            path.display(),
            lines.len()
        );
    }

    let mut output = Vec::with_capacity(lines.len() + comments.len());
    let mut inserted = 0;
    for (index, line) in lines.iter().enumerate() {
        if let Some(codes) = comments.get(&(index + 1)) {
            let existing = comments_above(&lines[..index]);
            let indentation = &line[..line.len() - line.trim_start().len()];
            for comment in codes.values() {
                if existing.contains(comment.as_str()) {
                    continue;
                }
                output.push(format!("{indentation}{comment}"));
                inserted += 1;
            }
        }
        output.push((*line).to_string());
    }

    let newline = if original.contains("\r\n") { "\r\n" } else { "\n" };
    let mut rewritten = output.join(newline);
    if original.ends_with('\n') {
        rewritten.push_str(newline);
    }
    (rewritten, inserted)
}

/// The contiguous comment lines directly above a line.
fn comments_above<'a>(lines: &[&'a str]) -> BTreeSet<&'a str> {
    lines
        .iter()
        .rev()
        .map(|line| line.trim())
        .take_while(|line| line.starts_with('#'))
        .collect()
}

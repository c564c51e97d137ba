//! Discovery of type-checked build targets in `TARGETS` files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;

/// Name of the build files that are scanned.
pub const TARGETS_FILE: &str = "TARGETS";

/// A build rule with type checking enabled.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Target {
    /// The rule's `name`.
    pub name: String,
    /// Whether `check_types_options` asks for strict mode.
    pub strict: bool,
}

/// Every `TARGETS` file below `root` that declares type-checked rules.
///
/// Keys are paths relative to `root`. Files without such rules are omitted.
///
/// # Errors
///
/// Returns an error if a `TARGETS` file cannot be read.
pub fn find_targets(root: &Path) -> Result<BTreeMap<PathBuf, Vec<Target>>> {
    let mut found = BTreeMap::new();
    let files = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0 || e.file_name().to_str().map_or(true, |s| !s.starts_with('.'))
        })
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file() && e.file_name() == TARGETS_FILE);

    for entry in files {
        let targets = parse_targets(&fs::read_to_string(entry.path())?);
        if targets.is_empty() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_path_buf();
        log::debug!("Found {} targets in {}", targets.len(), relative.display());
        found.insert(relative, targets);
    }
    Ok(found)
}

/// Type-checked rules declared in the contents of one `TARGETS` file.
///
/// A rule starts at an unindented `rule_name(` and ends at its matching `)`,
/// on the same line or a later one. `#` comments are ignored.
///
/// # Examples
///
/// ```
/// use pyre_upgrade::targets::{parse_targets, Target};
///
/// let contents = r#"
/// python_library(
///     name = "library",
///     check_types = True,  # checked
/// )
/// python_library(name = "other", check_types = True)
/// "#;
/// assert_eq!(
///     parse_targets(contents),
///     vec![
///         Target { name: "library".to_string(), strict: false },
///         Target { name: "other".to_string(), strict: false },
///     ]
/// );
/// ```
#[must_use]
pub fn parse_targets(contents: &str) -> Vec<Target> {
    let mut targets = Vec::new();
    let mut body = String::new();
    let mut depth = 0usize;

    for line in contents.lines() {
        let mut line = strip_comment(line);
        if depth == 0 {
            let Some(arguments) = rule_arguments(line) else {
                continue;
            };
            line = arguments;
            depth = 1;
            body.clear();
        }

        let mut quote = None;
        for c in line.chars() {
            match (quote, c) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(c),
                (None, '(' | '[' | '{') => depth += 1,
                (None, ')' | ']' | '}') => depth = depth.saturating_sub(1),
                _ => {}
            }
            if depth == 0 {
                break;
            }
            body.push(c);
        }

        if depth == 0 {
            targets.extend(checked_target(&body));
        } else {
            body.push('\n');
        }
    }
    targets
}

/// The text after `rule_name(` when `line` opens a rule.
fn rule_arguments(line: &str) -> Option<&str> {
    let (rule, arguments) = line.split_once('(')?;
    let opens_rule = !rule.is_empty()
        && !line.starts_with(char::is_whitespace)
        && rule.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    opens_rule.then_some(arguments)
}

/// `line` without a trailing `#` comment.
fn strip_comment(line: &str) -> &str {
    let mut quote = None;
    for (index, c) in line.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (None, '"' | '\'') => quote = Some(c),
            (None, '#') => return &line[..index],
            _ => {}
        }
    }
    line
}

/// Splits a rule body on commas that are not nested or quoted.
fn split_arguments(body: &str) -> Vec<&str> {
    let mut arguments = Vec::new();
    let mut depth = 0usize;
    let mut quote = None;
    let mut start = 0;
    for (index, c) in body.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[' | '{') => depth += 1,
            (None, ')' | ']' | '}') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                arguments.push(&body[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    arguments.push(&body[start..]);
    arguments
}

fn checked_target(body: &str) -> Option<Target> {
    let mut name = None;
    let mut check_types = false;
    let mut strict = false;

    for argument in split_arguments(body) {
        let Some((key, value)) = argument.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "name" => name = Some(value.trim_matches('"').trim_matches('\'').to_string()),
            "check_types" => check_types = value == "True",
            "check_types_options" => strict = value.contains("strict"),
            _ => {}
        }
    }

    name.filter(|_| check_types)
        .map(|name| Target { name, strict })
}

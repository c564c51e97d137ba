//! Configuration file schema.
//!
//! Each candidate file is a single JSON object. Only the keys below are
//! recognized; anything else is ignored so other tools can keep their own
//! settings in the same file.

use serde::de::{Error as _, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Name of the project-wide configuration file.
pub const CONFIGURATION_FILE: &str = ".pyre_configuration";

/// Suffix appended to [`CONFIGURATION_FILE`] for local configurations.
pub const LOCAL_SUFFIX: &str = ".local";

/// Name of the type-checker binary looked up on `PATH`.
pub const BINARY_NAME: &str = "pyre.bin";

/// Token in `binary` and `typeshed` paths replaced by the version hash.
pub const VERSION_PLACEHOLDER: &str = "%V";

/// Name of the local configuration file (`.pyre_configuration.local`).
#[must_use]
pub fn local_configuration_file() -> String {
    format!("{CONFIGURATION_FILE}{LOCAL_SUFFIX}")
}

/// A list-valued setting.
///
/// Files are not rejected when a list field holds something else; the value
/// is kept as [`StringList::Other`] and reported by validation.
///
/// # Examples
///
/// ```
/// use pyre_config::configuration::StringList;
///
/// let list: StringList = serde_json::from_str(r#"["a", "b"]"#).unwrap();
/// assert!(list.is_list_of_strings());
///
/// let scalar: StringList = serde_json::from_str(r#""a""#).unwrap();
/// assert!(!scalar.is_list_of_strings());
/// assert!(!scalar.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum StringList {
    /// A proper list of strings.
    Strings(Vec<String>),
    /// Any other JSON value.
    Other(Value),
}

impl Default for StringList {
    fn default() -> Self {
        Self::Strings(Vec::new())
    }
}

impl From<Vec<String>> for StringList {
    fn from(strings: Vec<String>) -> Self {
        Self::Strings(strings)
    }
}

impl StringList {
    /// Whether the value carries nothing (empty list, empty string, null,
    /// `false` or zero).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Strings(strings) => strings.is_empty(),
            Self::Other(value) => match value {
                Value::Null => true,
                Value::Bool(b) => !b,
                Value::Number(n) => n.as_f64() == Some(0.0),
                Value::String(s) => s.is_empty(),
                Value::Array(a) => a.is_empty(),
                Value::Object(o) => o.is_empty(),
            },
        }
    }

    /// Whether the value is a list of strings. Empty values count as lists.
    #[must_use]
    pub fn is_list_of_strings(&self) -> bool {
        match self {
            Self::Strings(_) => true,
            Self::Other(_) => self.is_empty(),
        }
    }

    /// The strings, or an empty slice for malformed values.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::Strings(strings) => strings,
            Self::Other(_) => &[],
        }
    }
}

/// One parsed configuration file.
///
/// Missing keys stay `None`; `disabled` records only whether the key is
/// present.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConfigurationFile {
    /// Directories to analyze.
    pub source_directories: Option<StringList>,

    /// Legacy alias for `source_directories`.
    pub link_trees: Option<StringList>,

    /// Build targets to analyze.
    pub targets: Option<StringList>,

    /// Set when the `disabled` key exists, whatever its value.
    #[serde(default, deserialize_with = "key_present")]
    pub disabled: bool,

    /// Logging hook.
    pub logger: Option<String>,

    /// Paths holding generated code.
    pub autogenerated: Option<StringList>,

    /// Number of analysis workers. A numeric string such as `"8"` is accepted.
    #[serde(default, deserialize_with = "integer_or_numeric_string")]
    pub workers: Option<i64>,

    /// Path to the type-checker binary, may contain `%V`.
    pub binary: Option<String>,

    /// Additional search directories.
    #[serde(default)]
    pub search_path: Vec<String>,

    /// Version hash of the type-checker build.
    pub version: Option<String>,

    /// Path to the typeshed stub root, may contain `%V`.
    pub typeshed: Option<String>,
}

fn key_present<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    IgnoredAny::deserialize(deserializer)?;
    Ok(true)
}

fn integer_or_numeric_string<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Integer {
        Number(i64),
        Text(String),
    }

    match Option::<Integer>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Integer::Number(number)) => Ok(Some(number)),
        Some(Integer::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid integer `{text}`"))),
    }
}

impl ConfigurationFile {
    /// Source directories of this file, falling back to `link_trees`.
    #[must_use]
    pub fn source_directories_or_link_trees(&self) -> Option<&StringList> {
        match &self.source_directories {
            Some(list) if !list.is_empty() => Some(list),
            _ => self.link_trees.as_ref(),
        }
    }
}

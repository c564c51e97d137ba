//! Layered merging of configuration files.
//!
//! Files are folded from highest to lowest priority. Every field has one
//! [`MergeRule`]; the table lives in [`Field::rule`].

use crate::configuration::schema::{ConfigurationFile, StringList};

/// How a field combines values from successive layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeRule {
    /// The first non-empty value is kept; later layers only fill gaps.
    FirstWins,
    /// Values from every layer are appended in read order.
    Append,
    /// Once any layer sets the flag it stays set.
    Sticky,
}

/// Fields of the merged configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// `source_directories` (or its alias `link_trees`).
    SourceDirectories,
    /// `targets`.
    Targets,
    /// `autogenerated`.
    Autogenerated,
    /// `logger`.
    Logger,
    /// `workers`.
    Workers,
    /// `binary`.
    Binary,
    /// `version`.
    Version,
    /// `typeshed`.
    Typeshed,
    /// `search_path`.
    SearchPath,
    /// `disabled`.
    Disabled,
}

impl Field {
    /// Every field, in the order they are merged.
    pub const ALL: [Self; 10] = [
        Self::SourceDirectories,
        Self::Targets,
        Self::Autogenerated,
        Self::Logger,
        Self::Workers,
        Self::Binary,
        Self::Version,
        Self::Typeshed,
        Self::SearchPath,
        Self::Disabled,
    ];

    /// The merge rule for this field.
    ///
    /// # Examples
    ///
    /// ```
    /// use pyre_config::configuration::{Field, MergeRule};
    ///
    /// assert_eq!(Field::Binary.rule(), MergeRule::FirstWins);
    /// assert_eq!(Field::SearchPath.rule(), MergeRule::Append);
    /// assert_eq!(Field::Disabled.rule(), MergeRule::Sticky);
    /// ```
    #[must_use]
    pub const fn rule(self) -> MergeRule {
        match self {
            Self::SearchPath => MergeRule::Append,
            Self::Disabled => MergeRule::Sticky,
            _ => MergeRule::FirstWins,
        }
    }

    /// JSON key of this field.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::SourceDirectories => "source_directories",
            Self::Targets => "targets",
            Self::Autogenerated => "autogenerated",
            Self::Logger => "logger",
            Self::Workers => "workers",
            Self::Binary => "binary",
            Self::Version => "version",
            Self::Typeshed => "typeshed",
            Self::SearchPath => "search_path",
            Self::Disabled => "disabled",
        }
    }
}

/// A value that can be unset and combined with another layer's value.
pub trait Setting: Sized {
    /// Whether the value counts as "not provided".
    fn is_unset(&self) -> bool;

    /// Combines `other` into `self` for the accumulating rules.
    fn accumulate(&mut self, other: Self);
}

impl Setting for StringList {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }

    fn accumulate(&mut self, other: Self) {
        match (self, other) {
            (Self::Strings(mine), Self::Strings(theirs)) => mine.extend(theirs),
            (this, other) => {
                if this.is_unset() {
                    *this = other;
                }
            }
        }
    }
}

impl Setting for Vec<String> {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }

    fn accumulate(&mut self, other: Self) {
        self.extend(other);
    }
}

impl Setting for Option<String> {
    fn is_unset(&self) -> bool {
        self.as_deref().map_or(true, str::is_empty)
    }

    fn accumulate(&mut self, other: Self) {
        if self.is_unset() {
            *self = other;
        }
    }
}

impl Setting for Option<i64> {
    fn is_unset(&self) -> bool {
        matches!(self, None | Some(0))
    }

    fn accumulate(&mut self, other: Self) {
        if self.is_unset() {
            *self = other;
        }
    }
}

impl Setting for bool {
    fn is_unset(&self) -> bool {
        !*self
    }

    fn accumulate(&mut self, other: Self) {
        *self |= other;
    }
}

/// Applies `rule` to fold `source` into `target`.
fn fold<T: Setting>(rule: MergeRule, target: &mut T, source: Option<T>) {
    let Some(source) = source else {
        return;
    };
    match rule {
        MergeRule::FirstWins => {
            if target.is_unset() && !source.is_unset() {
                *target = source;
            }
        }
        MergeRule::Append | MergeRule::Sticky => target.accumulate(source),
    }
}

/// Configuration values gathered before defaults are applied.
///
/// Every field starts unset; layers only fill what is still unset (except
/// the appending and sticky fields).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialConfiguration {
    /// Directories to analyze.
    pub source_directories: StringList,
    /// Build targets.
    pub targets: StringList,
    /// Generated code paths.
    pub autogenerated: StringList,
    /// Logging hook.
    pub logger: Option<String>,
    /// Worker count, zero or `None` meaning unset.
    pub workers: Option<i64>,
    /// Binary path.
    pub binary: Option<String>,
    /// Version hash.
    pub version_hash: Option<String>,
    /// Typeshed root.
    pub typeshed: Option<String>,
    /// Search directories accumulated so far.
    pub search_directories: Vec<String>,
    /// Whether any layer disabled the checker.
    pub disabled: bool,
}

/// Merges configuration files into a [`PartialConfiguration`].
///
/// # Examples
///
/// ```
/// use pyre_config::configuration::{ConfigurationFile, ConfigurationMerger, PartialConfiguration};
///
/// let local: ConfigurationFile = serde_json::from_str(r#"{"binary": "/local"}"#).unwrap();
/// let global: ConfigurationFile = serde_json::from_str(r#"{"binary": "/global"}"#).unwrap();
///
/// let mut merged = PartialConfiguration::default();
/// ConfigurationMerger::merge_into(&mut merged, local);
/// ConfigurationMerger::merge_into(&mut merged, global);
/// assert_eq!(merged.binary.as_deref(), Some("/local"));
/// ```
pub struct ConfigurationMerger;

impl ConfigurationMerger {
    /// Merge files given from highest to lowest priority.
    #[must_use]
    pub fn merge(files: Vec<ConfigurationFile>) -> PartialConfiguration {
        let mut result = PartialConfiguration::default();
        for file in files {
            Self::merge_into(&mut result, file);
        }
        result
    }

    /// Fold one lower-priority file into `target`.
    pub fn merge_into(target: &mut PartialConfiguration, source: ConfigurationFile) {
        let source_directories = source.source_directories_or_link_trees().cloned();

        for field in Field::ALL {
            let rule = field.rule();
            match field {
                Field::SourceDirectories => {
                    fold(rule, &mut target.source_directories, source_directories.clone());
                }
                Field::Targets => fold(rule, &mut target.targets, source.targets.clone()),
                Field::Autogenerated => {
                    fold(rule, &mut target.autogenerated, source.autogenerated.clone());
                }
                Field::Logger => fold(rule, &mut target.logger, Some(source.logger.clone())),
                Field::Workers => fold(rule, &mut target.workers, Some(source.workers)),
                Field::Binary => fold(rule, &mut target.binary, Some(source.binary.clone())),
                Field::Version => {
                    fold(rule, &mut target.version_hash, Some(source.version.clone()));
                }
                Field::Typeshed => {
                    fold(rule, &mut target.typeshed, Some(source.typeshed.clone()));
                }
                Field::SearchPath => fold(
                    rule,
                    &mut target.search_directories,
                    Some(source.search_path.clone()),
                ),
                Field::Disabled => fold(rule, &mut target.disabled, Some(source.disabled)),
            }
        }

        if !target.source_directories.is_empty() {
            log::debug!(
                "Found source directories `{}`",
                target.source_directories.as_slice().join(", ")
            );
        }
        if !target.targets.is_empty() {
            log::debug!("Found targets `{}`", target.targets.as_slice().join(", "));
        }
    }
}

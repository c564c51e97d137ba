//! Logging backend for the `log` facade.
//!
//! Library code logs through `log::debug!` and friends; this module provides
//! the stderr backend callers install once per process.

use std::env;
use std::fmt;

use chrono::{DateTime, Local};
use log::{Level, LevelFilter, Metadata, Record};

/// Environment variable consulted when no CLI flag selects a level.
pub const LOG_MODE_VARIABLE: &str = "PYRE_LOG_MODE";

/// Logging level for controlling output verbosity.
///
/// Log levels are ordered from least verbose (Quiet) to most verbose (Verbose).
///
/// # Examples
///
/// ```
/// use pyre_config::LogLevel;
///
/// assert!(LogLevel::Quiet < LogLevel::Normal);
/// assert!(LogLevel::Normal < LogLevel::Verbose);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Suppress all output.
    Quiet,
    /// Errors, warnings and informational messages.
    Normal,
    /// Everything, including debug messages.
    Verbose,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quiet => write!(f, "quiet"),
            Self::Normal => write!(f, "normal"),
            Self::Verbose => write!(f, "verbose"),
        }
    }
}

impl LogLevel {
    /// Parses a log level from a string.
    ///
    /// Recognizes: "quiet", "normal", "verbose" (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not recognized.
    ///
    /// # Examples
    ///
    /// ```
    /// use pyre_config::LogLevel;
    ///
    /// assert_eq!(LogLevel::parse("VERBOSE").unwrap(), LogLevel::Verbose);
    /// assert!(LogLevel::parse("loud").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "quiet" => Ok(Self::Quiet),
            "normal" => Ok(Self::Normal),
            "verbose" => Ok(Self::Verbose),
            _ => Err(format!("invalid log level: {s}")),
        }
    }

    /// The `log` filter corresponding to this level.
    #[must_use]
    pub const fn filter(self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::Off,
            Self::Normal => LevelFilter::Info,
            Self::Verbose => LevelFilter::Debug,
        }
    }
}

/// A `log::Log` implementation writing timestamped lines to stderr.
///
/// Lines look like `2024-05-01 12:30:00 WARN Binary overridden with ...`.
#[derive(Debug, Clone, Copy)]
pub struct StderrLogger {
    level: LogLevel,
}

impl StderrLogger {
    /// Creates a new logger with the specified log level.
    #[must_use]
    pub const fn new(level: LogLevel) -> Self {
        Self { level }
    }

    /// Returns the current log level.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }
}

impl Default for StderrLogger {
    fn default() -> Self {
        Self::new(LogLevel::Normal)
    }
}

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level.filter()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "{}",
                format_line(Local::now(), record.level(), &record.args().to_string())
            );
        }
    }

    fn flush(&self) {}
}

/// Formats a single log line.
///
/// # Examples
///
/// ```
/// use chrono::{Local, TimeZone};
/// use log::Level;
/// use pyre_config::logging::format_line;
///
/// let at = Local.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
/// assert_eq!(
///     format_line(at, Level::Info, "Found: `/usr/bin/pyre.bin`"),
///     "2024-05-01 12:30:00 INFO Found: `/usr/bin/pyre.bin`"
/// );
/// ```
#[must_use]
pub fn format_line(at: DateTime<Local>, level: Level, message: &str) -> String {
    format!("{} {level} {message}", at.format("%Y-%m-%d %H:%M:%S"))
}

/// Selects a log level from CLI flags and the environment.
///
/// The priority order is:
/// 1. CLI flags (verbose/quiet, verbose wins if both are set)
/// 2. `PYRE_LOG_MODE` environment variable
/// 3. Default (Normal)
#[must_use]
pub fn select_level(verbose: bool, quiet: bool) -> LogLevel {
    if verbose {
        return LogLevel::Verbose;
    }
    if quiet {
        return LogLevel::Quiet;
    }

    if let Ok(env_value) = env::var(LOG_MODE_VARIABLE) {
        if let Ok(level) = LogLevel::parse(&env_value) {
            return level;
        }
    }

    LogLevel::Normal
}

/// Installs the stderr logger as the global `log` backend.
///
/// Only the first installation in a process takes effect; later calls just
/// adjust the maximum level. Returns the selected level.
///
/// # Examples
///
/// ```
/// use pyre_config::{init_logger, LogLevel};
///
/// let level = init_logger(true, false);
/// assert_eq!(level, LogLevel::Verbose);
/// ```
pub fn init_logger(verbose: bool, quiet: bool) -> LogLevel {
    let level = select_level(verbose, quiet);
    // A backend may already be installed (tests, embedding tools).
    let _ = log::set_boxed_logger(Box::new(StderrLogger::new(level)));
    log::set_max_level(level.filter());
    level
}

#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # pyre-config
//!
//! Configuration resolution for the pyre type checker.
//!
//! The resolver merges the local and global `.pyre_configuration` files,
//! substitutes the `%V` version placeholder, applies the `PYRE_BINARY` and
//! `PYRE_VERSION_HASH` overrides and computed defaults, and validates the
//! result against the filesystem.
//!
//! ## Core Types
//!
//! - [`Configuration`] and [`ConfigurationBuilder`]: the resolved configuration
//! - [`Environment`]: environment variable snapshot used during resolution
//! - [`Error`] and [`Result`]: error handling types
//! - [`LogLevel`] and [`init_logger`]: the `log` backend
//!
//! ## Examples
//!
//! ```no_run
//! use pyre_config::ConfigurationBuilder;
//!
//! let mut configuration = ConfigurationBuilder::new().build()?;
//! if !configuration.disabled() {
//!     configuration.validate()?;
//!     for path in configuration.search_path()? {
//!         println!("{path}");
//!     }
//! }
//! # Ok::<(), pyre_config::Error>(())
//! ```

pub mod configuration;
pub mod error;
pub mod logging;

// Re-export key types at crate root for convenience
pub use configuration::{Configuration, ConfigurationBuilder, Environment};
pub use error::{Error, Result};
pub use logging::{init_logger, LogLevel, StderrLogger};

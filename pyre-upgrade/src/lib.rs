#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # pyre-upgrade
//!
//! Upgrade tooling for pyre projects: moving the global version hash while
//! pinning local projects, and suppressing the type errors a new version
//! reports with `# pyre-fixme` comments.
//!
//! The checker and source control are reached through the [`ErrorSource`] and
//! [`Repository`] traits. [`CheckerCommand`] runs the checker executable; no
//! source-control implementation ships with this crate.
//!
//! ## Core Types
//!
//! - [`GlobalVersionUpdate`], [`Fixme`], [`FixmeSingle`], [`FixmeAll`],
//!   [`FixmeTargets`]: the operations, run through [`Command`] and
//!   [`run_command`]
//! - [`ConfigurationDocument`]: a configuration file edited as raw JSON
//! - [`Suppressor`]: fixme comment insertion
//! - [`Error`], [`Result`] and [`ExitCode`]: error handling types

pub mod checker;
pub mod commands;
pub mod error;
pub mod project;
pub mod repository;
pub mod suppress;
pub mod targets;

pub use checker::{CheckerCommand, ErrorInput, ErrorSource, TypeError};
pub use commands::{
    run_command, Command, Context, Fixme, FixmeAll, FixmeOptions, FixmeSingle, FixmeTargets,
    GlobalVersionUpdate,
};
pub use error::{Error, ExitCode, Result};
pub use project::{find_project_configuration, ConfigurationDocument};
pub use repository::{Repository, SubmitOptions};
pub use suppress::{SuppressionReport, Suppressor};
pub use targets::{find_targets, Target};

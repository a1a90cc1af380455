//! CLI, configuration, and the report pipeline
//!
//! This crate provides the `zoomreport` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod secret;

pub use cli::Cli;
pub use error::{ReportError, ReportResult};

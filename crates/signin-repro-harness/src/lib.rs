//! Repro host, scenario runner and CLI
//!
//! This crate provides the `signin-repro` command-line harness.

pub mod analytics;
pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod render;
pub mod scenario;

pub use app::{LastResult, ReproApp, ResultStatus, Screen};
pub use cli::Cli;
pub use error::{HarnessError, HarnessResult};
pub use scenario::{HostEvent, Scenario};

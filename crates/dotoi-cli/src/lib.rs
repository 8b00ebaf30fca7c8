//! Headless host for the dotoi task engine.
//!
//! The `dotoi` binary runs the engine without a user interface: it keeps
//! the task service and scheduler alive and reports overdue tasks and
//! snapshots on stdout until interrupted.

pub mod cli;
pub mod demo;
pub mod report;

pub use cli::{Cli, OutputFormat};
pub use report::EventReporter;

//! Core data models for the dotoi task engine.
//!
//! This crate provides the value types that travel through the engine:
//! tasks and their recurrence rules, and the closed set of events that the
//! event bus delivers between producers and consumers.

pub mod builders;
pub mod error;
pub mod event;
pub mod ids;
pub mod recurrence;
pub mod task;

// Re-export main types
pub use builders::{RecurrenceRuleBuilder, TaskBuilder};
pub use error::{ModelError, Result};
pub use event::DataEvent;
pub use ids::TaskId;
pub use recurrence::{IntervalUnit, RecurrenceRule, RecurrenceType};
pub use task::{now, SharedTask, Task, TaskState};

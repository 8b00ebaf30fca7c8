//! Task service and periodic scheduler for dotoi.
//!
//! This crate wires the event bus to task storage and drives the
//! maintenance checks:
//! - `TaskService` - subscribes to the bus and owns repository writes
//! - `SchedulerService` - publishes `CheckDeadlines` and `CheckRecurrence`
//!   on a fixed period
//! - `Engine` - main entry point combining both
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use dotoi_models::{DataEvent, Task};
//! use dotoi_runtime::{Engine, SchedulerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut engine = Engine::new(SchedulerConfig::from_env())?;
//!     engine.start()?;
//!
//!     let task = Arc::new(Task::builder("Renew passport").build()?);
//!     engine.publish(DataEvent::TaskAdded(task));
//!
//!     tokio::signal::ctrl_c().await?;
//!     engine.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Key Concepts
//!
//! ## TaskService
//!
//! The only writer of the repository. Intents (`TaskAdded`, `TaskDeleted`,
//! `TaskUpdate`) are applied as they arrive; `RequestTasks` is answered
//! with a snapshot; maintenance events run the deadline and recurrence
//! checks against the service's [`Clock`].
//!
//! ## SchedulerService
//!
//! One background tokio task. The first tick fires at start, later ticks
//! at a fixed rate. Shutdown waits for a running tick up to a timeout.

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod scheduler;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{SchedulerConfig, SHUTDOWN_TIMEOUT_SECS_ENV, TICK_SECS_ENV};
pub use engine::Engine;
pub use error::{Result, RuntimeError};
pub use scheduler::{SchedulerService, ShutdownReport};
pub use service::TaskService;

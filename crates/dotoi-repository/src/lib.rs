//! Thread-safe in-memory task repository for the dotoi task engine.
//!
//! This crate provides:
//! - The `TaskRepository` trait, the storage seam used by the task service
//! - `InMemoryTaskRepository`, a volatile copy-on-write implementation
//! - `TaskFilter` for attribute-based queries
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use dotoi_models::Task;
//! use dotoi_repository::{InMemoryTaskRepository, TaskFilter, TaskRepository};
//!
//! let repository = InMemoryTaskRepository::new();
//! let task = Arc::new(Task::builder("Water plants").build().unwrap());
//!
//! repository.save(Arc::clone(&task));
//! assert_eq!(repository.len(), 1);
//!
//! let pending = repository.find_matching(&TaskFilter::new().with_completed(false));
//! assert_eq!(pending.len(), 1);
//! ```

pub mod filter;
pub mod repository;

pub use filter::TaskFilter;
pub use repository::{InMemoryTaskRepository, TaskRepository};

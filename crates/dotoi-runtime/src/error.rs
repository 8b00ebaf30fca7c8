//! Error types for the runtime crate.

use thiserror::Error;

/// Errors that can occur in the runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Scheduler or engine not started.
    #[error("not started")]
    NotStarted,

    /// Engine already started.
    #[error("already started")]
    AlreadyStarted,

    /// No tokio runtime to spawn the scheduler on.
    #[error("no async runtime available: {0}")]
    NoRuntime(String),

    /// Configuration rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Shutdown error.
    #[error("shutdown error: {0}")]
    Shutdown(String),
}

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;

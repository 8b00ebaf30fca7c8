//! Validation errors raised while building models.

use thiserror::Error;

/// Errors that can occur while constructing a model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Task title was empty or whitespace only.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// Recurrence interval must be positive.
    #[error("recurrence interval must be positive, got {0}")]
    InvalidInterval(u32),

    /// Weekly recurrence without a day of week.
    #[error("weekly recurrence requires a day of week")]
    MissingDayOfWeek,

    /// Monthly recurrence with a missing or out-of-range day of month.
    #[error("monthly recurrence requires a day of month in 1..=31, got {0}")]
    InvalidDayOfMonth(u32),
}

/// Result type alias for model construction.
pub type Result<T> = std::result::Result<T, ModelError>;

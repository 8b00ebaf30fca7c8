//! Error types for event delivery.

use thiserror::Error;

/// Errors a subscriber can report while handling an event.
///
/// The bus logs these and keeps delivering to the remaining subscribers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscriberError {
    /// The subscriber could not handle the event.
    #[error("subscriber failed: {0}")]
    Failed(String),

    /// The subscriber panicked during delivery.
    #[error("subscriber panicked: {0}")]
    Panicked(String),
}

/// Result type alias for subscriber handlers.
pub type Result<T> = std::result::Result<T, SubscriberError>;

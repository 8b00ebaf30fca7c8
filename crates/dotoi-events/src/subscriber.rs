//! Subscriber contract and ready-made subscribers.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use dotoi_models::DataEvent;

use crate::error::Result;

/// Receives events delivered by the [`EventBus`](crate::EventBus).
///
/// Handlers run synchronously on the publisher's thread. A slow handler
/// delays the publisher and every subscriber after it in the same pass.
pub trait Subscriber: Send + Sync {
    /// Handles one event.
    fn on_event(&self, event: &DataEvent) -> Result<()>;

    /// Name used in delivery logs.
    fn name(&self) -> &str {
        "subscriber"
    }
}

/// Subscriber backed by a closure.
pub struct FnSubscriber<F> {
    name: String,
    handler: F,
}

impl<F> FnSubscriber<F>
where
    F: Fn(&DataEvent) -> Result<()> + Send + Sync,
{
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl<F> Subscriber for FnSubscriber<F>
where
    F: Fn(&DataEvent) -> Result<()> + Send + Sync,
{
    fn on_event(&self, event: &DataEvent) -> Result<()> {
        (self.handler)(event)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> fmt::Debug for FnSubscriber<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSubscriber")
            .field("name", &self.name)
            .finish()
    }
}

/// Wraps a closure into a shareable subscriber.
pub fn subscriber_fn<F>(name: impl Into<String>, handler: F) -> Arc<dyn Subscriber>
where
    F: Fn(&DataEvent) -> Result<()> + Send + Sync + 'static,
{
    Arc::new(FnSubscriber::new(name, handler))
}

/// Subscriber that keeps every event it receives, in delivery order.
#[derive(Debug, Default)]
pub struct RecordingSubscriber {
    events: Mutex<Vec<DataEvent>>,
}

impl RecordingSubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    pub fn events(&self) -> Vec<DataEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the recorded events' kinds, in order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(DataEvent::kind)
            .collect()
    }

    /// Returns how many recorded events satisfy `predicate`.
    pub fn count(&self, predicate: impl Fn(&DataEvent) -> bool) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| predicate(e))
            .count()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Subscriber for RecordingSubscriber {
    fn on_event(&self, event: &DataEvent) -> Result<()> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "recorder"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SubscriberError;

    #[test]
    fn test_fn_subscriber_invokes_closure() {
        let subscriber = subscriber_fn("reject-checks", |event| match event {
            DataEvent::CheckDeadlines => Err(SubscriberError::Failed("nope".into())),
            _ => Ok(()),
        });

        assert_eq!(subscriber.name(), "reject-checks");
        assert!(subscriber.on_event(&DataEvent::RequestTasks).is_ok());
        assert!(subscriber.on_event(&DataEvent::CheckDeadlines).is_err());
    }

    #[test]
    fn test_recording_subscriber() {
        let recorder = RecordingSubscriber::new();

        recorder.on_event(&DataEvent::CheckDeadlines).unwrap();
        recorder.on_event(&DataEvent::CheckRecurrence).unwrap();

        assert_eq!(recorder.kinds(), vec!["check_deadlines", "check_recurrence"]);
        assert_eq!(
            recorder.count(|e| matches!(e, DataEvent::CheckDeadlines)),
            1
        );

        recorder.clear();
        assert!(recorder.events().is_empty());
    }
}

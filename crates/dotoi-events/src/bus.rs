//! EventBus - synchronous fan-out of domain events to subscribers.
//!
//! Concurrency pattern:
//! - `RwLock<Arc<Vec<_>>>` holding an immutable subscriber snapshot. The
//!   lock is held only to clone the `Arc` (publish) or to swap in a new
//!   vector (subscribe/unsubscribe), never while handlers run.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

use dotoi_models::DataEvent;
use tracing::{debug, error, trace, warn};

use crate::error::SubscriberError;
use crate::subscriber::Subscriber;

type Snapshot = Arc<Vec<Arc<dyn Subscriber>>>;

/// Outcome of a single `publish` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryReport {
    /// Subscribers that handled the event successfully.
    pub delivered: usize,
    /// Subscribers that returned an error or panicked.
    pub failed: usize,
}

impl DeliveryReport {
    /// Total number of subscribers the event was offered to.
    pub fn attempted(&self) -> usize {
        self.delivered + self.failed
    }
}

/// In-process publish/subscribe hub.
///
/// # Delivery semantics
///
/// - `publish` delivers synchronously, in subscription order, to the
///   subscribers registered when the call started. Subscribing or
///   unsubscribing during delivery only affects later publishes.
/// - Subscribing the same subscriber twice delivers every event to it twice.
/// - A subscriber that returns an error or panics is logged and skipped;
///   the remaining subscribers still receive the event.
/// - Handlers may publish again from inside `on_event`.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use std::thread;
/// use dotoi_events::{EventBus, RecordingSubscriber};
/// use dotoi_models::DataEvent;
///
/// let bus = Arc::new(EventBus::new());
/// let recorder = Arc::new(RecordingSubscriber::new());
/// bus.subscribe(recorder.clone());
///
/// let b = Arc::clone(&bus);
/// thread::spawn(move || {
///     b.publish(DataEvent::CheckDeadlines);
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(recorder.kinds(), vec!["check_deadlines"]);
/// ```
pub struct EventBus {
    subscribers: RwLock<Snapshot>,
}

impl EventBus {
    /// Creates a bus with no subscribers.
    pub fn new() -> Self {
        debug!("event bus initialized");
        Self {
            subscribers: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Registers a subscriber at the end of the delivery order.
    pub fn subscribe(&self, subscriber: Arc<dyn Subscriber>) {
        let name = subscriber.name().to_string();
        let count = self.update(|subs| {
            subs.push(subscriber);
            subs.len()
        });
        debug!(subscriber = %name, subscribers = count, "subscriber added");
    }

    /// Removes the first registration of `subscriber` (matched by identity).
    ///
    /// Returns false, and logs a warning, if it was not subscribed.
    pub fn unsubscribe(&self, subscriber: &Arc<dyn Subscriber>) -> bool {
        let target = Arc::as_ptr(subscriber);
        let removed = self.update(|subs| {
            match subs
                .iter()
                .position(|s| std::ptr::addr_eq(Arc::as_ptr(s), target))
            {
                Some(index) => {
                    subs.remove(index);
                    true
                }
                None => false,
            }
        });

        if removed {
            debug!(subscriber = %subscriber.name(), "subscriber removed");
        } else {
            warn!(
                subscriber = %subscriber.name(),
                "attempted to unsubscribe a subscriber that is not registered"
            );
        }
        removed
    }

    /// Delivers `event` to every subscriber registered at call time.
    ///
    /// Returns once all of them have handled it.
    pub fn publish(&self, event: DataEvent) -> DeliveryReport {
        let snapshot = self.snapshot();
        let mut report = DeliveryReport::default();

        trace!(
            event = event.kind(),
            subscribers = snapshot.len(),
            "publishing event"
        );

        for subscriber in snapshot.iter() {
            match deliver(subscriber.as_ref(), &event) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    error!(
                        event = event.kind(),
                        subscriber = %subscriber.name(),
                        error = %e,
                        "subscriber failed to handle event"
                    );
                }
            }
        }

        report
    }

    /// Returns the number of registrations (duplicates included).
    pub fn subscriber_count(&self) -> usize {
        self.snapshot().len()
    }

    /// Returns the current subscriber snapshot.
    fn snapshot(&self) -> Snapshot {
        let guard = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Applies `f` to a private copy of the subscriber list and swaps it in.
    fn update<R>(&self, f: impl FnOnce(&mut Vec<Arc<dyn Subscriber>>) -> R) -> R {
        let mut guard = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        // Copies only when a publish still holds the current snapshot.
        f(Arc::make_mut(&mut *guard))
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs one handler, turning a panic into an error.
fn deliver(subscriber: &dyn Subscriber, event: &DataEvent) -> Result<(), SubscriberError> {
    panic::catch_unwind(AssertUnwindSafe(|| subscriber.on_event(event)))
        .unwrap_or_else(|payload| Err(SubscriberError::Panicked(panic_message(payload))))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

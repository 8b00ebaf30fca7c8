//! Thread-safe publish/subscribe event bus for the dotoi task engine.
//!
//! This crate provides the `EventBus` that decouples task storage from task
//! consumers:
//! - Copy-on-write subscriber list, swapped on registration changes
//! - Synchronous delivery in subscription order over a snapshot
//! - Failing or panicking subscribers are logged and skipped
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use dotoi_events::{subscriber_fn, EventBus};
//! use dotoi_models::DataEvent;
//!
//! let bus = Arc::new(EventBus::new());
//!
//! bus.subscribe(subscriber_fn("printer", |event| {
//!     println!("received {}", event.kind());
//!     Ok(())
//! }));
//!
//! let report = bus.publish(DataEvent::RequestTasks);
//! assert_eq!(report.delivered, 1);
//! ```

pub mod bus;
pub mod error;
pub mod subscriber;

pub use bus::{DeliveryReport, EventBus};
pub use error::{Result, SubscriberError};
pub use subscriber::{subscriber_fn, FnSubscriber, RecordingSubscriber, Subscriber};

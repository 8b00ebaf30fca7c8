//! Periodic scheduler driving the maintenance checks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dotoi_events::EventBus;
use dotoi_models::DataEvent;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::config::SchedulerConfig;
use crate::error::{Result, RuntimeError};

/// Outcome of [`SchedulerService::shutdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    /// The tick loop stopped on its own within the timeout.
    pub graceful: bool,
    /// Ticks still running when the timeout elapsed.
    ///
    /// The loop is aborted, but a tick blocked inside its synchronous
    /// `publish` cannot be interrupted: it finishes delivering both events
    /// after `shutdown` has returned. Abandoned means no longer awaited, not
    /// stopped.
    pub abandoned: usize,
}

/// Owns the repeating timer; nothing else in the engine needs one.
///
/// Every tick publishes `CheckDeadlines` then `CheckRecurrence` on the
/// scheduler's own task. The first tick fires immediately and later ticks
/// keep a fixed rate: a slow tick does not push the next ones back.
pub struct SchedulerService {
    config: SchedulerConfig,
    /// Handle to the tick loop task.
    handle: Option<JoinHandle<()>>,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    ticks: Arc<AtomicU64>,
}

impl SchedulerService {
    /// Starts ticking on the current tokio runtime.
    pub fn start(bus: Arc<EventBus>, config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|e| RuntimeError::NoRuntime(e.to_string()))?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let ticks = Arc::new(AtomicU64::new(0));

        let mut tick_loop = TickLoop {
            bus,
            period: config.period,
            shutdown: shutdown_rx,
            ticks: Arc::clone(&ticks),
        };
        let handle = runtime.spawn(async move {
            tick_loop.run().await;
        });

        info!(
            period_secs = config.period.as_secs_f64(),
            "scheduler started"
        );

        Ok(Self {
            config,
            handle: Some(handle),
            shutdown_tx,
            ticks,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Number of ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Check if the tick loop is still owned by this service.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Stops the tick loop.
    ///
    /// Waits up to the configured timeout for a running tick to finish, then
    /// cancels the loop and logs how much work was abandoned. No tick starts
    /// after the cancellation, but one already inside `publish` runs to the
    /// end (see [`ShutdownReport::abandoned`]). A tick that panicked is
    /// reported as an error, not swallowed.
    pub async fn shutdown(&mut self) -> Result<ShutdownReport> {
        let Some(handle) = self.handle.take() else {
            return Err(RuntimeError::NotStarted);
        };

        info!("shutting down scheduler");

        // The loop may already be gone; a closed channel is fine.
        let _ = self.shutdown_tx.send(true);

        let abort = handle.abort_handle();
        match tokio::time::timeout(self.config.shutdown_timeout, handle).await {
            Ok(Ok(())) => {
                info!(ticks = self.tick_count(), "scheduler stopped");
                Ok(ShutdownReport {
                    graceful: true,
                    abandoned: 0,
                })
            }
            Ok(Err(e)) if e.is_panic() => Err(RuntimeError::Shutdown(format!(
                "scheduler tick panicked: {}",
                e
            ))),
            Ok(Err(e)) => {
                warn!(error = %e, "scheduler task was cancelled externally");
                Ok(ShutdownReport {
                    graceful: false,
                    abandoned: 0,
                })
            }
            Err(_) => {
                abort.abort();
                warn!(
                    timeout_secs = self.config.shutdown_timeout.as_secs_f64(),
                    abandoned = 1,
                    "scheduler did not stop in time, cancelling pending execution"
                );
                Ok(ShutdownReport {
                    graceful: false,
                    abandoned: 1,
                })
            }
        }
    }
}

impl Drop for SchedulerService {
    fn drop(&mut self) {
        // Send shutdown signal if still running
        if self.handle.is_some() {
            let _ = self.shutdown_tx.send(true);
        }
    }
}

/// The body of the scheduler task.
struct TickLoop {
    bus: Arc<EventBus>,
    period: std::time::Duration,
    shutdown: watch::Receiver<bool>,
    ticks: Arc<AtomicU64>,
}

impl TickLoop {
    /// Run the tick loop until shutdown signal.
    async fn run(&mut self) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

        debug!(period_ms = self.period.as_millis(), "starting tick loop");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick();
                }
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        debug!("tick loop received shutdown signal");
                        break;
                    }
                }
            }
        }

        debug!("tick loop stopped");
    }

    fn tick(&self) {
        let n = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;
        trace!(tick = n, "scheduler tick");
        self.bus.publish(DataEvent::CheckDeadlines);
        self.bus.publish(DataEvent::CheckRecurrence);
    }
}

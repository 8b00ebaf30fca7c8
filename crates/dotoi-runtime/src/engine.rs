//! Engine wiring: bus, repository, task service and scheduler.

use std::sync::Arc;

use dotoi_events::EventBus;
use dotoi_models::DataEvent;
use dotoi_repository::{InMemoryTaskRepository, TaskRepository};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::config::SchedulerConfig;
use crate::error::{Result, RuntimeError};
use crate::scheduler::{SchedulerService, ShutdownReport};
use crate::service::TaskService;

/// Main entry point combining the task service and the scheduler.
///
/// Everything talks through the shared [`EventBus`]; the engine only owns
/// the lifecycle.
pub struct Engine {
    bus: Arc<EventBus>,
    service: Arc<TaskService>,
    config: SchedulerConfig,
    scheduler: Option<SchedulerService>,
}

impl Engine {
    /// Create an engine with an in-memory repository and the system clock.
    pub fn new(config: SchedulerConfig) -> Result<Self> {
        Self::with_parts(
            config,
            Arc::new(InMemoryTaskRepository::new()),
            Arc::new(SystemClock),
        )
    }

    /// Create an engine over a provided repository and clock.
    pub fn with_parts(
        config: SchedulerConfig,
        repository: Arc<dyn TaskRepository>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let bus = Arc::new(EventBus::new());
        let service = TaskService::new(Arc::clone(&bus), repository, clock);

        Ok(Self {
            bus,
            service,
            config,
            scheduler: None,
        })
    }

    /// Start the scheduler on the current tokio runtime.
    pub fn start(&mut self) -> Result<()> {
        if self.scheduler.is_some() {
            return Err(RuntimeError::AlreadyStarted);
        }

        info!("starting engine");
        let scheduler = SchedulerService::start(Arc::clone(&self.bus), self.config.clone())?;
        self.scheduler = Some(scheduler);
        debug!("engine started");

        Ok(())
    }

    /// Stop the scheduler and detach the task service from the bus.
    ///
    /// If the shutdown timed out, an abandoned tick may still be delivering
    /// to the service after this returns. Its snapshot was taken before the
    /// detach, so that tick still reaches the service; later publishes do not.
    pub async fn shutdown(&mut self) -> Result<ShutdownReport> {
        let Some(mut scheduler) = self.scheduler.take() else {
            return Err(RuntimeError::NotStarted);
        };

        info!("shutting down engine");
        let report = scheduler.shutdown().await;
        self.service.detach();
        info!("engine stopped");

        report
    }

    /// Publish an event on the engine's bus.
    pub fn publish(&self, event: DataEvent) {
        self.bus.publish(event);
    }

    /// Get the shared event bus.
    pub fn bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.bus)
    }

    /// Get the task service.
    pub fn service(&self) -> Arc<TaskService> {
        Arc::clone(&self.service)
    }

    /// Get the repository the service writes to.
    pub fn repository(&self) -> Arc<dyn TaskRepository> {
        Arc::clone(self.service.repository())
    }

    /// Check if the scheduler is running.
    pub fn is_started(&self) -> bool {
        self.scheduler.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::NaiveDate;
    use dotoi_events::RecordingSubscriber;
    use dotoi_models::Task;
    use std::time::Duration;

    fn fixed_engine() -> Engine {
        let now = NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        Engine::with_parts(
            SchedulerConfig::default(),
            Arc::new(InMemoryTaskRepository::new()),
            Arc::new(FixedClock::new(now)),
        )
        .unwrap()
    }

    #[test]
    fn test_engine_new() {
        let engine = Engine::new(SchedulerConfig::default()).unwrap();
        assert!(!engine.is_started());
        assert_eq!(engine.bus().subscriber_count(), 1);
        assert!(engine.repository().is_empty());
    }

    #[test]
    fn test_engine_rejects_invalid_config() {
        let config = SchedulerConfig::new().with_period(Duration::ZERO);
        assert!(matches!(
            Engine::new(config),
            Err(RuntimeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_publish_reaches_service() {
        let engine = fixed_engine();
        let task = Arc::new(Task::builder("Water plants").build().unwrap());

        engine.publish(DataEvent::TaskAdded(Arc::clone(&task)));

        assert_eq!(engine.repository().len(), 1);
        assert!(engine.repository().find_by_id(task.id()).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_and_shutdown() {
        let mut engine = fixed_engine();
        let recorder = Arc::new(RecordingSubscriber::new());
        engine.bus().subscribe(recorder.clone());

        engine.start().unwrap();
        assert!(engine.is_started());
        assert!(matches!(engine.start(), Err(RuntimeError::AlreadyStarted)));

        tokio::time::sleep(Duration::from_secs(1)).await;
        let report = engine.shutdown().await.unwrap();

        assert!(report.graceful);
        assert!(!engine.is_started());
        // The service no longer listens; only the recorder remains.
        assert_eq!(engine.bus().subscriber_count(), 1);
        assert_eq!(recorder.kinds(), vec!["check_deadlines", "check_recurrence"]);
    }

    #[tokio::test]
    async fn test_shutdown_before_start() {
        let mut engine = fixed_engine();
        assert!(matches!(
            engine.shutdown().await,
            Err(RuntimeError::NotStarted)
        ));
    }
}

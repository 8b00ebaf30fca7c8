//! Task service - the bus subscriber that owns repository writes.

use std::fmt;
use std::sync::Arc;

use dotoi_events::{EventBus, Subscriber, SubscriberError};
use dotoi_models::{DataEvent, SharedTask, Task};
use dotoi_repository::{TaskFilter, TaskRepository};
use tracing::{debug, info, warn};

use crate::clock::Clock;

/// Translates bus events into repository mutations and derived events.
///
/// The service subscribes itself on construction and stays subscribed until
/// [`TaskService::detach`] is called; dropping the returned `Arc` alone does
/// not unsubscribe it.
///
/// The service holds its bus and the bus holds the service, both through
/// `Arc`. Dropping them without calling `detach` (or
/// [`Engine::shutdown`](crate::Engine::shutdown)) leaks both, along with the
/// repository and clock.
///
/// | Received | Action |
/// |---|---|
/// | `RequestTasks` | publish `TasksFetched` with a repository snapshot |
/// | `TaskAdded` | save |
/// | `TaskDeleted` | delete |
/// | `TaskUpdate` | delete, then save (replace by id) |
/// | `CheckRecurrence` | reset completed recurring tasks that are due |
/// | `CheckDeadlines` | report pending tasks past their deadline |
pub struct TaskService {
    bus: Arc<EventBus>,
    repository: Arc<dyn TaskRepository>,
    clock: Arc<dyn Clock>,
}

impl TaskService {
    /// Creates the service and subscribes it to `bus`.
    pub fn new(
        bus: Arc<EventBus>,
        repository: Arc<dyn TaskRepository>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        let service = Arc::new(Self {
            bus: Arc::clone(&bus),
            repository,
            clock,
        });
        bus.subscribe(service.clone());
        info!("task service initialized");
        service
    }

    /// Unsubscribes the service from the bus.
    pub fn detach(self: &Arc<Self>) -> bool {
        let me: Arc<dyn Subscriber> = self.clone();
        let removed = self.bus.unsubscribe(&me);
        if removed {
            info!("task service detached");
        }
        removed
    }

    /// Returns the repository the service writes to.
    pub fn repository(&self) -> &Arc<dyn TaskRepository> {
        &self.repository
    }

    /// Completes `task` and publishes `TaskCompleted` if it was pending.
    pub fn complete_task(&self, task: &SharedTask) -> bool {
        match task.complete() {
            Some(event) => {
                debug!(task_id = %task.id(), "task completed");
                self.bus.publish(event);
                true
            }
            None => false,
        }
    }

    /// Reopens `task` and publishes `TaskUncompleted` if it was completed.
    pub fn uncomplete_task(&self, task: &SharedTask) -> bool {
        match task.uncomplete() {
            Some(event) => {
                debug!(task_id = %task.id(), "task reopened");
                self.bus.publish(event);
                true
            }
            None => false,
        }
    }

    /// Resets every completed recurring task whose rule fires now.
    ///
    /// Each reset publishes `TaskUncompleted` followed by `TaskUpdate`.
    /// Returns the number of tasks reset.
    ///
    /// Rules keep no record of the last reset: while a rule fires (all day
    /// on a weekly rule's weekday, always for a daily rule without an end
    /// date) a task completed in the meantime is reset again by the next
    /// check.
    pub fn check_recurrence(&self) -> usize {
        info!("performing recurrence check");
        let now = self.clock.now();

        self.perform_check(
            TaskFilter::new().with_recurrence(true),
            true,
            |task| {
                task.recurrence_rule()
                    .is_some_and(|rule| rule.should_repeat(now))
            },
            |task| {
                let Some(event) = task.uncomplete() else {
                    return false;
                };
                debug!(task_id = %task.id(), title = %task.title(), "recurring task reset");
                self.bus.publish(event);
                self.bus.publish(DataEvent::TaskUpdate(Arc::clone(task)));
                true
            },
        )
    }

    /// Publishes `TaskOverdue` for every pending task past its deadline.
    ///
    /// Returns the number of overdue tasks reported.
    pub fn check_deadlines(&self) -> usize {
        info!("performing deadline check");
        let now = self.clock.now();

        self.perform_check(
            TaskFilter::new().with_deadline(true),
            false,
            |task| task.is_past_deadline(now),
            |task| {
                warn!(task_id = %task.id(), title = %task.title(), "task is overdue");
                self.bus.publish(DataEvent::TaskOverdue(Arc::clone(task)));
                true
            },
        )
    }

    /// Shared pipeline of the maintenance checks.
    ///
    /// Filters a repository snapshot by attribute (`what`), then by
    /// completion state, then by the time condition (`when`), and applies
    /// `action` to what is left. Returns how many actions reported success.
    fn perform_check(
        &self,
        what: TaskFilter,
        completed: bool,
        when: impl Fn(&Task) -> bool,
        action: impl Fn(&SharedTask) -> bool,
    ) -> usize {
        let candidates: Vec<SharedTask> = self
            .repository
            .find_all()
            .into_iter()
            .filter(|t| what.matches(t))
            .filter(|t| t.is_completed() == completed)
            .filter(|t| when(t.as_ref()))
            .collect();

        candidates.iter().filter(|&t| action(t)).count()
    }
}

impl Subscriber for TaskService {
    fn on_event(&self, event: &DataEvent) -> Result<(), SubscriberError> {
        debug!(event = event.kind(), "task service received event");

        match event {
            DataEvent::RequestTasks => {
                let tasks = self.repository.find_all();
                debug!(count = tasks.len(), "publishing fetched tasks");
                self.bus.publish(DataEvent::TasksFetched(tasks));
            }
            DataEvent::TaskAdded(task) => {
                info!(task_id = %task.id(), "adding task to the repository");
                self.repository.save(Arc::clone(task));
            }
            DataEvent::TaskDeleted(task) => {
                info!(task_id = %task.id(), "removing task from the repository");
                self.repository.delete(task);
            }
            DataEvent::TaskUpdate(task) => {
                // Identity is the id, which an edit never changes.
                info!(task_id = %task.id(), "updating task in the repository");
                self.repository.delete(task);
                self.repository.save(Arc::clone(task));
            }
            DataEvent::CheckRecurrence => {
                self.check_recurrence();
            }
            DataEvent::CheckDeadlines => {
                self.check_deadlines();
            }
            DataEvent::TaskCompleted(_)
            | DataEvent::TaskUncompleted(_)
            | DataEvent::TasksFetched(_)
            | DataEvent::TaskOverdue(_) => {}
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "task-service"
    }
}

impl fmt::Debug for TaskService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskService")
            .field("tasks", &self.repository.len())
            .finish()
    }
}

//! Events delivered through the event bus.

use serde::{Deserialize, Serialize};

use crate::task::SharedTask;

/// The closed set of messages exchanged between task producers and consumers.
///
/// Intent events (`TaskAdded`, `TaskDeleted`, `TaskUpdate`, `RequestTasks`)
/// come from the outside; result events are published by the task service;
/// maintenance events are injected by the scheduler. Consumers match on this
/// enum exhaustively, so adding a variant is a compile-time-visible change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum DataEvent {
    /// A new task should be stored.
    TaskAdded(SharedTask),
    /// A task should be removed.
    TaskDeleted(SharedTask),
    /// A task should replace the stored task with the same id.
    TaskUpdate(SharedTask),
    /// A task moved from pending to completed.
    TaskCompleted(SharedTask),
    /// A task moved from completed back to pending.
    TaskUncompleted(SharedTask),
    /// Request for the current list of tasks.
    RequestTasks,
    /// Snapshot of all stored tasks, answering `RequestTasks`.
    TasksFetched(Vec<SharedTask>),
    /// A pending task is past its deadline.
    TaskOverdue(SharedTask),
    /// Re-evaluate recurring tasks.
    CheckRecurrence,
    /// Re-evaluate task deadlines.
    CheckDeadlines,
}

impl DataEvent {
    /// Short name of the variant, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DataEvent::TaskAdded(_) => "task_added",
            DataEvent::TaskDeleted(_) => "task_deleted",
            DataEvent::TaskUpdate(_) => "task_update",
            DataEvent::TaskCompleted(_) => "task_completed",
            DataEvent::TaskUncompleted(_) => "task_uncompleted",
            DataEvent::RequestTasks => "request_tasks",
            DataEvent::TasksFetched(_) => "tasks_fetched",
            DataEvent::TaskOverdue(_) => "task_overdue",
            DataEvent::CheckRecurrence => "check_recurrence",
            DataEvent::CheckDeadlines => "check_deadlines",
        }
    }

    /// Returns the single task carried by this event, if any.
    pub fn task(&self) -> Option<&SharedTask> {
        match self {
            DataEvent::TaskAdded(task)
            | DataEvent::TaskDeleted(task)
            | DataEvent::TaskUpdate(task)
            | DataEvent::TaskCompleted(task)
            | DataEvent::TaskUncompleted(task)
            | DataEvent::TaskOverdue(task) => Some(task),
            DataEvent::RequestTasks
            | DataEvent::TasksFetched(_)
            | DataEvent::CheckRecurrence
            | DataEvent::CheckDeadlines => None,
        }
    }

    /// Returns true for events that ask the engine to change or report state.
    pub fn is_intent(&self) -> bool {
        matches!(
            self,
            DataEvent::TaskAdded(_)
                | DataEvent::TaskDeleted(_)
                | DataEvent::TaskUpdate(_)
                | DataEvent::RequestTasks
        )
    }

    /// Returns true for the scheduler's periodic check events.
    pub fn is_maintenance(&self) -> bool {
        matches!(self, DataEvent::CheckRecurrence | DataEvent::CheckDeadlines)
    }
}

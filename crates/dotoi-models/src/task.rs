//! Task entity and its completion state machine.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::builders::TaskBuilder;
use crate::error::ModelError;
use crate::event::DataEvent;
use crate::ids::TaskId;
use crate::recurrence::RecurrenceRule;

/// A task shared between the repository, events and subscribers.
///
/// Every holder sees the same completion flag.
pub type SharedTask = Arc<Task>;

/// Returns the current local wall-clock time.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Completion state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Not yet done.
    Pending,
    /// Marked as done.
    Completed,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskState::Pending => write!(f, "pending"),
            TaskState::Completed => write!(f, "completed"),
        }
    }
}

/// A user-defined unit of work.
///
/// All fields are fixed at construction except the completion flag, which
/// only changes through [`Task::complete`] and [`Task::uncomplete`].
///
/// Equality and hashing use the [`TaskId`] only: two instances with the same
/// id are the same logical task even if their other fields differ. The
/// repository relies on this to replace a task on update.
#[derive(Debug, Serialize, Deserialize)]
#[serde(try_from = "RawTask")]
pub struct Task {
    id: TaskId,
    title: String,
    description: String,
    content: String,
    hyperlinks: Vec<String>,
    created_at: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    deadline: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recurrence_rule: Option<RecurrenceRule>,
    completed: AtomicBool,
}

/// Wire form of a task, rebuilt through [`TaskBuilder`] so a decoded task
/// passes the same validation as a constructed one.
#[derive(Deserialize)]
struct RawTask {
    id: TaskId,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    hyperlinks: Vec<String>,
    created_at: NaiveDateTime,
    #[serde(default)]
    deadline: Option<NaiveDateTime>,
    #[serde(default)]
    recurrence_rule: Option<RecurrenceRule>,
    #[serde(default)]
    completed: bool,
}

impl TryFrom<RawTask> for Task {
    type Error = ModelError;

    fn try_from(raw: RawTask) -> Result<Self, Self::Error> {
        let mut builder = TaskBuilder::new(raw.title)
            .id(raw.id)
            .description(raw.description)
            .content(raw.content)
            .hyperlinks(raw.hyperlinks)
            .created_at(raw.created_at)
            .completed(raw.completed);
        if let Some(deadline) = raw.deadline {
            builder = builder.deadline(deadline);
        }
        if let Some(rule) = raw.recurrence_rule {
            builder = builder.recurrence_rule(rule);
        }
        builder.build()
    }
}

impl Task {
    /// Creates a builder for a new task.
    pub fn builder(title: impl Into<String>) -> TaskBuilder {
        TaskBuilder::new(title)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: TaskId,
        title: String,
        description: String,
        content: String,
        hyperlinks: Vec<String>,
        created_at: NaiveDateTime,
        deadline: Option<NaiveDateTime>,
        recurrence_rule: Option<RecurrenceRule>,
        completed: bool,
    ) -> Self {
        Self {
            id,
            title,
            description,
            content,
            hyperlinks,
            created_at,
            deadline,
            recurrence_rule,
            completed: AtomicBool::new(completed),
        }
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn hyperlinks(&self) -> &[String] {
        &self.hyperlinks
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn deadline(&self) -> Option<NaiveDateTime> {
        self.deadline
    }

    pub fn recurrence_rule(&self) -> Option<&RecurrenceRule> {
        self.recurrence_rule.as_ref()
    }

    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    /// Returns the current completion state.
    pub fn state(&self) -> TaskState {
        if self.is_completed() {
            TaskState::Completed
        } else {
            TaskState::Pending
        }
    }

    /// Returns true if the task has a deadline strictly before `now`.
    ///
    /// Completion is not considered here; callers decide whether completed
    /// tasks count.
    pub fn is_past_deadline(&self, now: NaiveDateTime) -> bool {
        self.deadline.is_some_and(|deadline| deadline < now)
    }

    /// Marks the task as completed.
    ///
    /// Returns the `TaskCompleted` event for the caller to publish, or `None`
    /// if the task was already completed. Under concurrent calls exactly one
    /// caller gets the event.
    pub fn complete(self: &Arc<Self>) -> Option<DataEvent> {
        self.completed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| DataEvent::TaskCompleted(Arc::clone(self)))
    }

    /// Marks the task as pending again.
    ///
    /// Returns the `TaskUncompleted` event for the caller to publish, or
    /// `None` if the task was already pending.
    pub fn uncomplete(self: &Arc<Self>) -> Option<DataEvent> {
        self.completed
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| DataEvent::TaskUncompleted(Arc::clone(self)))
    }

    /// Creates a builder pre-filled with this task's fields and id.
    ///
    /// Building it yields a task equal to this one, which is how an edited
    /// copy is produced for a `TaskUpdate`.
    pub fn to_builder(&self) -> TaskBuilder {
        let mut builder = TaskBuilder::new(self.title.clone())
            .id(self.id.clone())
            .description(self.description.clone())
            .content(self.content.clone())
            .hyperlinks(self.hyperlinks.clone())
            .created_at(self.created_at)
            .completed(self.is_completed());
        if let Some(deadline) = self.deadline {
            builder = builder.deadline(deadline);
        }
        if let Some(rule) = &self.recurrence_rule {
            builder = builder.recurrence_rule(rule.clone());
        }
        builder
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Task {}

impl Hash for Task {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.id)
    }
}

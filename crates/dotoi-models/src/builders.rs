//! Builder patterns for tasks and recurrence rules.

use chrono::{NaiveDateTime, Weekday};

use crate::error::{ModelError, Result};
use crate::ids::TaskId;
use crate::recurrence::{RecurrenceRule, RecurrenceType};
use crate::task::{self, Task};

/// Builder for creating Task instances with a fluent API.
///
/// The title is the only required field; `build` rejects a blank one.
#[derive(Debug, Clone)]
pub struct TaskBuilder {
    id: Option<TaskId>,
    title: String,
    description: String,
    content: String,
    hyperlinks: Vec<String>,
    created_at: Option<NaiveDateTime>,
    deadline: Option<NaiveDateTime>,
    recurrence_rule: Option<RecurrenceRule>,
    completed: bool,
}

impl TaskBuilder {
    /// Creates a new TaskBuilder with the required title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: String::new(),
            content: String::new(),
            hyperlinks: Vec::new(),
            created_at: None,
            deadline: None,
            recurrence_rule: None,
            completed: false,
        }
    }

    /// Sets an explicit id (defaults to a freshly generated one).
    pub fn id(mut self, id: impl Into<TaskId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the short description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the free-text content.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Replaces the hyperlinks.
    pub fn hyperlinks<I, S>(mut self, hyperlinks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hyperlinks = hyperlinks.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a single hyperlink.
    pub fn add_hyperlink(mut self, hyperlink: impl Into<String>) -> Self {
        self.hyperlinks.push(hyperlink.into());
        self
    }

    /// Sets the creation time (defaults to now).
    pub fn created_at(mut self, created_at: NaiveDateTime) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn deadline(mut self, deadline: NaiveDateTime) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn recurrence_rule(mut self, rule: RecurrenceRule) -> Self {
        self.recurrence_rule = Some(rule);
        self
    }

    /// Sets the initial completion flag.
    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Builds the Task.
    pub fn build(self) -> Result<Task> {
        if self.title.trim().is_empty() {
            return Err(ModelError::EmptyTitle);
        }

        Ok(Task::from_parts(
            self.id.unwrap_or_default(),
            self.title,
            self.description,
            self.content,
            self.hyperlinks,
            self.created_at.unwrap_or_else(task::now),
            self.deadline,
            self.recurrence_rule,
            self.completed,
        ))
    }
}

/// Builder for creating RecurrenceRule instances.
#[derive(Debug, Clone)]
pub struct RecurrenceRuleBuilder {
    recurrence_type: RecurrenceType,
    interval: u32,
    day_of_week: Option<Weekday>,
    day_of_month: Option<u32>,
    end_date: Option<NaiveDateTime>,
}

impl RecurrenceRuleBuilder {
    /// Creates a builder with an interval of 1.
    pub fn new(recurrence_type: RecurrenceType) -> Self {
        Self {
            recurrence_type,
            interval: 1,
            day_of_week: None,
            day_of_month: None,
            end_date: None,
        }
    }

    /// Sets the interval between repetitions, in the type's unit.
    pub fn interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the day of week (weekly rules).
    pub fn day_of_week(mut self, day_of_week: Weekday) -> Self {
        self.day_of_week = Some(day_of_week);
        self
    }

    /// Sets the day of month (monthly rules).
    pub fn day_of_month(mut self, day_of_month: u32) -> Self {
        self.day_of_month = Some(day_of_month);
        self
    }

    /// Sets the date after which the rule stops repeating.
    pub fn end_date(mut self, end_date: NaiveDateTime) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Builds the RecurrenceRule.
    pub fn build(self) -> Result<RecurrenceRule> {
        if self.interval == 0 {
            return Err(ModelError::InvalidInterval(self.interval));
        }

        match self.recurrence_type {
            RecurrenceType::Daily => {}
            RecurrenceType::Weekly => {
                if self.day_of_week.is_none() {
                    return Err(ModelError::MissingDayOfWeek);
                }
            }
            RecurrenceType::Monthly => match self.day_of_month {
                Some(day) if (1..=31).contains(&day) => {}
                other => return Err(ModelError::InvalidDayOfMonth(other.unwrap_or(0))),
            },
        }

        Ok(RecurrenceRule {
            recurrence_type: self.recurrence_type,
            interval: self.interval,
            day_of_week: self.day_of_week,
            day_of_month: self.day_of_month,
            end_date: self.end_date,
        })
    }
}

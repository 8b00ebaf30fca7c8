//! Task filtering for queries and maintenance checks.

use chrono::NaiveDateTime;
use dotoi_models::{RecurrenceType, Task};

/// Filter criteria for querying tasks.
///
/// Every criterion left as `None` matches all tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Filter by whether a deadline is set.
    pub has_deadline: Option<bool>,
    /// Filter by whether a recurrence rule is set.
    pub has_recurrence: Option<bool>,
    /// Filter by recurrence type (implies a rule is set).
    pub recurrence_type: Option<RecurrenceType>,
    /// Filter by completion flag.
    pub completed: Option<bool>,
    /// Only tasks whose deadline is strictly before this moment.
    pub deadline_before: Option<NaiveDateTime>,
}

impl TaskFilter {
    /// Creates a new empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the deadline presence filter.
    pub fn with_deadline(mut self, has_deadline: bool) -> Self {
        self.has_deadline = Some(has_deadline);
        self
    }

    /// Sets the recurrence presence filter.
    pub fn with_recurrence(mut self, has_recurrence: bool) -> Self {
        self.has_recurrence = Some(has_recurrence);
        self
    }

    /// Sets the recurrence type filter.
    pub fn with_recurrence_type(mut self, recurrence_type: RecurrenceType) -> Self {
        self.recurrence_type = Some(recurrence_type);
        self
    }

    /// Sets the completion filter.
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Keeps only tasks due strictly before `moment`.
    pub fn with_deadline_before(mut self, moment: NaiveDateTime) -> Self {
        self.deadline_before = Some(moment);
        self
    }

    /// Returns true if the task matches this filter.
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(has_deadline) = self.has_deadline {
            if task.deadline().is_some() != has_deadline {
                return false;
            }
        }

        if let Some(has_recurrence) = self.has_recurrence {
            if task.recurrence_rule().is_some() != has_recurrence {
                return false;
            }
        }

        if let Some(recurrence_type) = self.recurrence_type {
            if task.recurrence_rule().map(|r| r.recurrence_type()) != Some(recurrence_type) {
                return false;
            }
        }

        if let Some(completed) = self.completed {
            if task.is_completed() != completed {
                return false;
            }
        }

        if let Some(moment) = self.deadline_before {
            if !task.is_past_deadline(moment) {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Weekday};
    use dotoi_models::RecurrenceRule;

    fn at(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, d)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = TaskFilter::new();
        let task = Task::builder("Anything").build().unwrap();
        assert!(filter.matches(&task));
    }

    #[test]
    fn test_filter_by_deadline() {
        let filter = TaskFilter::new().with_deadline(true);

        let with = Task::builder("Due").deadline(at(3)).build().unwrap();
        let without = Task::builder("Open").build().unwrap();

        assert!(filter.matches(&with));
        assert!(!filter.matches(&without));
    }

    #[test]
    fn test_filter_by_recurrence() {
        let rule = RecurrenceRule::builder(RecurrenceType::Weekly)
            .day_of_week(Weekday::Tue)
            .build()
            .unwrap();
        let recurring = Task::builder("Gym").recurrence_rule(rule).build().unwrap();
        let once = Task::builder("Dentist").build().unwrap();

        let filter = TaskFilter::new().with_recurrence(true);
        assert!(filter.matches(&recurring));
        assert!(!filter.matches(&once));

        let weekly = TaskFilter::new().with_recurrence_type(RecurrenceType::Weekly);
        let monthly = TaskFilter::new().with_recurrence_type(RecurrenceType::Monthly);
        assert!(weekly.matches(&recurring));
        assert!(!monthly.matches(&recurring));
        assert!(!weekly.matches(&once));
    }

    #[test]
    fn test_filter_by_completed() {
        let done = Task::builder("Done").completed(true).build().unwrap();
        let open = Task::builder("Open").build().unwrap();

        let filter = TaskFilter::new().with_completed(false);
        assert!(!filter.matches(&done));
        assert!(filter.matches(&open));
    }

    #[test]
    fn test_filter_by_deadline_before() {
        let task = Task::builder("Due").deadline(at(10)).build().unwrap();

        assert!(TaskFilter::new().with_deadline_before(at(11)).matches(&task));
        assert!(!TaskFilter::new().with_deadline_before(at(10)).matches(&task));
    }

    #[test]
    fn test_combined_filters() {
        let filter = TaskFilter::new()
            .with_deadline(true)
            .with_completed(false)
            .with_deadline_before(at(20));

        let overdue = Task::builder("Late").deadline(at(1)).build().unwrap();
        let closed = Task::builder("Closed")
            .deadline(at(1))
            .completed(true)
            .build()
            .unwrap();
        let upcoming = Task::builder("Soon").deadline(at(25)).build().unwrap();

        assert!(filter.matches(&overdue));
        assert!(!filter.matches(&closed));
        assert!(!filter.matches(&upcoming));
    }
}

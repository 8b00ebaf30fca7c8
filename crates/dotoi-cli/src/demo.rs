//! Sample tasks seeded by `--demo`.

use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDateTime};
use dotoi_models::{DataEvent, RecurrenceRule, RecurrenceType, Result, SharedTask, Task};

/// Builds a small set of tasks exercising deadlines and recurrence.
///
/// One task is already overdue at `now`, and one recurring task is
/// completed and due to reset today.
pub fn sample_tasks(now: NaiveDateTime) -> Result<Vec<SharedTask>> {
    let overdue = Task::builder("Renew library books")
        .description("Three books, due at the front desk")
        .deadline(now - Duration::hours(2))
        .build()?;

    let upcoming = Task::builder("Book dentist appointment")
        .deadline(now + Duration::days(3))
        .add_hyperlink("https://example.org/dentist")
        .build()?;

    let weekly = Task::builder("Water the plants")
        .recurrence_rule(
            RecurrenceRule::builder(RecurrenceType::Weekly)
                .day_of_week(now.weekday())
                .build()?,
        )
        .completed(true)
        .build()?;

    let monthly = Task::builder("Pay rent")
        .recurrence_rule(
            RecurrenceRule::builder(RecurrenceType::Monthly)
                .day_of_month(1)
                .build()?,
        )
        .build()?;

    Ok([overdue, upcoming, weekly, monthly]
        .into_iter()
        .map(Arc::new)
        .collect())
}

/// Wraps each task in a `TaskAdded` intent.
pub fn seed_events(tasks: &[SharedTask]) -> Vec<DataEvent> {
    tasks
        .iter()
        .map(|task| DataEvent::TaskAdded(Arc::clone(task)))
        .collect()
}

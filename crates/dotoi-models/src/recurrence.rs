//! Recurrence rules for repeating tasks.
//!
//! A rule decides, for a given moment, whether a completed recurring task
//! should be reset to pending.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::builders::RecurrenceRuleBuilder;
use crate::error::ModelError;

/// How often a task repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceType {
    /// Repeats every `interval` days.
    Daily,
    /// Repeats on a given day of the week.
    Weekly,
    /// Repeats on a given day of the month.
    Monthly,
}

impl RecurrenceType {
    /// Unit in which the rule's interval is counted.
    pub fn interval_unit(&self) -> IntervalUnit {
        match self {
            RecurrenceType::Daily => IntervalUnit::Days,
            RecurrenceType::Weekly => IntervalUnit::Weeks,
            RecurrenceType::Monthly => IntervalUnit::Months,
        }
    }
}

/// Calendar unit used for interval gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalUnit {
    Days,
    Weeks,
    Months,
}

impl IntervalUnit {
    /// Whole units from `start` to `end`, truncated toward zero.
    ///
    /// Months are counted on the calendar: Jan 31 to Feb 28 is zero months,
    /// Jan 31 to Mar 31 is two.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        match self {
            IntervalUnit::Days => (end - start).num_days(),
            IntervalUnit::Weeks => (end - start).num_days() / 7,
            IntervalUnit::Months => {
                let packed = |d: NaiveDate| {
                    let proleptic_month = i64::from(d.year()) * 12 + i64::from(d.month0());
                    proleptic_month * 32 + i64::from(d.day())
                };
                (packed(end) - packed(start)) / 32
            }
        }
    }
}

/// Immutable policy describing when a recurring task repeats.
///
/// Deserialization runs the same checks as [`RecurrenceRuleBuilder::build`],
/// so a stored rule can never carry a zero interval or a missing day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRecurrenceRule")]
pub struct RecurrenceRule {
    pub(crate) recurrence_type: RecurrenceType,
    pub(crate) interval: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) day_of_week: Option<Weekday>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) day_of_month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) end_date: Option<NaiveDateTime>,
}

/// Wire form of a rule, validated into a [`RecurrenceRule`].
#[derive(Deserialize)]
struct RawRecurrenceRule {
    recurrence_type: RecurrenceType,
    #[serde(default = "default_interval")]
    interval: u32,
    #[serde(default)]
    day_of_week: Option<Weekday>,
    #[serde(default)]
    day_of_month: Option<u32>,
    #[serde(default)]
    end_date: Option<NaiveDateTime>,
}

fn default_interval() -> u32 {
    1
}

impl TryFrom<RawRecurrenceRule> for RecurrenceRule {
    type Error = ModelError;

    fn try_from(raw: RawRecurrenceRule) -> Result<Self, Self::Error> {
        let mut builder = RecurrenceRuleBuilder::new(raw.recurrence_type).interval(raw.interval);
        if let Some(day) = raw.day_of_week {
            builder = builder.day_of_week(day);
        }
        if let Some(day) = raw.day_of_month {
            builder = builder.day_of_month(day);
        }
        if let Some(end) = raw.end_date {
            builder = builder.end_date(end);
        }
        builder.build()
    }
}

impl RecurrenceRule {
    /// Creates a builder for a rule of the given type.
    pub fn builder(recurrence_type: RecurrenceType) -> RecurrenceRuleBuilder {
        RecurrenceRuleBuilder::new(recurrence_type)
    }

    pub fn recurrence_type(&self) -> RecurrenceType {
        self.recurrence_type
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn day_of_week(&self) -> Option<Weekday> {
        self.day_of_week
    }

    pub fn day_of_month(&self) -> Option<u32> {
        self.day_of_month
    }

    pub fn end_date(&self) -> Option<NaiveDateTime> {
        self.end_date
    }

    pub fn has_end_date(&self) -> bool {
        self.end_date.is_some()
    }

    /// Unit in which this rule's interval is counted.
    pub fn interval_unit(&self) -> IntervalUnit {
        self.recurrence_type.interval_unit()
    }

    /// Returns true if a recurring task should be reset at `now`.
    ///
    /// Past the end date a rule never repeats. Interval gating counts whole
    /// units between `now` and the end date, so without an end date the
    /// interval condition always holds and only the day match (weekly,
    /// monthly) restricts repetition.
    pub fn should_repeat(&self, now: NaiveDateTime) -> bool {
        if self.end_date.is_some_and(|end| now > end) {
            return false;
        }

        match self.recurrence_type {
            RecurrenceType::Daily => self.interval_elapsed(now),
            RecurrenceType::Weekly => {
                self.interval_elapsed(now) && self.day_of_week == Some(now.weekday())
            }
            RecurrenceType::Monthly => {
                self.interval_elapsed(now) && self.day_of_month == Some(now.day())
            }
        }
    }

    fn interval_elapsed(&self, now: NaiveDateTime) -> bool {
        let Some(end) = self.end_date else {
            return true;
        };
        let between = self.interval_unit().between(now.date(), end.date());
        between % i64::from(self.interval) == 0
    }
}

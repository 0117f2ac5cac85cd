//! Calendar-day views over a task collection.
//!
//! Every function is read-only and returns owned copies. "Today" is never
//! read from the environment: callers pass a [`Calendar`] carrying both the
//! current instant and the UTC offset used to turn it into a calendar day.

use std::cmp::Reverse;

use time::{Date, OffsetDateTime, UtcOffset};

use crate::task::Task;
use crate::text_matcher::TextMatcher;

/// Explicit "now" plus the offset that defines the local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    now: OffsetDateTime,
    offset: UtcOffset,
}

impl Calendar {
    /// Build a calendar for `now` observed at `offset`.
    #[must_use]
    pub const fn new(now: OffsetDateTime, offset: UtcOffset) -> Self {
        Self { now, offset }
    }

    /// Calendar anchored in UTC.
    #[must_use]
    pub const fn utc(now: OffsetDateTime) -> Self {
        Self::new(now, UtcOffset::UTC)
    }

    /// The instant the calendar was built for.
    #[must_use]
    pub const fn now(&self) -> OffsetDateTime {
        self.now
    }

    /// Offset used for day boundaries.
    #[must_use]
    pub const fn offset(&self) -> UtcOffset {
        self.offset
    }

    /// The local calendar day of `now`.
    #[must_use]
    pub fn today(&self) -> Date {
        self.now.to_offset(self.offset).date()
    }
}

/// Where an open, dated task falls relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DueBucket {
    /// Due before today.
    Overdue,
    /// Due today.
    Today,
    /// Due after today.
    Upcoming,
}

/// Classify a task into exactly one due bucket.
///
/// Tasks without a due date, completed tasks, and archived tasks have no bucket.
#[must_use]
pub fn due_bucket(task: &Task, calendar: &Calendar) -> Option<DueBucket> {
    if task.completed || task.archived {
        return None;
    }
    let due = task.due_date?;
    let today = calendar.today();
    Some(match due.cmp(&today) {
        std::cmp::Ordering::Less => DueBucket::Overdue,
        std::cmp::Ordering::Equal => DueBucket::Today,
        std::cmp::Ordering::Greater => DueBucket::Upcoming,
    })
}

fn in_bucket(tasks: &[Task], calendar: &Calendar, bucket: DueBucket) -> Vec<Task> {
    collect(tasks, |task| due_bucket(task, calendar) == Some(bucket))
}

fn collect(tasks: &[Task], predicate: impl Fn(&Task) -> bool) -> Vec<Task> {
    tasks.iter().filter(|task| predicate(task)).cloned().collect()
}

/// Open tasks due on the current calendar day.
#[must_use]
pub fn today(tasks: &[Task], calendar: &Calendar) -> Vec<Task> {
    in_bucket(tasks, calendar, DueBucket::Today)
}

/// Open tasks due after the current calendar day.
#[must_use]
pub fn upcoming(tasks: &[Task], calendar: &Calendar) -> Vec<Task> {
    in_bucket(tasks, calendar, DueBucket::Upcoming)
}

/// Open tasks whose due day has passed.
#[must_use]
pub fn overdue(tasks: &[Task], calendar: &Calendar) -> Vec<Task> {
    in_bucket(tasks, calendar, DueBucket::Overdue)
}

/// Completed tasks, regardless of due date.
#[must_use]
pub fn completed(tasks: &[Task]) -> Vec<Task> {
    collect(tasks, |task| task.completed)
}

/// Archived tasks.
#[must_use]
pub fn archived(tasks: &[Task]) -> Vec<Task> {
    collect(tasks, |task| task.archived)
}

/// Tasks tagged with exactly `category_id`.
#[must_use]
pub fn by_category(tasks: &[Task], category_id: &str) -> Vec<Task> {
    collect(tasks, |task| task.category_id == category_id)
}

/// Tasks whose title or category contains `query`; blank queries keep everything.
#[must_use]
pub fn search(tasks: &[Task], query: &str) -> Vec<Task> {
    match TextMatcher::new(query) {
        Some(matcher) => collect(tasks, |task| matcher.matches(task)),
        None => tasks.to_vec(),
    }
}

/// The `limit` most recently created incomplete tasks, newest first.
#[must_use]
pub fn recent_pending(tasks: &[Task], limit: usize) -> Vec<Task> {
    let mut pending = collect(tasks, |task| !task.completed);
    pending.sort_by_key(|task| Reverse(task.created_at));
    pending.truncate(limit);
    pending
}

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Date, OffsetDateTime};

use crate::id::TaskId;
use crate::tracking::TimeTracking;

/// Category assigned when a task is created without one.
pub const DEFAULT_CATEGORY: &str = "work";

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Default priority.
    #[default]
    Medium,
    /// Needs attention first.
    High,
}

impl Priority {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a priority token is not one of `low`, `medium`, `high`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid priority: {0}")]
pub struct ParsePriorityError(String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParsePriorityError(s.to_owned())),
        }
    }
}

/// A tracked work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Immutable identifier.
    #[serde(alias = "Id")]
    pub id: TaskId,
    /// Human-readable title.
    pub title: String,
    /// Completion flag, paired with `completed_at`.
    #[serde(default)]
    pub completed: bool,
    /// Free-form category tag.
    #[serde(default = "default_category")]
    pub category_id: String,
    /// Priority level.
    #[serde(default)]
    pub priority: Priority,
    /// Calendar day the task is due.
    #[serde(default, with = "due_date")]
    pub due_date: Option<Date>,
    /// Creation instant.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Instant the task was last marked completed.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    /// Archive flag, paired with `archived_at`.
    #[serde(default)]
    pub archived: bool,
    /// Instant the task was archived.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub archived_at: Option<OffsetDateTime>,
    /// Timer state.
    #[serde(default)]
    pub time_tracking: TimeTracking,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_owned()
}

impl Task {
    /// Build a fresh task from creation input.
    #[must_use]
    pub fn create(id: TaskId, input: NewTask, now: OffsetDateTime) -> Self {
        let NewTask {
            title,
            category_id,
            priority,
            due_date,
        } = input;
        Self {
            id,
            title,
            completed: false,
            category_id: category_id.unwrap_or_else(default_category),
            priority: priority.unwrap_or_default(),
            due_date,
            created_at: now,
            completed_at: None,
            archived: false,
            archived_at: None,
            time_tracking: TimeTracking::default(),
        }
    }

    /// Set the completion flag; `completed_at` only moves when the flag changes.
    pub fn set_completed(&mut self, completed: bool, now: OffsetDateTime) {
        if self.completed != completed {
            self.completed = completed;
            self.completed_at = completed.then_some(now);
        }
    }

    /// Set the archive flag; `archived_at` only moves when the flag changes.
    pub fn set_archived(&mut self, archived: bool, now: OffsetDateTime) {
        if self.archived != archived {
            self.archived = archived;
            self.archived_at = archived.then_some(now);
        }
    }

    /// Merge a patch onto the task. The identifier is never touched.
    pub fn apply_patch(&mut self, patch: &TaskPatch, now: OffsetDateTime) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(category) = &patch.category_id {
            self.category_id.clone_from(category);
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        match patch.due_date {
            Some(DueDatePatch::Set(date)) => self.due_date = Some(date),
            Some(DueDatePatch::Clear) => self.due_date = None,
            None => {}
        }
        if let Some(completed) = patch.completed {
            self.set_completed(completed, now);
        }
        if let Some(archived) = patch.archived {
            self.set_archived(archived, now);
        }
    }

    /// Repair flag/timestamp pairs in externally supplied records.
    ///
    /// A flag without a timestamp borrows `created_at`; a timestamp without
    /// its flag is dropped. The tracked total is rebuilt from the sessions.
    pub fn normalize(&mut self) {
        self.time_tracking.normalize();
        match (self.completed, self.completed_at) {
            (true, None) => self.completed_at = Some(self.created_at),
            (false, Some(_)) => self.completed_at = None,
            _ => {}
        }
        match (self.archived, self.archived_at) {
            (true, None) => self.archived_at = Some(self.created_at),
            (false, Some(_)) => self.archived_at = None,
            _ => {}
        }
    }
}

/// Creation input for a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    /// Title (callers are expected to pass a non-empty one).
    pub title: String,
    /// Category, defaults to [`DEFAULT_CATEGORY`].
    pub category_id: Option<String>,
    /// Priority, defaults to [`Priority::Medium`].
    pub priority: Option<Priority>,
    /// Due day.
    pub due_date: Option<Date>,
}

#[allow(clippy::missing_const_for_fn)]
impl NewTask {
    /// Creation input with only a title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the category.
    #[must_use]
    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    /// Set the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the due day.
    #[must_use]
    pub fn with_due_date(mut self, due_date: Date) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Patch for the due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueDatePatch {
    /// Overwrite with a new day.
    Set(Date),
    /// Remove the due date.
    Clear,
}

/// Partial update applied by [`Task::apply_patch`].
///
/// Timestamps and timer state are not patchable; they follow from the
/// flags and from timer operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// New title.
    pub title: Option<String>,
    /// New completion flag.
    pub completed: Option<bool>,
    /// New category.
    pub category_id: Option<String>,
    /// New priority.
    pub priority: Option<Priority>,
    /// Due date change.
    pub due_date: Option<DueDatePatch>,
    /// New archive flag.
    pub archived: Option<bool>,
}

#[allow(clippy::missing_const_for_fn)]
impl TaskPatch {
    /// Patch that only flips the completion flag.
    #[must_use]
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// Patch that only flips the archive flag.
    #[must_use]
    pub fn archived(archived: bool) -> Self {
        Self {
            archived: Some(archived),
            ..Self::default()
        }
    }

    /// Patch that only moves the task to another category.
    #[must_use]
    pub fn category(category_id: impl Into<String>) -> Self {
        Self {
            category_id: Some(category_id.into()),
            ..Self::default()
        }
    }

    /// Returns true when applying the patch would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.completed.is_none()
            && self.category_id.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.archived.is_none()
    }
}

/// Serde adapter for due dates.
///
/// Writes `YYYY-MM-DD`; reads either that or an RFC 3339 timestamp, whose
/// calendar day (in its own offset) is kept.
pub mod due_date {
    use serde::{Deserialize, Deserializer, Serializer, de, ser};
    use time::format_description::well_known::Rfc3339;
    use time::macros::format_description;
    use time::{Date, OffsetDateTime, format_description::BorrowedFormatItem};

    const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

    /// Parse a due day from `YYYY-MM-DD` or RFC 3339 input.
    ///
    /// # Errors
    /// Returns the parse error of the plain date format when neither form matches.
    pub fn parse(raw: &str) -> Result<Date, time::error::Parse> {
        let raw = raw.trim();
        Date::parse(raw, DATE_FORMAT).or_else(|err| {
            OffsetDateTime::parse(raw, &Rfc3339)
                .map(OffsetDateTime::date)
                .map_err(|_| err)
        })
    }

    /// Format a due day as `YYYY-MM-DD`.
    ///
    /// # Errors
    /// Returns an error when the year cannot be represented.
    pub fn format(date: Date) -> Result<String, time::error::Format> {
        date.format(DATE_FORMAT)
    }

    #[allow(clippy::ref_option)]
    pub(crate) fn serialize<S>(value: &Option<Date>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => s.serialize_some(&format(*date).map_err(ser::Error::custom)?),
            None => s.serialize_none(),
        }
    }

    pub(crate) fn deserialize<'de, D>(d: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(d)?;
        raw.filter(|value| !value.trim().is_empty())
            .map(|value| parse(&value).map_err(de::Error::custom))
            .transpose()
    }
}

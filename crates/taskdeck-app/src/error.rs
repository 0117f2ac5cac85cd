//! Error types for task store operations.

use taskdeck_core::{CategoryId, TaskId};
use thiserror::Error;

/// Result type for task store operations.
pub type Result<T> = std::result::Result<T, TaskError>;

/// Failures surfaced by the task and category stores.
///
/// Every variant is scoped to the single operation that produced it; the
/// store is left exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Task was not found in the collection.
    #[error("Task not found: {0}")]
    NotFound(TaskId),

    /// Stop or pause was requested for a task whose timer is idle.
    #[error("Timer is not running for task {0}")]
    TimerNotRunning(TaskId),

    /// Category was not found in the collection.
    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),

    /// Every task identifier up to `u64::MAX` has been handed out.
    #[error("Task identifiers are exhausted")]
    TaskIdsExhausted,

    /// Every category identifier up to `u64::MAX` has been handed out.
    #[error("Category identifiers are exhausted")]
    CategoryIdsExhausted,

    /// Seed data contained the same task id twice.
    #[error("Duplicate task id in seed data: {0}")]
    DuplicateTaskId(TaskId),

    /// Seed data contained the same category id twice.
    #[error("Duplicate category id in seed data: {0}")]
    DuplicateCategoryId(CategoryId),
}

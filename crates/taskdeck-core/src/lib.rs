//! Domain types and pure derived views for taskdeck.

/// Categories and per-category counts.
pub mod category;
/// Identifier types.
pub mod id;
/// Calendar-day bucketing and filtering.
pub mod query;
/// Summary counters.
pub mod stats;
/// Task records and patches.
pub mod task;
/// Case-insensitive search over task fields.
pub mod text_matcher;
/// Per-task timer state machine.
pub mod tracking;

pub use category::{Category, CategoryPatch, NewCategory};
pub use id::{CategoryId, TaskId};
pub use query::{Calendar, DueBucket};
pub use stats::TaskStats;
pub use task::{DueDatePatch, NewTask, Priority, Task, TaskPatch};
pub use text_matcher::TextMatcher;
pub use tracking::{OpenSession, Session, SessionError, TimeTracking};

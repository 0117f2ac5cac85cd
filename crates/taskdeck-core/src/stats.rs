use serde::{Deserialize, Serialize};

use crate::query::{self, Calendar};
use crate::task::Task;

/// Summary counters for a task collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    /// Number of tasks.
    pub total: usize,
    /// Number of completed tasks.
    pub completed: usize,
    /// `total - completed`.
    pub pending: usize,
    /// Size of the today bucket.
    pub today_count: usize,
    /// Size of the overdue bucket.
    pub overdue_count: usize,
    /// Completed share in whole percent.
    pub completion_rate: u32,
}

impl TaskStats {
    /// Compute counters for `tasks` at the calendar's instant.
    #[must_use]
    pub fn compute(tasks: &[Task], calendar: &Calendar) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|task| task.completed).count();
        Self {
            total,
            completed,
            pending: total - completed,
            today_count: query::today(tasks, calendar).len(),
            overdue_count: query::overdue(tasks, calendar).len(),
            completion_rate: completion_rate(completed, total),
        }
    }
}

/// `round(100 * completed / total)` with halves rounded up; zero for an empty set.
#[must_use]
pub fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let rate = (completed * 200 + total) / (total * 2);
    u32::try_from(rate).unwrap_or(u32::MAX)
}

//! Async service facade consumed by front ends.
//!
//! Each call takes the store lock once and finishes its whole mutation under
//! it, so operations are atomic with respect to each other. Tasks and
//! categories are locked in that order whenever both are needed.

use std::collections::BTreeMap;
use std::sync::Arc;

use taskdeck_core::query::{self, Calendar};
use taskdeck_core::{
    Category, CategoryId, CategoryPatch, NewCategory, NewTask, Task, TaskId, TaskPatch, TaskStats,
};
use time::UtcOffset;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::bulk::BulkExecutor;
use crate::category_repository::CategoryRepository;
use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::latency::Latency;
use crate::seed::{CategorySeed, TaskSeed};
use crate::task_repository::TaskRepository;
use crate::time_tracker::TimeTracker;

/// Service facade that owns the task and category stores.
///
/// Clones share the same stores.
pub struct TaskService<C = SystemClock> {
    tasks: Arc<Mutex<TaskRepository<C>>>,
    categories: Arc<Mutex<CategoryRepository>>,
    offset: UtcOffset,
    latency: Latency,
}

impl<C> Clone for TaskService<C> {
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            categories: Arc::clone(&self.categories),
            offset: self.offset,
            latency: self.latency,
        }
    }
}

impl<C: Clock> TaskService<C> {
    /// Build a service over the given stores, with UTC day boundaries and no latency.
    pub fn new(tasks: TaskRepository<C>, categories: CategoryRepository) -> Self {
        Self {
            tasks: Arc::new(Mutex::new(tasks)),
            categories: Arc::new(Mutex::new(categories)),
            offset: UtcOffset::UTC,
            latency: Latency::None,
        }
    }

    /// Use `offset` to decide which calendar day "now" falls on.
    #[must_use]
    pub const fn with_offset(mut self, offset: UtcOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Delay every call by `latency`.
    #[must_use]
    pub const fn with_latency(mut self, latency: Latency) -> Self {
        self.latency = latency;
        self
    }

    /// Offset used for day boundaries.
    pub const fn offset(&self) -> UtcOffset {
        self.offset
    }

    async fn tasks(&self) -> MutexGuard<'_, TaskRepository<C>> {
        self.latency.simulate().await;
        self.tasks.lock().await
    }

    fn calendar(&self, repo: &TaskRepository<C>) -> Calendar {
        Calendar::new(repo.now(), self.offset)
    }

    /// Create a task.
    ///
    /// # Errors
    /// Returns `TaskIdsExhausted` once every identifier has been used.
    pub async fn create(&self, input: NewTask) -> Result<Task> {
        let task = self.tasks().await.create(input)?;
        info!(task = %task.id, title = %task.title, "Created task");
        Ok(task)
    }

    /// Every task.
    pub async fn get_all(&self) -> Vec<Task> {
        self.tasks().await.get_all()
    }

    /// A single task, or `None` when absent.
    pub async fn get_by_id(&self, id: TaskId) -> Option<Task> {
        self.tasks().await.get_by_id(id)
    }

    /// Tasks tagged with `category_id`.
    pub async fn get_by_category(&self, category_id: &str) -> Vec<Task> {
        query::by_category(self.tasks().await.tasks(), category_id)
    }

    /// Tasks whose title or category contains `text`.
    pub async fn search(&self, text: &str) -> Vec<Task> {
        query::search(self.tasks().await.tasks(), text)
    }

    /// Merge a patch onto a task.
    ///
    /// # Errors
    /// Returns `NotFound` when the id is unknown.
    pub async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Task> {
        let task = self.tasks().await.update(id, patch)?;
        info!(task = %id, "Updated task");
        Ok(task)
    }

    /// Remove a task permanently.
    ///
    /// # Errors
    /// Returns `NotFound` when the id is unknown.
    pub async fn delete(&self, id: TaskId) -> Result<Task> {
        let task = self.tasks().await.delete(id)?;
        info!(task = %id, "Deleted task");
        Ok(task)
    }

    /// Archive a task.
    ///
    /// # Errors
    /// Returns `NotFound` when the id is unknown.
    pub async fn archive(&self, id: TaskId) -> Result<Task> {
        let task = self.tasks().await.archive(id)?;
        info!(task = %id, "Archived task");
        Ok(task)
    }

    /// Restore an archived task.
    ///
    /// # Errors
    /// Returns `NotFound` when the id is unknown.
    pub async fn restore(&self, id: TaskId) -> Result<Task> {
        let task = self.tasks().await.restore(id)?;
        info!(task = %id, "Restored task");
        Ok(task)
    }

    /// Apply `patch` to every known id.
    pub async fn bulk_update(&self, ids: &[TaskId], patch: &TaskPatch) -> Vec<Task> {
        let mut repo = self.tasks().await;
        warn_missing(&*repo, ids, "update");
        let updated = BulkExecutor::new(&mut *repo).update(ids, patch);
        drop(repo);
        info!(requested = ids.len(), updated = updated.len(), "Bulk updated tasks");
        updated
    }

    /// Remove every known id.
    pub async fn bulk_delete(&self, ids: &[TaskId]) -> Vec<Task> {
        let mut repo = self.tasks().await;
        warn_missing(&*repo, ids, "delete");
        let removed = BulkExecutor::new(&mut *repo).delete(ids);
        drop(repo);
        info!(requested = ids.len(), removed = removed.len(), "Bulk deleted tasks");
        removed
    }

    /// Re-file every known id under `category_id`.
    pub async fn bulk_move_to_category(&self, ids: &[TaskId], category_id: &str) -> Vec<Task> {
        let mut repo = self.tasks().await;
        warn_missing(&*repo, ids, "move");
        let moved = BulkExecutor::new(&mut *repo).move_to_category(ids, category_id);
        drop(repo);
        info!(
            requested = ids.len(),
            moved = moved.len(),
            category = category_id,
            "Bulk moved tasks"
        );
        moved
    }

    /// Start a timer, stopping any other running one.
    ///
    /// # Errors
    /// Returns `NotFound` when the id is unknown.
    pub async fn start_timer(&self, id: TaskId) -> Result<Task> {
        let task = TimeTracker::new(&mut *self.tasks().await).start(id)?;
        info!(task = %id, "Started timer");
        Ok(task)
    }

    /// Stop a running timer.
    ///
    /// # Errors
    /// Returns `NotFound` or `TimerNotRunning`.
    pub async fn stop_timer(&self, id: TaskId) -> Result<Task> {
        let task = TimeTracker::new(&mut *self.tasks().await).stop(id)?;
        info!(task = %id, total = task.time_tracking.total_time(), "Stopped timer");
        Ok(task)
    }

    /// Pause a running timer (same as stop).
    ///
    /// # Errors
    /// Returns `NotFound` or `TimerNotRunning`.
    pub async fn pause_timer(&self, id: TaskId) -> Result<Task> {
        let task = TimeTracker::new(&mut *self.tasks().await).pause(id)?;
        info!(task = %id, total = task.time_tracking.total_time(), "Paused timer");
        Ok(task)
    }

    /// Clear a task's tracked time.
    ///
    /// # Errors
    /// Returns `NotFound` when the id is unknown.
    pub async fn reset_timer(&self, id: TaskId) -> Result<Task> {
        let task = TimeTracker::new(&mut *self.tasks().await).reset(id)?;
        info!(task = %id, "Reset timer");
        Ok(task)
    }

    /// Tracked seconds including a live session.
    ///
    /// # Errors
    /// Returns `NotFound` when the id is unknown.
    pub async fn time_spent(&self, id: TaskId) -> Result<u64> {
        self.tasks().await.time_spent(id)
    }

    /// The task whose timer is running, if any.
    pub async fn running_timer(&self) -> Option<Task> {
        self.tasks().await.running_timer()
    }

    /// Open tasks due today.
    pub async fn today(&self) -> Vec<Task> {
        let repo = self.tasks().await;
        query::today(repo.tasks(), &self.calendar(&repo))
    }

    /// Open tasks due after today.
    pub async fn upcoming(&self) -> Vec<Task> {
        let repo = self.tasks().await;
        query::upcoming(repo.tasks(), &self.calendar(&repo))
    }

    /// Open tasks past their due day.
    pub async fn overdue(&self) -> Vec<Task> {
        let repo = self.tasks().await;
        query::overdue(repo.tasks(), &self.calendar(&repo))
    }

    /// Completed tasks.
    pub async fn completed(&self) -> Vec<Task> {
        query::completed(self.tasks().await.tasks())
    }

    /// Archived tasks.
    pub async fn archived(&self) -> Vec<Task> {
        query::archived(self.tasks().await.tasks())
    }

    /// Most recently created incomplete tasks.
    pub async fn recent_pending(&self, limit: usize) -> Vec<Task> {
        query::recent_pending(self.tasks().await.tasks(), limit)
    }

    /// Summary counters.
    pub async fn stats(&self) -> TaskStats {
        let repo = self.tasks().await;
        let stats = TaskStats::compute(repo.tasks(), &self.calendar(&repo));
        drop(repo);
        debug!(total = stats.total, completed = stats.completed, "Computed stats");
        stats
    }

    /// Every category.
    pub async fn categories(&self) -> Vec<Category> {
        self.latency.simulate().await;
        self.categories.lock().await.get_all()
    }

    /// A single category, or `None` when absent.
    pub async fn category(&self, id: CategoryId) -> Option<Category> {
        self.latency.simulate().await;
        self.categories.lock().await.get_by_id(id)
    }

    /// Create a category.
    ///
    /// # Errors
    /// Returns `CategoryIdsExhausted` once every identifier has been used.
    pub async fn create_category(&self, input: NewCategory) -> Result<Category> {
        self.latency.simulate().await;
        let category = self.categories.lock().await.create(input)?;
        info!(category = %category.id, name = %category.name, "Created category");
        Ok(category)
    }

    /// Merge a patch onto a category.
    ///
    /// # Errors
    /// Returns `CategoryNotFound` when the id is unknown.
    pub async fn update_category(&self, id: CategoryId, patch: &CategoryPatch) -> Result<Category> {
        self.latency.simulate().await;
        let category = self.categories.lock().await.update(id, patch)?;
        info!(category = %id, "Updated category");
        Ok(category)
    }

    /// Remove a category.
    ///
    /// # Errors
    /// Returns `CategoryNotFound` when the id is unknown.
    pub async fn delete_category(&self, id: CategoryId) -> Result<Category> {
        self.latency.simulate().await;
        let category = self.categories.lock().await.delete(id)?;
        info!(category = %id, "Deleted category");
        Ok(category)
    }

    /// Number of tasks filed under each category.
    pub async fn category_task_counts(&self) -> BTreeMap<CategoryId, usize> {
        let repo = self.tasks().await;
        let categories = self.categories.lock().await;
        categories.task_counts(repo.tasks())
    }

    /// Consistent copy of both stores and their id high-water marks, for persisting.
    pub async fn export(&self) -> (TaskSeed, CategorySeed) {
        let repo = self.tasks.lock().await;
        let categories = self.categories.lock().await;
        (
            TaskSeed {
                last_id: repo.last_id(),
                records: repo.get_all(),
            },
            CategorySeed {
                last_id: categories.last_id(),
                records: categories.get_all(),
            },
        )
    }
}

fn warn_missing<C: Clock>(repo: &TaskRepository<C>, ids: &[TaskId], operation: &'static str) {
    let missing: Vec<String> = ids
        .iter()
        .filter(|id| repo.position(**id).is_none())
        .map(ToString::to_string)
        .collect();
    if !missing.is_empty() {
        warn!(operation, missing = %missing.join(","), "Skipped unknown task ids");
    }
}

//! In-memory task collection with identity and timestamp invariants.

use std::collections::BTreeSet;

use taskdeck_core::{NewTask, Session, Task, TaskId, TaskPatch};
use time::OffsetDateTime;

use crate::clock::{Clock, SystemClock};
use crate::error::{Result, TaskError};

/// Owner of the task records.
///
/// Identifiers come from a high-water mark that only grows, so an id freed
/// by a delete is never handed out again. Reads return copies; the stored
/// records are only reachable through the mutation methods.
#[derive(Debug, Clone)]
pub struct TaskRepository<C = SystemClock> {
    tasks: Vec<Task>,
    last_id: TaskId,
    clock: C,
}

impl<C: Clock> TaskRepository<C> {
    /// Empty repository.
    pub const fn new(clock: C) -> Self {
        Self {
            tasks: Vec::new(),
            last_id: TaskId(0),
            clock,
        }
    }

    /// Repository initialized from seed records.
    ///
    /// Flag/timestamp pairs are repaired, and if the seed has more than one
    /// running timer only the most recently started one keeps running.
    ///
    /// # Errors
    /// Returns [`TaskError::DuplicateTaskId`] when two records share an id.
    pub fn from_seed(seed: Vec<Task>, clock: C) -> Result<Self> {
        let mut seen = BTreeSet::new();
        if let Some(dup) = seed.iter().find(|task| !seen.insert(task.id)) {
            return Err(TaskError::DuplicateTaskId(dup.id));
        }

        let last_id = seed.iter().map(|task| task.id).max().unwrap_or_default();
        let mut repo = Self {
            tasks: seed,
            last_id,
            clock,
        };
        for task in &mut repo.tasks {
            task.normalize();
        }
        repo.keep_latest_timer();
        Ok(repo)
    }

    /// Raise the high-water mark to `last_id` so ids freed before the seed
    /// was written are not handed out again. A lower value is ignored.
    #[must_use]
    pub fn with_last_id(mut self, last_id: TaskId) -> Self {
        self.last_id = self.last_id.max(last_id);
        self
    }

    /// Highest identifier handed out so far.
    pub const fn last_id(&self) -> TaskId {
        self.last_id
    }

    fn keep_latest_timer(&mut self) {
        let latest = self
            .tasks
            .iter()
            .filter_map(|task| {
                task.time_tracking
                    .current_session()
                    .map(|open| (open.start_time, task.id))
            })
            .max()
            .map(|(_, id)| id);
        let now = self.clock.now();
        for task in self.tasks.iter_mut().filter(|task| Some(task.id) != latest) {
            close_session(task, now);
        }
    }

    /// Current instant according to the repository clock.
    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    /// Borrow the clock.
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Borrow the stored records for read-only derived views.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of stored tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true when no tasks are stored.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Create a task with the next identifier.
    ///
    /// # Errors
    /// Returns [`TaskError::TaskIdsExhausted`] once `u64::MAX` has been used.
    pub fn create(&mut self, input: NewTask) -> Result<Task> {
        self.last_id = self.last_id.checked_next().ok_or(TaskError::TaskIdsExhausted)?;
        let task = Task::create(self.last_id, input, self.clock.now());
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// Copies of every task in insertion order.
    pub fn get_all(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    /// Copy of a single task, or `None` when absent.
    pub fn get_by_id(&self, id: TaskId) -> Option<Task> {
        self.tasks.iter().find(|task| task.id == id).cloned()
    }

    /// Merge `patch` onto the task and return the result.
    ///
    /// # Errors
    /// Returns [`TaskError::NotFound`] when the id is unknown.
    pub fn update(&mut self, id: TaskId, patch: &TaskPatch) -> Result<Task> {
        let now = self.clock.now();
        let task = self.find_mut(id)?;
        task.apply_patch(patch, now);
        Ok(task.clone())
    }

    /// Move a task to the archive.
    ///
    /// # Errors
    /// Returns [`TaskError::NotFound`] when the id is unknown.
    pub fn archive(&mut self, id: TaskId) -> Result<Task> {
        self.update(id, &TaskPatch::archived(true))
    }

    /// Bring a task back from the archive.
    ///
    /// # Errors
    /// Returns [`TaskError::NotFound`] when the id is unknown.
    pub fn restore(&mut self, id: TaskId) -> Result<Task> {
        self.update(id, &TaskPatch::archived(false))
    }

    /// Remove a task permanently and return it.
    ///
    /// # Errors
    /// Returns [`TaskError::NotFound`] when the id is unknown.
    pub fn delete(&mut self, id: TaskId) -> Result<Task> {
        let index = self.position(id).ok_or(TaskError::NotFound(id))?;
        Ok(self.tasks.remove(index))
    }

    /// Tracked seconds for a task, including the live part of a running session.
    ///
    /// # Errors
    /// Returns [`TaskError::NotFound`] when the id is unknown.
    pub fn time_spent(&self, id: TaskId) -> Result<u64> {
        Ok(self.find(id)?.time_tracking.time_spent(self.clock.now()))
    }

    /// Copy of the task whose timer is running, if any.
    pub fn running_timer(&self) -> Option<Task> {
        self.tasks
            .iter()
            .find(|task| task.time_tracking.is_running())
            .cloned()
    }

    pub(crate) fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    pub(crate) fn find(&self, id: TaskId) -> Result<&Task> {
        self.tasks
            .iter()
            .find(|task| task.id == id)
            .ok_or(TaskError::NotFound(id))
    }

    pub(crate) fn find_mut(&mut self, id: TaskId) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(TaskError::NotFound(id))
    }

    pub(crate) fn tasks_mut(&mut self) -> &mut [Task] {
        &mut self.tasks
    }
}

/// Close the task's open session, if any, at `now`.
pub(crate) fn close_session(task: &mut Task, now: OffsetDateTime) -> Option<Session> {
    task.time_tracking.stop(now).ok()
}

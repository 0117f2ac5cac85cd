//! Timer transitions layered on the task repository.

use taskdeck_core::{SessionError, Task, TaskId};

use crate::clock::Clock;
use crate::error::{Result, TaskError};
use crate::task_repository::{TaskRepository, close_session};

/// Timer operations over a mutably borrowed repository.
///
/// Holding the only `&mut` to the repository makes the auto-stop in
/// [`TimeTracker::start`] and the start that follows one exclusive step:
/// nothing can observe the collection in between, so at most one task is
/// ever running.
pub struct TimeTracker<'a, C> {
    repo: &'a mut TaskRepository<C>,
}

impl<'a, C: Clock> TimeTracker<'a, C> {
    /// Wrap a repository.
    pub const fn new(repo: &'a mut TaskRepository<C>) -> Self {
        Self { repo }
    }

    /// Start the task's timer, stopping whichever other timer is running.
    ///
    /// # Errors
    /// Returns [`TaskError::NotFound`] when the id is unknown; nothing is stopped in that case.
    pub fn start(&mut self, id: TaskId) -> Result<Task> {
        self.repo.find(id)?;
        let now = self.repo.now();
        for other in self
            .repo
            .tasks_mut()
            .iter_mut()
            .filter(|task| task.id != id)
        {
            close_session(other, now);
        }
        let task = self.repo.find_mut(id)?;
        task.time_tracking.start(now);
        Ok(task.clone())
    }

    /// Close the running session and fold it into the total.
    ///
    /// # Errors
    /// Returns [`TaskError::NotFound`] when the id is unknown and
    /// [`TaskError::TimerNotRunning`] when the timer is idle.
    pub fn stop(&mut self, id: TaskId) -> Result<Task> {
        let now = self.repo.now();
        let task = self.repo.find_mut(id)?;
        task.time_tracking.stop(now).map_err(|err| match err {
            SessionError::NotRunning => TaskError::TimerNotRunning(id),
        })?;
        Ok(task.clone())
    }

    /// Same as [`TimeTracker::stop`]; there is no resumable paused state.
    ///
    /// # Errors
    /// See [`TimeTracker::stop`].
    pub fn pause(&mut self, id: TaskId) -> Result<Task> {
        self.stop(id)
    }

    /// Clear all tracked time, including a running session.
    ///
    /// # Errors
    /// Returns [`TaskError::NotFound`] when the id is unknown.
    pub fn reset(&mut self, id: TaskId) -> Result<Task> {
        let task = self.repo.find_mut(id)?;
        task.time_tracking.reset();
        Ok(task.clone())
    }

    /// Tracked seconds including the live part of a running session.
    ///
    /// # Errors
    /// Returns [`TaskError::NotFound`] when the id is unknown.
    pub fn time_spent(&self, id: TaskId) -> Result<u64> {
        self.repo.time_spent(id)
    }

    /// The task whose timer is running, if any.
    pub fn running(&self) -> Option<Task> {
        self.repo.running_timer()
    }
}

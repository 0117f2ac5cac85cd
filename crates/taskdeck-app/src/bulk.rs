//! Mutations applied to many tasks at once.
//!
//! Unknown ids are skipped rather than reported; results only contain the
//! tasks that were actually touched, in the order their ids were supplied.

use taskdeck_core::{Task, TaskId, TaskPatch};

use crate::clock::Clock;
use crate::task_repository::TaskRepository;

/// Bulk operations over a mutably borrowed repository.
pub struct BulkExecutor<'a, C> {
    repo: &'a mut TaskRepository<C>,
}

impl<'a, C: Clock> BulkExecutor<'a, C> {
    /// Wrap a repository.
    pub const fn new(repo: &'a mut TaskRepository<C>) -> Self {
        Self { repo }
    }

    /// Apply `patch` to every known id using the single-task update rule.
    pub fn update(&mut self, ids: &[TaskId], patch: &TaskPatch) -> Vec<Task> {
        ids.iter()
            .filter_map(|&id| self.repo.update(id, patch).ok())
            .collect()
    }

    /// Remove every known id and return the removed tasks.
    pub fn delete(&mut self, ids: &[TaskId]) -> Vec<Task> {
        ids.iter()
            .filter_map(|&id| self.repo.delete(id).ok())
            .collect()
    }

    /// Re-file every known id under `category_id`, touching nothing else.
    pub fn move_to_category(&mut self, ids: &[TaskId], category_id: &str) -> Vec<Task> {
        self.update(ids, &TaskPatch::category(category_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use taskdeck_core::NewTask;
    use time::macros::datetime;

    fn setup() -> TaskRepository<ManualClock> {
        let mut repo = TaskRepository::new(ManualClock::new(datetime!(2024-03-01 09:00 UTC)));
        for title in ["a", "b", "c"] {
            repo.create(NewTask::new(title))
                .unwrap_or_else(|err| panic!("create must succeed: {err}"));
        }
        repo
    }

    fn ids(tasks: &[Task]) -> Vec<u64> {
        tasks.iter().map(|task| task.id.0).collect()
    }

    #[test]
    fn update_skips_unknown_ids_and_keeps_supplied_order() {
        let mut repo = setup();
        let updated = BulkExecutor::new(&mut repo).update(
            &[TaskId(2), TaskId(999), TaskId(1)],
            &TaskPatch::completed(true),
        );

        assert_eq!(ids(&updated), vec![2, 1]);
        assert!(updated.iter().all(|task| task.completed && task.completed_at.is_some()));
        assert_eq!(repo.get_by_id(TaskId(3)).map(|task| task.completed), Some(false));
    }

    #[test]
    fn delete_removes_only_known_ids() {
        let mut repo = setup();
        let removed = BulkExecutor::new(&mut repo).delete(&[TaskId(2), TaskId(999_999)]);

        assert_eq!(ids(&removed), vec![2]);
        assert_eq!(ids(repo.tasks()), vec![1, 3]);
    }

    #[test]
    fn move_to_category_changes_only_the_category() {
        let mut repo = setup();
        let before = repo.get_by_id(TaskId(1)).unwrap_or_else(|| panic!("task 1 must exist"));
        let moved = BulkExecutor::new(&mut repo).move_to_category(&[TaskId(1), TaskId(7)], "personal");

        assert_eq!(moved.len(), 1);
        let after = &moved[0];
        assert_eq!(after.category_id, "personal");
        assert_eq!(
            Task {
                category_id: before.category_id.clone(),
                ..after.clone()
            },
            before
        );
    }

    #[test]
    fn empty_id_list_is_a_no_op() {
        let mut repo = setup();
        assert!(BulkExecutor::new(&mut repo).delete(&[]).is_empty());
        assert_eq!(repo.len(), 3);
    }
}

//! In-memory category collection.

use std::collections::{BTreeMap, BTreeSet};

use taskdeck_core::category::task_counts;
use taskdeck_core::{Category, CategoryId, CategoryPatch, NewCategory, Task};

use crate::error::{Result, TaskError};

/// Owner of the category records.
#[derive(Debug, Clone, Default)]
pub struct CategoryRepository {
    categories: Vec<Category>,
    last_id: CategoryId,
}

impl CategoryRepository {
    /// Repository initialized from seed records.
    ///
    /// # Errors
    /// Returns [`TaskError::DuplicateCategoryId`] when two records share an id.
    pub fn from_seed(seed: Vec<Category>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        if let Some(dup) = seed.iter().find(|category| !seen.insert(category.id)) {
            return Err(TaskError::DuplicateCategoryId(dup.id));
        }
        let last_id = seed.iter().map(|category| category.id).max().unwrap_or_default();
        Ok(Self {
            categories: seed,
            last_id,
        })
    }

    /// Raise the high-water mark to `last_id`; a lower value is ignored.
    #[must_use]
    pub fn with_last_id(mut self, last_id: CategoryId) -> Self {
        self.last_id = self.last_id.max(last_id);
        self
    }

    /// Highest identifier handed out so far.
    pub const fn last_id(&self) -> CategoryId {
        self.last_id
    }

    /// Create a category with the next identifier.
    ///
    /// # Errors
    /// Returns [`TaskError::CategoryIdsExhausted`] once `u64::MAX` has been used.
    pub fn create(&mut self, input: NewCategory) -> Result<Category> {
        self.last_id = self
            .last_id
            .checked_next()
            .ok_or(TaskError::CategoryIdsExhausted)?;
        let category = Category::create(self.last_id, input);
        self.categories.push(category.clone());
        Ok(category)
    }

    /// Copies of every category.
    pub fn get_all(&self) -> Vec<Category> {
        self.categories.clone()
    }

    /// Copy of a single category, or `None` when absent.
    pub fn get_by_id(&self, id: CategoryId) -> Option<Category> {
        self.categories.iter().find(|category| category.id == id).cloned()
    }

    /// Merge `patch` onto the category.
    ///
    /// # Errors
    /// Returns [`TaskError::CategoryNotFound`] when the id is unknown.
    pub fn update(&mut self, id: CategoryId, patch: &CategoryPatch) -> Result<Category> {
        let category = self
            .categories
            .iter_mut()
            .find(|category| category.id == id)
            .ok_or(TaskError::CategoryNotFound(id))?;
        category.apply_patch(patch);
        Ok(category.clone())
    }

    /// Remove a category. Tasks tagged with it keep their tag.
    ///
    /// # Errors
    /// Returns [`TaskError::CategoryNotFound`] when the id is unknown.
    pub fn delete(&mut self, id: CategoryId) -> Result<Category> {
        let index = self
            .categories
            .iter()
            .position(|category| category.id == id)
            .ok_or(TaskError::CategoryNotFound(id))?;
        Ok(self.categories.remove(index))
    }

    /// Number of `tasks` filed under each category.
    pub fn task_counts(&self, tasks: &[Task]) -> BTreeMap<CategoryId, usize> {
        task_counts(&self.categories, tasks)
    }
}

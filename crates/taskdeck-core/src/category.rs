use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::id::CategoryId;
use crate::task::Task;

/// Color given to categories created without one.
pub const DEFAULT_COLOR: &str = "#6b7280";
/// Icon given to categories created without one.
pub const DEFAULT_ICON: &str = "Folder";

/// A named bucket tasks can be filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Immutable identifier.
    #[serde(alias = "Id")]
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// CSS-style color.
    #[serde(default = "default_color")]
    pub color: String,
    /// Icon name.
    #[serde(default = "default_icon")]
    pub icon: String,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_owned()
}

fn default_icon() -> String {
    DEFAULT_ICON.to_owned()
}

impl Category {
    /// Build a category from creation input.
    #[must_use]
    pub fn create(id: CategoryId, input: NewCategory) -> Self {
        Self {
            id,
            name: input.name,
            color: input.color.unwrap_or_else(default_color),
            icon: input.icon.unwrap_or_else(default_icon),
        }
    }

    /// The task tag that files a task under this category.
    #[must_use]
    pub fn tag(&self) -> String {
        self.name.to_lowercase()
    }

    /// Merge a patch; the identifier is preserved.
    pub fn apply_patch(&mut self, patch: &CategoryPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(color) = &patch.color {
            self.color.clone_from(color);
        }
        if let Some(icon) = &patch.icon {
            self.icon.clone_from(icon);
        }
    }
}

/// Creation input for a category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCategory {
    /// Display name.
    pub name: String,
    /// Color, defaults to [`DEFAULT_COLOR`].
    pub color: Option<String>,
    /// Icon, defaults to [`DEFAULT_ICON`].
    pub icon: Option<String>,
}

/// Partial update for a category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    /// New name.
    pub name: Option<String>,
    /// New color.
    pub color: Option<String>,
    /// New icon.
    pub icon: Option<String>,
}

/// Number of tasks filed under each category.
#[must_use]
pub fn task_counts(categories: &[Category], tasks: &[Task]) -> BTreeMap<CategoryId, usize> {
    categories
        .iter()
        .map(|category| {
            let tag = category.tag();
            let count = tasks.iter().filter(|task| task.category_id == tag).count();
            (category.id, count)
        })
        .collect()
}

use crate::domain::category::CategoryId;
use crate::domain::position::Sortable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Unique identifier for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u32);

impl TaskId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl FromStr for TaskId {
    type Err = crate::error::KanbanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| crate::error::KanbanError::InvalidTaskId(s.to_string()))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A kanban task, belonging to exactly one category at a time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub category_id: CategoryId,
    pub title: String,
    /// Only meaningful relative to the other tasks of `category_id`.
    pub lexical_order: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task in the given category
    pub fn new(
        id: TaskId,
        category_id: CategoryId,
        title: String,
        lexical_order: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            category_id,
            title,
            lexical_order,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the title
    pub fn set_title(&mut self, title: String) {
        self.title = title;
        self.updated_at = Utc::now();
    }

    /// Sets the order key within the current category
    pub fn set_lexical_order(&mut self, lexical_order: String) {
        if self.lexical_order != lexical_order {
            self.lexical_order = lexical_order;
            self.updated_at = Utc::now();
        }
    }

    /// Reattaches the task to another category.
    ///
    /// `lexical_order` must have been computed against the destination's tasks.
    pub fn move_to(&mut self, category_id: CategoryId, lexical_order: String) {
        self.category_id = category_id;
        self.lexical_order = lexical_order;
        self.updated_at = Utc::now();
    }
}

impl Sortable for Task {
    type Id = TaskId;

    fn sort_id(&self) -> &TaskId {
        &self.id
    }

    fn lexical_order(&self) -> &str {
        &self.lexical_order
    }
}

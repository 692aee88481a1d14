use crate::{
    domain::{Board, Category, CategoryId, Task, TaskId},
    error::Result,
};
use async_trait::async_trait;

pub mod file_storage;

#[cfg(feature = "sqlite-storage")]
pub mod sqlite_storage;

/// Storage trait for persisting categories, tasks and board state
///
/// Implementations store order keys verbatim and never interpret them.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Initializes the storage backend
    async fn initialize(&self) -> Result<()>;

    /// Checks if the board is initialized
    async fn is_initialized(&self) -> bool;

    /// Saves the board state
    async fn save_board(&self, board: &Board) -> Result<()>;

    /// Loads the board state
    async fn load_board(&self) -> Result<Board>;

    /// Saves a category, inserting or replacing it
    async fn save_category(&self, category: &Category) -> Result<()>;

    /// Loads a category by ID
    async fn load_category(&self, id: CategoryId) -> Result<Category>;

    /// Lists all categories, in no particular order
    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// Deletes a category and every task that belongs to it.
    /// Returns false if the category did not exist.
    async fn delete_category(&self, id: CategoryId) -> Result<bool>;

    /// Saves a task, inserting or replacing it
    async fn save_task(&self, task: &Task) -> Result<()>;

    /// Loads a task by ID
    async fn load_task(&self, id: TaskId) -> Result<Task>;

    /// Lists tasks, optionally only those of one category, in no particular order
    async fn list_tasks(&self, category: Option<CategoryId>) -> Result<Vec<Task>>;

    /// Deletes a task. Returns false if it did not exist.
    async fn delete_task(&self, id: TaskId) -> Result<bool>;
}

//! Board operations on top of a [`Storage`] backend.
//!
//! Every operation that assigns an order key reads the sibling collection,
//! resolves the key and persists it while holding the service's write lock,
//! so two repositions on the same board can never compute a key from the
//! same stale snapshot.

use crate::{
    domain::{
        position::{resolve, Position, Sortable},
        sorting::{sort_by_lexical_order, SortOrder},
        Category, CategoryId, Column, Task, TaskId,
    },
    error::Result,
    storage::Storage,
};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Kanban board operations backed by a storage implementation
pub struct BoardService<S: Storage> {
    storage: S,
    write_lock: Mutex<()>,
}

impl<S: Storage> BoardService<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// The underlying storage backend
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Initializes the storage backend, creating an empty board if needed
    pub async fn initialize(&self) -> Result<()> {
        self.storage.initialize().await
    }

    /// Creates a category at the end of the board
    pub async fn create_category(&self, title: &str) -> Result<Category> {
        let _guard = self.write_lock.lock().await;

        let mut board = self.storage.load_board().await?;
        let title = board.config.validate_title(title)?;

        let siblings = self.sorted_categories().await?;
        let lexical_order = place(&siblings, None, Position::End)?;

        let category = Category::new(board.next_category_id(), title, lexical_order);
        self.storage.save_board(&board).await?;
        self.storage.save_category(&category).await?;

        info!(
            category = %category.id,
            lexical_order = %category.lexical_order,
            "created category"
        );
        Ok(category)
    }

    /// Returns every category with its tasks, both in display order
    pub async fn list_columns(&self) -> Result<Vec<Column>> {
        let categories = self.sorted_categories().await?;

        let mut tasks_by_category: HashMap<CategoryId, Vec<Task>> = HashMap::new();
        for task in self.storage.list_tasks(None).await? {
            tasks_by_category
                .entry(task.category_id)
                .or_default()
                .push(task);
        }

        Ok(categories
            .into_iter()
            .map(|category| {
                let mut tasks = tasks_by_category.remove(&category.id).unwrap_or_default();
                sort_by_lexical_order(&mut tasks, SortOrder::Ascending);
                Column { category, tasks }
            })
            .collect())
    }

    /// Returns one category with its tasks in display order
    pub async fn find_category(&self, id: CategoryId) -> Result<Column> {
        let category = self.storage.load_category(id).await?;
        let tasks = self.sorted_tasks(id).await?;
        Ok(Column { category, tasks })
    }

    /// Renames a category. Fails if the category does not exist.
    pub async fn rename_category(&self, id: CategoryId, title: &str) -> Result<Category> {
        let _guard = self.write_lock.lock().await;

        let board = self.storage.load_board().await?;
        let title = board.config.validate_title(title)?;

        let mut category = self.storage.load_category(id).await?;
        category.set_title(title);
        self.storage.save_category(&category).await?;

        debug!(category = %id, "renamed category");
        Ok(category)
    }

    /// Moves a category to another slot on the board
    pub async fn reposition_category(
        &self,
        id: CategoryId,
        position: Position,
    ) -> Result<Category> {
        let _guard = self.write_lock.lock().await;

        let mut category = self.storage.load_category(id).await?;
        let siblings = self.sorted_categories().await?;
        let lexical_order = place(&siblings, Some(&id), position)?;

        if lexical_order != category.lexical_order {
            category.set_lexical_order(lexical_order);
            self.storage.save_category(&category).await?;
        }

        info!(
            category = %id,
            ?position,
            lexical_order = %category.lexical_order,
            "repositioned category"
        );
        Ok(category)
    }

    /// Deletes a category together with its tasks.
    /// Returns false if there was nothing to delete.
    pub async fn delete_category(&self, id: CategoryId) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let deleted = self.storage.delete_category(id).await?;
        if deleted {
            info!(category = %id, "deleted category");
        }
        Ok(deleted)
    }

    /// Creates a task at the end of a category
    ///
    /// This is the only way to create tasks, as every task belongs to a
    /// category.
    pub async fn add_task(&self, category_id: CategoryId, title: &str) -> Result<Task> {
        let _guard = self.write_lock.lock().await;

        let mut board = self.storage.load_board().await?;
        let title = board.config.validate_title(title)?;

        // Fails with CategoryNotFound before any ID is used up
        self.storage.load_category(category_id).await?;

        let siblings = self.sorted_tasks(category_id).await?;
        let lexical_order = place(&siblings, None, Position::End)?;

        let task = Task::new(board.next_task_id(), category_id, title, lexical_order);
        self.storage.save_board(&board).await?;
        self.storage.save_task(&task).await?;

        info!(
            task = %task.id,
            category = %category_id,
            lexical_order = %task.lexical_order,
            "added task"
        );
        Ok(task)
    }

    /// Lists every task on the board in the given lexical direction
    ///
    /// Keys only order tasks within one category, so this is mostly useful
    /// for exports and debugging.
    pub async fn list_tasks(&self, order: SortOrder) -> Result<Vec<Task>> {
        let mut tasks = self.storage.list_tasks(None).await?;
        sort_by_lexical_order(&mut tasks, order);
        Ok(tasks)
    }

    pub async fn find_task(&self, id: TaskId) -> Result<Task> {
        self.storage.load_task(id).await
    }

    /// Renames a task. Fails if the task does not exist.
    pub async fn rename_task(&self, id: TaskId, title: &str) -> Result<Task> {
        let _guard = self.write_lock.lock().await;

        let board = self.storage.load_board().await?;
        let title = board.config.validate_title(title)?;

        let mut task = self.storage.load_task(id).await?;
        task.set_title(title);
        self.storage.save_task(&task).await?;

        debug!(task = %id, "renamed task");
        Ok(task)
    }

    /// Moves a task to another slot within its own category
    pub async fn reposition_task(&self, id: TaskId, position: Position) -> Result<Task> {
        let _guard = self.write_lock.lock().await;

        let task = self.storage.load_task(id).await?;
        self.reposition_task_locked(task, position).await
    }

    /// Moves a task into `category_id` at `position`
    ///
    /// The new key is computed against the destination category's tasks.
    /// Moving within the current category is a plain reposition.
    pub async fn move_task(
        &self,
        id: TaskId,
        category_id: CategoryId,
        position: Position,
    ) -> Result<Task> {
        let _guard = self.write_lock.lock().await;

        let mut task = self.storage.load_task(id).await?;
        if task.category_id == category_id {
            return self.reposition_task_locked(task, position).await;
        }

        self.storage.load_category(category_id).await?;
        let siblings = self.sorted_tasks(category_id).await?;
        let lexical_order = place(&siblings, None, position)?;

        let from = task.category_id;
        task.move_to(category_id, lexical_order);
        self.storage.save_task(&task).await?;

        info!(
            task = %id,
            from = %from,
            to = %category_id,
            lexical_order = %task.lexical_order,
            "moved task"
        );
        Ok(task)
    }

    /// Deletes a task. Returns false if there was nothing to delete.
    pub async fn remove_task(&self, id: TaskId) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let deleted = self.storage.delete_task(id).await?;
        if deleted {
            info!(task = %id, "removed task");
        }
        Ok(deleted)
    }

    /// Caller must hold the write lock
    async fn reposition_task_locked(&self, mut task: Task, position: Position) -> Result<Task> {
        let siblings = self.sorted_tasks(task.category_id).await?;
        let lexical_order = place(&siblings, Some(&task.id), position)?;

        if lexical_order != task.lexical_order {
            task.set_lexical_order(lexical_order);
            self.storage.save_task(&task).await?;
        }

        info!(
            task = %task.id,
            ?position,
            lexical_order = %task.lexical_order,
            "repositioned task"
        );
        Ok(task)
    }

    async fn sorted_categories(&self) -> Result<Vec<Category>> {
        let mut categories = self.storage.list_categories().await?;
        sort_by_lexical_order(&mut categories, SortOrder::Ascending);
        Ok(categories)
    }

    async fn sorted_tasks(&self, category_id: CategoryId) -> Result<Vec<Task>> {
        let mut tasks = self.storage.list_tasks(Some(category_id)).await?;
        sort_by_lexical_order(&mut tasks, SortOrder::Ascending);
        Ok(tasks)
    }
}

/// Resolves an order key, logging failures
///
/// A failure here means a stored key is malformed, which is never the
/// caller's fault.
fn place<T>(siblings: &[T], id: Option<&T::Id>, position: Position) -> Result<String>
where
    T: Sortable,
    T::Id: std::fmt::Display,
{
    resolve(siblings, id, position).map_err(|e| {
        let id = id.map(ToString::to_string).unwrap_or_else(|| "new".to_string());
        error!(
            entity = %id,
            ?position,
            siblings = siblings.len(),
            error = %e,
            "could not resolve order key"
        );
        e
    })
}

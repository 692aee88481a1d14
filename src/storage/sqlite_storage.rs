use crate::{
    domain::{Board, Category, CategoryId, Task, TaskId},
    error::{KanbanError, Result},
    storage::Storage,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};
use std::{
    path::Path,
    sync::{Mutex, MutexGuard},
};
use tracing::debug;

/// `lexical_order` uses the default BINARY collation so that SQL ordering
/// matches byte-wise key comparison.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS board (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    state_json TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    lexical_order TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY,
    category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    lexical_order TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_category ON tasks(category_id, lexical_order);
"#;

/// SQLite-based storage backend for categories, tasks and board state
pub struct SqliteStorage {
    connection: Mutex<Connection>,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `database_path`
    pub fn open(database_path: impl AsRef<Path>) -> Result<Self> {
        Self::from_connection(Connection::open(database_path)?)
    }

    /// Opens a private in-memory database, mostly useful for tests
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> Result<Self> {
        connection.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| KanbanError::StorageError("SQLite connection lock poisoned".to_string()))
    }
}

fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: CategoryId::new(row.get(0)?),
        title: row.get(1)?,
        lexical_order: row.get(2)?,
        created_at: timestamp(row, 3)?,
        updated_at: timestamp(row, 4)?,
    })
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: TaskId::new(row.get(0)?),
        category_id: CategoryId::new(row.get(1)?),
        title: row.get(2)?,
        lexical_order: row.get(3)?,
        created_at: timestamp(row, 4)?,
        updated_at: timestamp(row, 5)?,
    })
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn initialize(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA_SQL)?;

        let board = serde_json::to_string(&Board::default())?;
        let created = conn.execute(
            "INSERT OR IGNORE INTO board (id, state_json) VALUES (1, ?1)",
            params![board],
        )?;
        if created > 0 {
            debug!("created board");
        }

        Ok(())
    }

    async fn is_initialized(&self) -> bool {
        let Ok(conn) = self.conn() else {
            return false;
        };

        conn.query_row("SELECT 1 FROM board WHERE id = 1", [], |_| Ok(()))
            .is_ok()
    }

    async fn save_board(&self, board: &Board) -> Result<()> {
        let json = serde_json::to_string(board)?;
        self.conn()?.execute(
            "INSERT INTO board (id, state_json) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET state_json = excluded.state_json",
            params![json],
        )?;
        Ok(())
    }

    async fn load_board(&self) -> Result<Board> {
        let json: Option<String> = self
            .conn()?
            .query_row("SELECT state_json FROM board WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|_| KanbanError::BoardNotInitialized)?;

        let json = json.ok_or(KanbanError::BoardNotInitialized)?;
        Ok(serde_json::from_str(&json)?)
    }

    async fn save_category(&self, category: &Category) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO categories (id, title, lexical_order, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                lexical_order = excluded.lexical_order,
                updated_at = excluded.updated_at",
            params![
                category.id.value(),
                category.title,
                category.lexical_order,
                category.created_at.to_rfc3339(),
                category.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn load_category(&self, id: CategoryId) -> Result<Category> {
        self.conn()?
            .query_row(
                "SELECT id, title, lexical_order, created_at, updated_at
                 FROM categories WHERE id = ?1",
                params![id.value()],
                category_from_row,
            )
            .optional()?
            .ok_or(KanbanError::CategoryNotFound(id))
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, title, lexical_order, created_at, updated_at FROM categories")?;
        let categories = stmt
            .query_map([], category_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(categories)
    }

    async fn delete_category(&self, id: CategoryId) -> Result<bool> {
        // Tasks go with it through ON DELETE CASCADE
        let deleted = self
            .conn()?
            .execute("DELETE FROM categories WHERE id = ?1", params![id.value()])?;
        Ok(deleted > 0)
    }

    async fn save_task(&self, task: &Task) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO tasks (id, category_id, title, lexical_order, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                category_id = excluded.category_id,
                title = excluded.title,
                lexical_order = excluded.lexical_order,
                updated_at = excluded.updated_at",
            params![
                task.id.value(),
                task.category_id.value(),
                task.title,
                task.lexical_order,
                task.created_at.to_rfc3339(),
                task.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn load_task(&self, id: TaskId) -> Result<Task> {
        self.conn()?
            .query_row(
                "SELECT id, category_id, title, lexical_order, created_at, updated_at
                 FROM tasks WHERE id = ?1",
                params![id.value()],
                task_from_row,
            )
            .optional()?
            .ok_or(KanbanError::TaskNotFound(id))
    }

    async fn list_tasks(&self, category: Option<CategoryId>) -> Result<Vec<Task>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, category_id, title, lexical_order, created_at, updated_at
             FROM tasks WHERE ?1 IS NULL OR category_id = ?1",
        )?;
        let tasks = stmt
            .query_map(params![category.map(|c| c.value())], task_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    async fn delete_task(&self, id: TaskId) -> Result<bool> {
        let deleted = self
            .conn()?
            .execute("DELETE FROM tasks WHERE id = ?1", params![id.value()])?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn storage() -> SqliteStorage {
        let storage = SqliteStorage::in_memory().unwrap();
        storage.initialize().await.unwrap();
        storage
    }

    #[tokio::test]
    async fn test_initialization() {
        let storage = SqliteStorage::in_memory().unwrap();
        assert!(!storage.is_initialized().await);

        storage.initialize().await.unwrap();
        assert!(storage.is_initialized().await);

        let board = storage.load_board().await.unwrap();
        assert_eq!(board.next_category_number, 1);

        // Idempotent
        storage.initialize().await.unwrap();
    }

    #[tokio::test]
    async fn test_board_round_trip() {
        let storage = storage().await;

        let mut board = storage.load_board().await.unwrap();
        board.next_task_id();
        storage.save_board(&board).await.unwrap();

        assert_eq!(storage.load_board().await.unwrap().next_task_number, 2);
    }

    #[tokio::test]
    async fn test_category_upsert() {
        let storage = storage().await;

        let mut category = Category::new(CategoryId::new(1), "Todo".to_string(), "n".to_string());
        storage.save_category(&category).await.unwrap();

        category.set_lexical_order("u".to_string());
        storage.save_category(&category).await.unwrap();

        let loaded = storage.load_category(CategoryId::new(1)).await.unwrap();
        assert_eq!(loaded.lexical_order, "u");
        assert_eq!(loaded.created_at, category.created_at);
        assert_eq!(storage.list_categories().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_rows() {
        let storage = storage().await;

        assert!(matches!(
            storage.load_category(CategoryId::new(9)).await,
            Err(KanbanError::CategoryNotFound(_))
        ));
        assert!(matches!(
            storage.load_task(TaskId::new(9)).await,
            Err(KanbanError::TaskNotFound(_))
        ));
        assert!(!storage.delete_task(TaskId::new(9)).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_category_cascades_to_tasks() {
        let storage = storage().await;

        for id in 1..=2 {
            let category = Category::new(CategoryId::new(id), format!("C{}", id), "n".to_string());
            storage.save_category(&category).await.unwrap();
        }
        for (id, category_id) in [(1, 1), (2, 1), (3, 2)] {
            let task = Task::new(
                TaskId::new(id),
                CategoryId::new(category_id),
                format!("T{}", id),
                "n".to_string(),
            );
            storage.save_task(&task).await.unwrap();
        }

        assert_eq!(storage.list_tasks(Some(CategoryId::new(1))).await.unwrap().len(), 2);

        assert!(storage.delete_category(CategoryId::new(1)).await.unwrap());

        let remaining = storage.list_tasks(None).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, TaskId::new(3));
    }

    #[tokio::test]
    async fn test_open_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kanban.sqlite3");

        {
            let storage = SqliteStorage::open(&path).unwrap();
            storage.initialize().await.unwrap();
        }

        let storage = SqliteStorage::open(&path).unwrap();
        assert!(storage.is_initialized().await);
    }
}

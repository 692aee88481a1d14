use crate::domain::{CategoryId, TaskId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, KanbanError>;

#[derive(Debug, Error)]
pub enum KanbanError {
    /// An order key bound contains something other than the letters a-z,
    /// or the bounds are not strictly ascending.
    #[error("Invalid order key input: {0}")]
    InvalidInput(String),

    /// No key can sort strictly between the bounds, e.g. before "aaa".
    #[error("No order key can sort before {next:?} after {prev:?}")]
    ImpossibleBound { prev: String, next: String },

    #[error("Category with ID {0} was not found")]
    CategoryNotFound(CategoryId),

    #[error("Task with ID {0} was not found")]
    TaskNotFound(TaskId),

    #[error("Invalid category ID format: {0}")]
    InvalidCategoryId(String),

    #[error("Invalid task ID format: {0}")]
    InvalidTaskId(String),

    #[error("Invalid title: {0}")]
    InvalidTitle(String),

    #[error("Board not initialized")]
    BoardNotInitialized,

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

#[cfg(feature = "sqlite-storage")]
impl From<rusqlite::Error> for KanbanError {
    fn from(e: rusqlite::Error) -> Self {
        KanbanError::StorageError(format!("SQLite error: {}", e))
    }
}

use crate::domain::category::{Category, CategoryId};
use crate::domain::task::{Task, TaskId};
use crate::error::{KanbanError, Result};
use serde::{Deserialize, Serialize};

/// Board configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Longest accepted category or task title, in characters
    #[serde(default = "default_max_title_length")]
    pub max_title_length: usize,
}

fn default_name() -> String {
    "Kanban Board".to_string()
}

fn default_max_title_length() -> usize {
    64
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            max_title_length: default_max_title_length(),
        }
    }
}

impl BoardConfig {
    /// Parses a `config.toml` document. Missing fields take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| KanbanError::ConfigError(e.to_string()))
    }

    /// Trims a category or task title and checks it against the configured limits
    pub fn validate_title(&self, title: &str) -> Result<String> {
        let title = title.trim();

        if title.is_empty() {
            return Err(KanbanError::InvalidTitle("title cannot be empty".to_string()));
        }

        let length = title.chars().count();
        if length > self.max_title_length {
            return Err(KanbanError::InvalidTitle(format!(
                "title is {} characters long, the limit is {}",
                length, self.max_title_length
            )));
        }

        Ok(title.to_string())
    }
}

/// Kanban board state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub config: BoardConfig,
    pub next_category_number: u32,
    pub next_task_number: u32,
}

impl Board {
    pub fn new(config: BoardConfig) -> Self {
        Self {
            config,
            next_category_number: 1,
            next_task_number: 1,
        }
    }

    /// Generates the next category ID
    pub fn next_category_id(&mut self) -> CategoryId {
        let id = CategoryId::new(self.next_category_number);
        self.next_category_number += 1;
        id
    }

    /// Generates the next task ID
    pub fn next_task_id(&mut self) -> TaskId {
        let id = TaskId::new(self.next_task_number);
        self.next_task_number += 1;
        id
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

/// A category together with its tasks, sorted ascending by order key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub category: Category,
    pub tasks: Vec<Task>,
}

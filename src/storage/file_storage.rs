use crate::{
    domain::{Board, BoardConfig, Category, CategoryId, Task, TaskId},
    error::{KanbanError, Result},
    storage::Storage,
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    path::{Path, PathBuf},
    str::FromStr,
};
use tokio::fs;
use tracing::{debug, warn};

/// File-based storage implementation
///
/// Every category and task is one pretty-printed JSON file so that boards
/// diff cleanly under version control.
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const KANBAN_DIR: &'static str = ".kanban";
    const CATEGORIES_DIR: &'static str = "categories";
    const TASKS_DIR: &'static str = "tasks";
    const BOARD_FILE: &'static str = "board.json";
    const CONFIG_FILE: &'static str = "config.toml";

    /// Creates a new FileStorage instance for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::KANBAN_DIR),
        }
    }

    fn categories_dir(&self) -> PathBuf {
        self.root_path.join(Self::CATEGORIES_DIR)
    }

    fn tasks_dir(&self) -> PathBuf {
        self.root_path.join(Self::TASKS_DIR)
    }

    fn board_file(&self) -> PathBuf {
        self.root_path.join(Self::BOARD_FILE)
    }

    fn config_file(&self) -> PathBuf {
        self.root_path.join(Self::CONFIG_FILE)
    }

    fn category_file(&self, id: CategoryId) -> PathBuf {
        self.categories_dir().join(format!("{}.json", id))
    }

    fn task_file(&self, id: TaskId) -> PathBuf {
        self.tasks_dir().join(format!("{}.json", id))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    /// Reads `config.toml`, falling back to defaults when it does not exist
    pub async fn load_config(&self) -> Result<BoardConfig> {
        let config_file = self.config_file();

        if !config_file.exists() {
            return Ok(BoardConfig::default());
        }

        let contents = fs::read_to_string(&config_file).await?;
        BoardConfig::from_toml_str(&contents)
    }

    async fn write_json<T: Serialize + Sync>(
        &self,
        dir: PathBuf,
        file_path: PathBuf,
        value: &T,
    ) -> Result<()> {
        self.ensure_directory_exists(&dir).await?;

        let json = serde_json::to_string_pretty(value)?;
        fs::write(file_path, json).await?;
        Ok(())
    }

    async fn read_json<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
        let contents = fs::read_to_string(file_path).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Loads every `<id>.json` file in `dir` whose stem parses as an ID
    async fn read_all<I, T>(dir: &Path) -> Result<Vec<T>>
    where
        I: FromStr,
        T: DeserializeOwned,
    {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(dir).await?;
        let mut values = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let stem = path.file_stem().and_then(|s| s.to_str());
            if stem.and_then(|s| I::from_str(s).ok()).is_none() {
                warn!(path = %path.display(), "skipping file with unrecognized name");
                continue;
            }

            values.push(Self::read_json(&path).await?);
        }

        Ok(values)
    }

    async fn remove_if_exists(file_path: &Path) -> Result<bool> {
        if !file_path.exists() {
            return Ok(false);
        }

        fs::remove_file(file_path).await?;
        Ok(true)
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn initialize(&self) -> Result<()> {
        // Create .kanban directory structure
        self.ensure_directory_exists(&self.root_path).await?;
        self.ensure_directory_exists(&self.categories_dir()).await?;
        self.ensure_directory_exists(&self.tasks_dir()).await?;

        // Create the board from config.toml if it doesn't exist
        if !self.board_file().exists() {
            let config = self.load_config().await?;
            debug!(name = %config.name, "creating board");
            self.save_board(&Board::new(config)).await?;
        }

        Ok(())
    }

    async fn is_initialized(&self) -> bool {
        self.root_path.exists() && self.board_file().exists()
    }

    async fn save_board(&self, board: &Board) -> Result<()> {
        self.write_json(self.root_path.clone(), self.board_file(), board)
            .await
    }

    async fn load_board(&self) -> Result<Board> {
        let board_file = self.board_file();

        if !board_file.exists() {
            return Err(KanbanError::BoardNotInitialized);
        }

        Self::read_json(&board_file).await
    }

    async fn save_category(&self, category: &Category) -> Result<()> {
        self.write_json(
            self.categories_dir(),
            self.category_file(category.id),
            category,
        )
        .await
    }

    async fn load_category(&self, id: CategoryId) -> Result<Category> {
        let file_path = self.category_file(id);

        if !file_path.exists() {
            return Err(KanbanError::CategoryNotFound(id));
        }

        Self::read_json(&file_path).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        Self::read_all::<CategoryId, Category>(&self.categories_dir()).await
    }

    async fn delete_category(&self, id: CategoryId) -> Result<bool> {
        if !Self::remove_if_exists(&self.category_file(id)).await? {
            return Ok(false);
        }

        // Tasks never outlive their category
        for task in self.list_tasks(Some(id)).await? {
            Self::remove_if_exists(&self.task_file(task.id)).await?;
        }

        Ok(true)
    }

    async fn save_task(&self, task: &Task) -> Result<()> {
        self.write_json(self.tasks_dir(), self.task_file(task.id), task)
            .await
    }

    async fn load_task(&self, id: TaskId) -> Result<Task> {
        let file_path = self.task_file(id);

        if !file_path.exists() {
            return Err(KanbanError::TaskNotFound(id));
        }

        Self::read_json(&file_path).await
    }

    async fn list_tasks(&self, category: Option<CategoryId>) -> Result<Vec<Task>> {
        let tasks = Self::read_all::<TaskId, Task>(&self.tasks_dir()).await?;

        Ok(match category {
            Some(category_id) => tasks
                .into_iter()
                .filter(|task| task.category_id == category_id)
                .collect(),
            None => tasks,
        })
    }

    async fn delete_task(&self, id: TaskId) -> Result<bool> {
        Self::remove_if_exists(&self.task_file(id)).await
    }
}

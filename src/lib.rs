//! # Kanban Core
//!
//! Domain models, lexical ordering and storage for a kanban board made of
//! categories that each hold an ordered list of tasks.
//!
//! Manual ordering is kept in an `a-z` order key per entity. Moving an entity
//! only rewrites its own key: [`domain::order_key::between`] computes a key
//! that sorts strictly between two neighbours, and
//! [`domain::position::resolve`] picks those neighbours from a sorted sibling
//! list and a target slot.

pub mod domain;
pub mod error;
pub mod service;
pub mod storage;

// Re-export commonly used types
pub use domain::{
    board::{Board, BoardConfig, Column},
    category::{Category, CategoryId},
    order_key::between,
    position::{resolve, Position, Sortable},
    sorting::{sort_by_lexical_order, sorted_by_lexical_order, SortOrder},
    task::{Task, TaskId},
};
pub use error::{KanbanError, Result};
pub use service::BoardService;
pub use storage::Storage;

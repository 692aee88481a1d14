pub mod board;
pub mod category;
pub mod order_key;
pub mod position;
pub mod sorting;
pub mod task;

pub use board::{Board, BoardConfig, Column};
pub use category::{Category, CategoryId};
pub use order_key::between;
pub use position::{resolve, Position, Sortable};
pub use sorting::{sort_by_lexical_order, sorted_by_lexical_order, SortOrder};
pub use task::{Task, TaskId};

use crate::domain::position::Sortable;
use std::str::FromStr;

/// Sort order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Ascending),
            "desc" => Ok(SortOrder::Descending),
            _ => Err(format!(
                "Invalid sort order '{}'. Valid orders: asc, desc",
                s
            )),
        }
    }
}

/// Sorts entities in-place by their lexical order keys
///
/// Keys are compared byte-wise, never with locale-aware collation. The sort
/// is stable.
///
/// # Arguments
/// * `entities` - Mutable slice of categories or tasks to sort
/// * `order` - The sort direction (ascending or descending)
///
/// # Examples
/// ```
/// use kanban_core::domain::category::{Category, CategoryId};
/// use kanban_core::domain::sorting::{sort_by_lexical_order, SortOrder};
///
/// let mut categories = vec![
///     Category::new(CategoryId::new(1), "Done".to_string(), "u".to_string()),
///     Category::new(CategoryId::new(2), "Todo".to_string(), "d".to_string()),
///     Category::new(CategoryId::new(3), "Doing".to_string(), "n".to_string()),
/// ];
///
/// sort_by_lexical_order(&mut categories, SortOrder::Ascending);
/// assert_eq!(categories[0].title, "Todo");
/// ```
pub fn sort_by_lexical_order<T: Sortable>(entities: &mut [T], order: SortOrder) {
    entities.sort_by(|a, b| {
        let cmp = a.lexical_order().cmp(b.lexical_order());

        match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });
}

/// Returns a sorted copy, leaving `entities` untouched
pub fn sorted_by_lexical_order<T: Sortable + Clone>(entities: &[T], order: SortOrder) -> Vec<T> {
    let mut sorted = entities.to_vec();
    sort_by_lexical_order(&mut sorted, order);
    sorted
}

use crate::domain::position::Sortable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Unique identifier for a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(u32);

impl CategoryId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl FromStr for CategoryId {
    type Err = crate::error::KanbanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| crate::error::KanbanError::InvalidCategoryId(s.to_string()))
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A column on the board holding an ordered list of tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub title: String,
    pub lexical_order: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Creates a new category with the given ID, title and order key
    pub fn new(id: CategoryId, title: String, lexical_order: String) -> Self {
        let now = Utc::now();
        Self {
            id,
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

    /// Sets the order key
    pub fn set_lexical_order(&mut self, lexical_order: String) {
        if self.lexical_order != lexical_order {
            self.lexical_order = lexical_order;
            self.updated_at = Utc::now();
        }
    }
}

impl Sortable for Category {
    type Id = CategoryId;

    fn sort_id(&self) -> &CategoryId {
        &self.id
    }

    fn lexical_order(&self) -> &str {
        &self.lexical_order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_id_parsing() {
        let id = CategoryId::from_str("42").unwrap();
        assert_eq!(id, CategoryId::new(42));
        assert_eq!(id.to_string(), "42");

        assert!(CategoryId::from_str("").is_err());
        assert!(CategoryId::from_str("-1").is_err());
        assert!(CategoryId::from_str("abc").is_err());
    }

    #[test]
    fn test_set_lexical_order_updates_timestamp() {
        let mut category = Category::new(CategoryId::new(1), "Todo".to_string(), "n".to_string());
        let initial_updated_at = category.updated_at;

        std::thread::sleep(std::time::Duration::from_millis(10));
        category.set_lexical_order("n".to_string());
        assert_eq!(category.updated_at, initial_updated_at);

        category.set_lexical_order("u".to_string());
        assert_eq!(category.lexical_order, "u");
        assert!(category.updated_at > initial_updated_at);
    }

    #[test]
    fn test_category_serialization() {
        let category = Category::new(CategoryId::new(7), "Review".to_string(), "r".to_string());

        let json = serde_json::to_string(&category).unwrap();
        assert!(json.contains("\"id\":7"));

        let deserialized: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.id, category.id);
        assert_eq!(deserialized.lexical_order, "r");
    }
}

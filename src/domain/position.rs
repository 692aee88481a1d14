//! Turning "put this entity in slot K" into an order key.

use crate::domain::order_key::between;
use crate::error::Result;

/// An entity that can be manually ordered among its siblings
pub trait Sortable {
    type Id: PartialEq;

    /// Identity of the entity within its sibling collection.
    fn sort_id(&self) -> &Self::Id;

    /// The entity's current order key.
    fn lexical_order(&self) -> &str;
}

/// Target slot within a sorted sibling list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Zero-based slot. Slots past the end append.
    Index(usize),
    /// After the last sibling.
    End,
}

impl From<i64> for Position {
    /// Negative positions are shorthand for [`Position::End`].
    fn from(value: i64) -> Self {
        match usize::try_from(value) {
            Ok(index) => Position::Index(index),
            Err(_) => Position::End,
        }
    }
}

/// Computes the order key that places an entity at `position`
///
/// `sorted` must already be sorted ascending by order key. `id` is the entity
/// being placed, or `None` when inserting an entity that is not in `sorted`.
///
/// When the entity is already in the list and moves further down, the slot is
/// bumped by one so it lands after the sibling that held that slot instead of
/// in front of its own old position. If the entity already sits at the target
/// slot its current key is returned unchanged.
///
/// # Errors
/// Only those of [`between`], e.g. a stored key with characters outside `a-z`.
///
/// # Examples
/// ```
/// use kanban_core::domain::position::{resolve, Position, Sortable};
///
/// struct Card(u32, &'static str);
///
/// impl Sortable for Card {
///     type Id = u32;
///     fn sort_id(&self) -> &u32 { &self.0 }
///     fn lexical_order(&self) -> &str { self.1 }
/// }
///
/// let cards = [Card(0, "c"), Card(1, "e"), Card(2, "f")];
///
/// // Move card 0 into slot 1, between "e" and "f"
/// assert_eq!(resolve(&cards, Some(&0), Position::Index(1)).unwrap(), "en");
/// // Append a brand-new card
/// assert_eq!(resolve(&cards, None, Position::End).unwrap(), "q");
/// ```
pub fn resolve<T: Sortable>(
    sorted: &[T],
    id: Option<&T::Id>,
    position: Position,
) -> Result<String> {
    let current = id.and_then(|id| sorted.iter().position(|entity| entity.sort_id() == id));

    let mut target = match position {
        // Already last: keep the slot so the key does not churn
        Position::End => match current {
            Some(index) if index + 1 == sorted.len() => index,
            _ => sorted.len(),
        },
        Position::Index(index) => index,
    };

    if let Some(index) = current {
        if index < target {
            target = target.saturating_add(1);
        }
    }

    let (prev, next) = if target >= sorted.len() {
        let prev = sorted.last().map(|last| last.lexical_order()).unwrap_or("");
        (prev, "")
    } else if Some(sorted[target].sort_id()) == id {
        return Ok(sorted[target].lexical_order().to_string());
    } else if target == 0 {
        ("", sorted[0].lexical_order())
    } else {
        (
            sorted[target - 1].lexical_order(),
            sorted[target].lexical_order(),
        )
    };

    between(prev, next)
}

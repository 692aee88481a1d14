//! Lexical order keys.
//!
//! An order key is a non-empty string of the letters `a-z`. Siblings are
//! displayed in plain byte-wise order of their keys, so repositioning an
//! entity only ever rewrites that entity's key.

use crate::error::{KanbanError, Result};

/// The character just before `a`, standing in for an exhausted lower bound.
const BEFORE_A: u8 = b'a' - 1;

/// The character just after `z`, standing in for an exhausted upper bound.
const AFTER_Z: u8 = b'z' + 1;

/// Key given to the first entity of an empty collection.
pub const FIRST_KEY: &str = "n";

/// Computes a key that sorts strictly between `prev` and `next`
///
/// An empty `prev` means "no lower bound" and an empty `next` means "no
/// upper bound". Both bounds are trimmed and lowercased before use.
///
/// Whenever a new character has to be picked it is the midpoint of the
/// remaining range, so keys stay short under typical insertion patterns.
///
/// # Errors
/// * [`KanbanError::InvalidInput`] if a bound contains anything but `a-z`,
///   or both bounds are set and `prev` does not sort before `next`.
/// * [`KanbanError::ImpossibleBound`] if `next` is `prev` followed only by
///   `a`s, e.g. `between("", "aaa")`. Nothing sorts in that gap.
///
/// # Examples
/// ```
/// use kanban_core::domain::order_key::between;
///
/// assert_eq!(between("", "").unwrap(), "n");
/// assert_eq!(between("n", "").unwrap(), "u");
/// assert_eq!(between("n", "o").unwrap(), "nn");
/// assert!(between("", "a").is_err());
/// ```
pub fn between(prev: &str, next: &str) -> Result<String> {
    let prev = normalize(prev)?;
    let next = normalize(next)?;
    check_bounds(&prev, &next)?;

    let prev_bytes = prev.as_bytes();
    let next_bytes = next.as_bytes();
    let prev_at = |i: usize| prev_bytes.get(i).copied().unwrap_or(BEFORE_A);
    let next_at = |i: usize| next_bytes.get(i).copied().unwrap_or(AFTER_Z);

    // The sentinels never match each other, so this stops at the latest
    // once both strings are exhausted.
    let mut pos = 0;
    while prev_at(pos) == next_at(pos) {
        pos += 1;
    }

    let mut key = prev[..pos].to_string();
    let mut p = prev_at(pos);
    let mut n = next_at(pos);
    pos += 1;

    if p == BEFORE_A {
        // Nothing left of prev: copy next's run of "a"s to stay below it.
        while n == b'a' {
            n = next_at(pos);
            pos += 1;
            key.push('a');
        }
        if n == b'b' {
            key.push('a');
            n = AFTER_Z;
        }
    } else if p + 1 == n {
        // Consecutive letters: extend prev's character instead.
        key.push(char::from(p));
        n = AFTER_Z;
        loop {
            p = prev_at(pos);
            pos += 1;
            if p != b'z' {
                break;
            }
            key.push('z');
        }
    }

    key.push(char::from(midpoint(p, n)));
    Ok(key)
}

/// Rounded-up average of two character codes.
fn midpoint(low: u8, high: u8) -> u8 {
    ((u16::from(low) + u16::from(high) + 1) / 2) as u8
}

fn normalize(bound: &str) -> Result<String> {
    let normalized = bound.trim().to_lowercase();
    if normalized.bytes().all(|b| b.is_ascii_lowercase()) {
        Ok(normalized)
    } else {
        Err(KanbanError::InvalidInput(format!(
            "order keys can only contain the letters a-z, got {:?}",
            bound
        )))
    }
}

fn check_bounds(prev: &str, next: &str) -> Result<()> {
    if let Some(rest) = next.strip_prefix(prev) {
        if !rest.is_empty() && rest.bytes().all(|b| b == b'a') {
            return Err(KanbanError::ImpossibleBound {
                prev: prev.to_string(),
                next: next.to_string(),
            });
        }
    }

    if !prev.is_empty() && !next.is_empty() && prev >= next {
        return Err(KanbanError::InvalidInput(format!(
            "lower bound {:?} does not sort before upper bound {:?}",
            prev, next
        )));
    }

    Ok(())
}

/// Returns true if `key` is a usable order key.
pub fn is_valid(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rejects_malformed_input() {
        assert!(matches!(
            between("!", "@"),
            Err(KanbanError::InvalidInput(_))
        ));
        assert!(matches!(
            between("n", "4"),
            Err(KanbanError::InvalidInput(_))
        ));
        assert!(matches!(
            between("caf\u{e9}", ""),
            Err(KanbanError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_runs_of_a_from_the_start() {
        assert!(matches!(
            between("", "a"),
            Err(KanbanError::ImpossibleBound { .. })
        ));
        assert!(matches!(
            between("", "aaa"),
            Err(KanbanError::ImpossibleBound { .. })
        ));
        // Same gap one level down
        assert!(matches!(
            between("n", "naa"),
            Err(KanbanError::ImpossibleBound { .. })
        ));
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        assert!(matches!(
            between("c", "a"),
            Err(KanbanError::InvalidInput(_))
        ));
        assert!(matches!(
            between("n", "n"),
            Err(KanbanError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_normalizes_case_and_whitespace() {
        assert_eq!(between(" N ", "").unwrap(), "u");
        assert_eq!(between("A", "C").unwrap(), "b");
    }

    #[test]
    fn test_open_bounds() {
        assert_eq!(between("", "").unwrap(), "n");
        assert_eq!(between("n", "").unwrap(), "u");
        assert_eq!(between("", "aaab").unwrap(), "aaaan");
    }

    #[test]
    fn test_consecutive_letters() {
        assert_eq!(between("a", "c").unwrap(), "b");
        assert_eq!(between("a", "b").unwrap(), "an");
        assert_eq!(between("a", "an").unwrap(), "ag");
        assert_eq!(between("zy", "zz").unwrap(), "zyn");
    }

    #[test]
    fn test_typical_insert_series() {
        assert_eq!(between("", "").unwrap(), "n");
        assert_eq!(between("n", "").unwrap(), "u");
        assert_eq!(between("n", "u").unwrap(), "r");
        assert_eq!(between("n", "r").unwrap(), "p");
        assert_eq!(between("n", "p").unwrap(), "o");
        assert_eq!(between("n", "o").unwrap(), "nn");
        assert_eq!(between("n", "nn").unwrap(), "ng");
        assert_eq!(between("n", "ng").unwrap(), "nd");
        assert_eq!(between("n", "nd").unwrap(), "nb");
        // Rounding up skips "na"
        assert_eq!(between("n", "nb").unwrap(), "nan");
    }

    #[test]
    fn test_avoids_dead_end_of_a_runs() {
        let expected = ["an", "ag", "ad", "ab", "aan", "aag", "aad", "aab", "aaan"];
        let mut next = "b".to_string();
        for want in expected {
            next = between("", &next).unwrap();
            assert_eq!(next, want);
        }
    }

    #[test]
    fn test_z_edge() {
        assert_eq!(between("y", "").unwrap(), "z");
        assert_eq!(between("z", "").unwrap(), "zn");
        assert_eq!(between("zn", "").unwrap(), "zu");
        assert_eq!(between("zu", "").unwrap(), "zx");
        assert_eq!(between("zx", "").unwrap(), "zz");
        assert_eq!(between("zz", "").unwrap(), "zzn");
        assert_eq!(between("az", "b").unwrap(), "azn");
    }

    #[test]
    fn test_repeated_inner_insertion_grows_slowly() {
        let mut next = "o".to_string();
        for _ in 0..50 {
            next = between("n", &next).unwrap();
        }
        // A handful of midpoint steps per extra character
        assert!(next.len() < 20, "key grew too fast: {}", next);
    }

    #[test]
    fn test_is_valid() {
        assert!(is_valid("n"));
        assert!(is_valid("aaan"));
        assert!(!is_valid(""));
        assert!(!is_valid("N"));
        assert!(!is_valid("n1"));
    }

    fn key() -> impl Strategy<Value = String> {
        "[a-z]{1,8}"
    }

    proptest! {
        #[test]
        fn prop_between_sorts_strictly_inside(a in key(), b in key()) {
            prop_assume!(a != b);
            let (prev, next) = if a < b { (a, b) } else { (b, a) };
            match between(&prev, &next) {
                Ok(mid) => {
                    prop_assert!(prev < mid, "{} !< {}", prev, mid);
                    prop_assert!(mid < next, "{} !< {}", mid, next);
                    prop_assert!(is_valid(&mid));
                }
                Err(KanbanError::ImpossibleBound { .. }) => {
                    prop_assert!(next.starts_with(&prev));
                    let rest = &next[prev.len()..];
                    prop_assert!(rest.bytes().all(|b| b == b'a'));
                }
                Err(e) => prop_assert!(false, "unexpected error {}", e),
            }
        }

        #[test]
        fn prop_after_last_sorts_after(prev in key()) {
            let mid = between(&prev, "").unwrap();
            prop_assert!(prev < mid);
            prop_assert!(is_valid(&mid));
        }

        #[test]
        fn prop_before_first_sorts_before(next in "[a-z]{0,6}[b-z]") {
            let mid = between("", &next).unwrap();
            prop_assert!(mid < next);
            prop_assert!(is_valid(&mid));
        }

        #[test]
        fn prop_between_is_deterministic(a in key(), b in key()) {
            let first = between(&a, &b).ok();
            let second = between(&a, &b).ok();
            prop_assert_eq!(first, second);
        }
    }
}

//! Sequence element definition.
//!
//! This module contains the Char struct which represents a single unit of
//! text in the sequence, together with the identity that makes it globally
//! unique and orderable.

use serde::{Deserialize, Serialize};

use crate::crdt::types::position::Position;
use crate::crdt::types::site::SiteId;
use crate::crdt::types::version::Version;

/// A single element of the replicated sequence.
///
/// Each element carries:
/// - Its text value (one character).
/// - The causal counter and site of the edit that created it (its origin).
/// - Its immutable [`Position`] in the total order.
///
/// Elements are immutable after creation. Edits never change an element's
/// position or origin, only its presence in the sequence.
///
/// # Ordering
///
/// Elements are compared solely by position, never by value, counter, or
/// insertion time. Two elements are equal iff their positions are equal,
/// which is what the engine's binary searches rely on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Char {
    /// The text content of this element.
    pub value: char,
    /// The originating site's causal counter when this element was created.
    pub counter: u64,
    /// The site that created this element.
    pub site: SiteId,
    /// The allocated position defining this element's rank in the sequence.
    pub position: Position,
}

impl Char {
    /// Creates a new element.
    pub fn new(value: char, counter: u64, site: SiteId, position: Position) -> Self {
        Char {
            value,
            counter,
            site,
            position,
        }
    }

    /// The causal event that created this element.
    pub fn version(&self) -> Version {
        Version::new(self.site, self.counter)
    }
}

impl PartialEq for Char {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
    }
}

impl Eq for Char {}

impl PartialOrd for Char {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Char {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.position.cmp(&other.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crdt::types::identifier::Identifier;

    fn pos(levels: &[(u64, u64)]) -> Position {
        levels
            .iter()
            .map(|&(digit, site)| Identifier::new(digit, site))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_char_ordering_follows_position() {
        let a = Char::new('a', 1, 1, pos(&[(3, 1)]));
        let b = Char::new('b', 1, 2, pos(&[(7, 2)]));

        assert!(a < b);
    }

    #[test]
    fn test_char_equality_ignores_value_and_origin() {
        let a = Char::new('a', 1, 1, pos(&[(3, 1)]));
        let b = Char::new('z', 9, 5, pos(&[(3, 1)]));

        assert_eq!(a, b);
    }

    #[test]
    fn test_char_version() {
        let c = Char::new('a', 4, 7, pos(&[(3, 1)]));
        assert_eq!(c.version(), Version::new(7, 4));
    }
}

//! Hierarchical position paths defining the sequence's total order.

use serde::{Deserialize, Serialize};

use crate::crdt::types::identifier::Identifier;

/// An ordered path of [`Identifier`]s, read left to right as most-significant
/// first.
///
/// Positions define the total order of the sequence via lexicographic
/// comparison: at the first differing level, digits are compared, then site
/// IDs; if one path runs out first, the shorter path sorts before the longer
/// one. Two positions compare equal only when every level is identical.
///
/// The derived `Ord` on the inner `Vec` provides exactly this lexicographic,
/// prefix-sorts-first ordering.
///
/// Positions are immutable once allocated; edits only change an element's
/// presence in the sequence, never its position.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position(Vec<Identifier>);

impl Position {
    /// Creates an empty position path (the implicit boundary for a missing
    /// neighbor during allocation).
    pub fn new() -> Self {
        Position(Vec::new())
    }

    /// Returns the identifiers of this path, most-significant first.
    pub fn identifiers(&self) -> &[Identifier] {
        &self.0
    }

    /// Returns the depth of this path.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Returns true if this path has no levels.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Identifier>> for Position {
    fn from(ids: Vec<Identifier>) -> Self {
        Position(ids)
    }
}

//! One level of a hierarchical position path.

use serde::{Deserialize, Serialize};

use crate::crdt::types::site::SiteId;

/// A single digit+site pair forming one level of a [`Position`] path.
///
/// Identifiers are immutable once created. Their ordering is what gives
/// positions their total order: digits are compared first, and the site ID
/// breaks ties between digits allocated concurrently by different replicas.
///
/// # Ordering
///
/// The derived `Ord` compares `digit` first, then `site`, matching the field
/// declaration order below.
///
/// [`Position`]: crate::crdt::types::position::Position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identifier {
    /// The digit at this level, drawn from `[0, base * mult^level)`.
    pub digit: u64,
    /// The site that allocated this identifier.
    pub site: SiteId,
}

impl Identifier {
    /// Creates a new identifier from a digit and the allocating site.
    pub fn new(digit: u64, site: SiteId) -> Self {
        Identifier { digit, site }
    }
}

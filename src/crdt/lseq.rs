//! Core LSEQ CRDT implementation.
//!
//! This module contains the main sequence engine and its operations: local
//! edits that allocate fresh positions, remote application with causal
//! duplicate detection, and the deletion buffer that tolerates deletes
//! racing ahead of their matching inserts.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::crdt::error::LseqError;
use crate::crdt::op::RemoteOp;
use crate::crdt::strategy::Strategy;
use crate::crdt::types::{Char, Identifier, Position, SiteId, VersionVector};

/// Configuration for constructing an [`Lseq`] engine.
///
/// Only `site_id` is required; the remaining fields default to the standard
/// allocation parameters (`base` 32, `boundary` 10, `mult` 2, strategy
/// `Random`). A `seed` makes every allocation reproducible, which the tests
/// rely on.
#[derive(Debug, Clone)]
pub struct LseqOptions {
    /// Unique identifier for this replica. Required.
    pub site_id: SiteId,
    /// Elements to start from, already position-sorted. Defaults to empty.
    pub initial_elements: Vec<Char>,
    /// Digit range width at level 0.
    pub base: u64,
    /// Maximum spread of an allocation window.
    pub boundary: u64,
    /// Boundary strategy selecting allocation windows per level.
    pub strategy: Strategy,
    /// Growth factor of the digit range per level.
    pub mult: u64,
    /// Seed for the engine's random source. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl LseqOptions {
    /// Creates options for `site_id` with all defaults.
    pub fn new(site_id: SiteId) -> Self {
        LseqOptions {
            site_id,
            initial_elements: Vec::new(),
            base: 32,
            boundary: 10,
            strategy: Strategy::Random,
            mult: 2,
            seed: None,
        }
    }
}

/// The LSEQ sequence CRDT engine.
///
/// Each replica owns one engine. Local edits allocate fresh hierarchical
/// positions and advance the local causal counter; remote operations are
/// integrated through a version-vector duplicate check, position-ordered
/// binary searches, and a deletion buffer for deletes delivered before their
/// matching insert. Replicas fed the same multiset of operations converge to
/// identical content regardless of delivery order.
///
/// # Design
///
/// - Position-sorted `Vec<Char>` as the source of truth, with an
///   incrementally maintained `String` projection of the visible text
/// - Logoot-style recursive position allocation with per-level boundary
///   strategies, memoized per level for the engine's lifetime
/// - Version vector for causal duplicate detection on remote inserts
/// - Injected seeded RNG so allocation is reproducible in tests
///
/// # Concurrency
///
/// The engine is sequential: every operation takes `&mut self`, never blocks,
/// and performs no I/O. A multi-threaded host must serialize access, e.g.
/// with one lock per document.
pub struct Lseq {
    /// The unique identifier for this replica.
    site_id: SiteId,
    /// Per-site causal counters for duplicate detection.
    vector: VersionVector,
    /// The position-sorted element list. Source of truth for the content.
    elements: Vec<Char>,
    /// Cached flattened text, kept in lock-step with `elements`.
    text: String,
    /// Digit range width at level 0.
    base: u64,
    /// Maximum spread of an allocation window.
    boundary: u64,
    /// Configured boundary strategy.
    strategy: Strategy,
    /// Strategy resolved per path level, fixed for the engine's lifetime.
    strategy_cache: HashMap<usize, Strategy>,
    /// Growth factor of the digit range per level.
    mult: u64,
    /// Remote deletes waiting for their matching insert.
    deletion_buffer: Vec<Char>,
    /// Random source for digit spacing and strategy coin flips.
    rng: StdRng,
}

impl Lseq {
    /// Creates a new engine for `site_id` with default options.
    pub fn new(site_id: SiteId) -> Self {
        Self::with_options(LseqOptions::new(site_id))
    }

    /// Creates a new engine from explicit options.
    ///
    /// If `initial_elements` is non-empty the text projection is rebuilt from
    /// it immediately, so the list/text invariant holds from construction.
    pub fn with_options(options: LseqOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut engine = Lseq {
            site_id: options.site_id,
            vector: VersionVector::new(options.site_id),
            elements: options.initial_elements,
            text: String::new(),
            base: options.base,
            boundary: options.boundary,
            strategy: options.strategy,
            strategy_cache: HashMap::new(),
            mult: options.mult,
            deletion_buffer: Vec::new(),
            rng,
        };
        if !engine.elements.is_empty() {
            engine.rebuild_text();
        }
        engine
    }

    /// Gets the site ID of this replica.
    pub fn site_id(&self) -> SiteId {
        self.site_id
    }

    /// The current flattened text of the sequence.
    ///
    /// Maintained incrementally; this is a free read.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Read-only view of the position-sorted element list.
    pub fn elements(&self) -> &[Char] {
        &self.elements
    }

    /// Number of live elements in the sequence.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if the sequence holds no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The engine's version vector (for inspection and testing).
    pub fn version(&self) -> &VersionVector {
        &self.vector
    }

    /// Number of remote deletes currently waiting for their insert.
    pub fn deletion_buffer_len(&self) -> usize {
        self.deletion_buffer.len()
    }

    /// Rebuilds the cached text from the element list.
    ///
    /// The text is normally maintained incrementally; this exists for
    /// recovery and testing.
    pub fn rebuild_text(&mut self) -> &str {
        self.text = self.elements.iter().map(|c| c.value).collect();
        &self.text
    }

    /// Applies a local insert of `value` at `index`.
    ///
    /// Advances the local causal counter, allocates a position strictly
    /// between the neighbors at `index - 1` and `index`, and splices the new
    /// element into the list and the text.
    ///
    /// # Returns
    ///
    /// The newly created element, for broadcast to other replicas.
    ///
    /// # Errors
    ///
    /// [`LseqError::IndexOutOfBounds`] if `index` is past the end of the
    /// sequence, [`LseqError::PositionOrder`] if the neighboring positions
    /// are corrupt.
    pub fn handle_local_insert(&mut self, index: usize, value: char) -> Result<Char, LseqError> {
        if index > self.elements.len() {
            return Err(LseqError::IndexOutOfBounds {
                index,
                len: self.elements.len(),
            });
        }

        self.vector.increment();

        let char = self.generate_char(index, value)?;
        self.insert_text(index, value);
        self.elements.insert(index, char.clone());
        Ok(char)
    }

    /// Applies a local delete of the element at `index`.
    ///
    /// Advances the local causal counter and splices the element out of the
    /// list and the text. The removed element keeps its own counter and site:
    /// deletion does not mint a new identity, only the replica's causal
    /// counter moves.
    ///
    /// # Returns
    ///
    /// The removed element, for broadcast to other replicas.
    ///
    /// # Errors
    ///
    /// [`LseqError::IndexOutOfBounds`] if `index` does not address an element.
    pub fn handle_local_delete(&mut self, index: usize) -> Result<Char, LseqError> {
        if index >= self.elements.len() {
            return Err(LseqError::IndexOutOfBounds {
                index,
                len: self.elements.len(),
            });
        }

        self.vector.increment();

        let char = self.elements.remove(index);
        self.delete_text(index);
        Ok(char)
    }

    /// Integrates an element inserted at a remote replica.
    ///
    /// Duplicate deliveries are detected through the version vector and
    /// ignored. After a successful insert the deletion buffer is drained,
    /// since the new element may be the target of a buffered delete.
    pub fn handle_remote_insert(&mut self, char: Char) {
        let version = char.version();
        if self.vector.has_been_applied(&version) {
            trace!(
                site = char.site,
                counter = char.counter,
                "skipping duplicate remote insert"
            );
            return;
        }

        let index = self.find_insertion_index(&char);
        self.insert_text(index, char.value);
        self.elements.insert(index, char);

        self.vector.update(version);

        self.process_deletion_buffer();
    }

    /// Integrates a delete performed at a remote replica.
    ///
    /// If no element matches the target's position, the matching insert has
    /// not arrived yet; the delete is buffered and retried after each
    /// successful remote insert. There is deliberately no causal duplicate
    /// guard on this path, mirroring the asymmetry of the remote-insert path
    /// (see DESIGN.md).
    pub fn handle_remote_delete(&mut self, char: Char) {
        let Some(index) = self.find_deletion_index(&char) else {
            debug!(
                site = char.site,
                counter = char.counter,
                "buffering remote delete ahead of its insert"
            );
            self.deletion_buffer.push(char);
            return;
        };

        let version = char.version();
        self.elements.remove(index);
        self.delete_text(index);

        self.vector.update(version);
    }

    /// Dispatches an operation envelope to the matching remote handler.
    pub fn apply_remote(&mut self, op: RemoteOp) {
        match op {
            RemoteOp::Insert { char } => self.handle_remote_insert(char),
            RemoteOp::Delete { char } => self.handle_remote_delete(char),
        }
    }

    /// Retries buffered deletes whose insert has since been applied.
    ///
    /// A single pass over the entries present at invocation suffices: this
    /// runs after every successful remote insert, and inserts are the only
    /// events that unblock buffered deletes. A retried delete whose target is
    /// still absent lands back in the buffer rather than being re-examined in
    /// the same pass.
    fn process_deletion_buffer(&mut self) {
        let buffered = std::mem::take(&mut self.deletion_buffer);
        for char in buffered {
            if self.vector.has_been_applied(&char.version()) {
                debug!(
                    site = char.site,
                    counter = char.counter,
                    "retrying buffered remote delete"
                );
                self.handle_remote_delete(char);
            } else {
                self.deletion_buffer.push(char);
            }
        }
    }

    /// Builds the element for a local insert at `index`.
    fn generate_char(&mut self, index: usize, value: char) -> Result<Char, LseqError> {
        let pos_before = index
            .checked_sub(1)
            .and_then(|i| self.elements.get(i))
            .map(|c| c.position.clone())
            .unwrap_or_default();
        let pos_after = self
            .elements
            .get(index)
            .map(|c| c.position.clone())
            .unwrap_or_default();

        let position = self.generate_pos_between(pos_before.identifiers(), pos_after.identifiers())?;
        Ok(Char::new(
            value,
            self.vector.local_counter(),
            self.site_id,
            position,
        ))
    }

    /// Allocates a fresh position strictly between `pos1` and `pos2`.
    ///
    /// Walks the two paths level by level. A missing identifier is treated as
    /// the implicit boundary for that level: digit `0` on the left, the full
    /// range width on the right. At the first level with room (a digit gap
    /// greater than one) a new digit is drawn inside the gap via the boundary
    /// strategy and the walk stops. A gap of exactly one forces descent under
    /// the left identifier; equal digits descend by site order. Depth only
    /// grows when digit space is exhausted, which is the intended amortized
    /// cost under sustained concurrent insertion at one spot.
    ///
    /// # Errors
    ///
    /// [`LseqError::PositionOrder`] if `pos1` does not precede `pos2`.
    fn generate_pos_between(
        &mut self,
        pos1: &[Identifier],
        pos2: &[Identifier],
    ) -> Result<Position, LseqError> {
        let mut path: Vec<Identifier> = Vec::new();
        let mut left = pos1;
        let mut right = pos2;
        let mut level = 0usize;

        loop {
            let width = self
                .base
                .saturating_mul(self.mult.saturating_pow(level as u32));
            let id1 = left
                .first()
                .copied()
                .unwrap_or(Identifier::new(0, self.site_id));
            let id2 = right
                .first()
                .copied()
                .unwrap_or(Identifier::new(width, self.site_id));

            match id1.digit.cmp(&id2.digit) {
                std::cmp::Ordering::Less if id2.digit - id1.digit > 1 => {
                    // Room at this level: allocate inside the gap and stop.
                    let strategy = self.retrieve_strategy(level);
                    let digit = self.generate_digit_between(id1.digit, id2.digit, strategy);
                    path.push(Identifier::new(digit, self.site_id));
                    return Ok(path.into());
                }
                std::cmp::Ordering::Less => {
                    // Gap of exactly one: descend under the left path.
                    path.push(id1);
                    left = left.get(1..).unwrap_or(&[]);
                    right = &[];
                }
                std::cmp::Ordering::Equal => match id1.site.cmp(&id2.site) {
                    std::cmp::Ordering::Less => {
                        // Site order already separates the paths; descend
                        // under the left one alone.
                        path.push(id1);
                        left = left.get(1..).unwrap_or(&[]);
                        right = &[];
                    }
                    std::cmp::Ordering::Equal => {
                        // Genuine shared prefix: descend both paths together.
                        path.push(id1);
                        left = left.get(1..).unwrap_or(&[]);
                        right = right.get(1..).unwrap_or(&[]);
                    }
                    std::cmp::Ordering::Greater => {
                        return Err(LseqError::PositionOrder { level });
                    }
                },
                std::cmp::Ordering::Greater => {
                    return Err(LseqError::PositionOrder { level });
                }
            }

            level += 1;
        }
    }

    /// Resolves the boundary strategy for `level`, memoizing the answer for
    /// the engine's lifetime.
    fn retrieve_strategy(&mut self, level: usize) -> Strategy {
        if let Some(&strategy) = self.strategy_cache.get(&level) {
            return strategy;
        }

        let resolved = self.strategy.resolve(level, &mut self.rng);
        self.strategy_cache.insert(level, resolved);
        resolved
    }

    /// Draws a digit uniformly from the strategy's window inside `(min, max)`.
    ///
    /// When the gap is narrower than the boundary width the whole open
    /// interval is used; otherwise the window is clamped to `boundary` digits
    /// adjacent to the lower (`Plus`) or upper (`Minus`) bound.
    fn generate_digit_between(&mut self, min: u64, max: u64, strategy: Strategy) -> u64 {
        let (lo, hi) = if max - min < self.boundary {
            (min + 1, max)
        } else if strategy == Strategy::Minus {
            (max - self.boundary, max)
        } else {
            (min + 1, min + 1 + self.boundary)
        };
        self.rng.gen_range(lo..hi)
    }

    /// Finds the index preserving position order for a remote insert.
    ///
    /// Resolves to a valid insertion point even when no element compares
    /// equal: the search narrows to where the comparison flips sign.
    fn find_insertion_index(&self, char: &Char) -> usize {
        if self.elements.is_empty() || char < &self.elements[0] {
            return 0;
        }

        let mut left = 0;
        let mut right = self.elements.len() - 1;
        if char > &self.elements[right] {
            return self.elements.len();
        }

        while left + 1 < right {
            let mid = left + (right - left) / 2;
            match char.cmp(&self.elements[mid]) {
                std::cmp::Ordering::Equal => return mid,
                std::cmp::Ordering::Greater => left = mid,
                std::cmp::Ordering::Less => right = mid,
            }
        }

        if char == &self.elements[left] { left } else { right }
    }

    /// Finds the element whose position exactly matches the target's.
    ///
    /// `None` means the position is absent anywhere in the list, which is the
    /// signal to buffer a remote delete, not an error.
    fn find_deletion_index(&self, char: &Char) -> Option<usize> {
        if self.elements.is_empty() {
            return None;
        }

        let mut left = 0;
        let mut right = self.elements.len() - 1;

        while left + 1 < right {
            let mid = left + (right - left) / 2;
            match char.cmp(&self.elements[mid]) {
                std::cmp::Ordering::Equal => return Some(mid),
                std::cmp::Ordering::Greater => left = mid,
                std::cmp::Ordering::Less => right = mid,
            }
        }

        if char == &self.elements[left] {
            Some(left)
        } else if char == &self.elements[right] {
            Some(right)
        } else {
            None
        }
    }

    /// Splices `value` into the cached text at element index `index`.
    fn insert_text(&mut self, index: usize, value: char) {
        let at = self.byte_offset(index);
        self.text.insert(at, value);
    }

    /// Splices the character at element index `index` out of the cached text.
    fn delete_text(&mut self, index: usize) {
        let at = self.byte_offset(index);
        self.text.remove(at);
    }

    /// Maps an element index to a byte offset in the cached text.
    fn byte_offset(&self, index: usize) -> usize {
        self.text
            .char_indices()
            .nth(index)
            .map(|(at, _)| at)
            .unwrap_or(self.text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(site_id: SiteId) -> Lseq {
        let mut options = LseqOptions::new(site_id);
        options.seed = Some(site_id);
        Lseq::with_options(options)
    }

    fn assert_strictly_sorted(engine: &Lseq) {
        let elements = engine.elements();
        for pair in elements.windows(2) {
            assert!(
                pair[0].position < pair[1].position,
                "elements out of order: {:?} !< {:?}",
                pair[0].position,
                pair[1].position
            );
        }
    }

    #[test]
    fn test_engine_creation() {
        let engine = Lseq::new(1);
        assert_eq!(engine.site_id(), 1);
        assert_eq!(engine.text(), "");
        assert!(engine.is_empty());
        assert_eq!(engine.deletion_buffer_len(), 0);
    }

    #[test]
    fn test_local_insert_builds_text() {
        let mut engine = seeded(1);
        engine.handle_local_insert(0, 'a').unwrap();
        engine.handle_local_insert(1, 'b').unwrap();
        engine.handle_local_insert(1, 'X').unwrap();

        assert_eq!(engine.text(), "aXb");
        assert_eq!(engine.len(), 3);
        assert_strictly_sorted(&engine);
    }

    #[test]
    fn test_local_insert_carries_fresh_counter() {
        let mut engine = seeded(1);
        let a = engine.handle_local_insert(0, 'a').unwrap();
        let b = engine.handle_local_insert(1, 'b').unwrap();

        assert_eq!(a.counter, 1);
        assert_eq!(b.counter, 2);
        assert_eq!(a.site, 1);
    }

    #[test]
    fn test_local_delete_returns_original_element() {
        let mut engine = seeded(1);
        let inserted = engine.handle_local_insert(0, 'a').unwrap();
        let removed = engine.handle_local_delete(0).unwrap();

        // Deletion does not mint a new identity.
        assert_eq!(removed.counter, inserted.counter);
        assert_eq!(removed.site, inserted.site);
        assert_eq!(removed.position, inserted.position);
        assert_eq!(engine.text(), "");
        // The delete is still a causal event.
        assert_eq!(engine.version().local_counter(), 2);
    }

    #[test]
    fn test_local_edit_index_out_of_bounds() {
        let mut engine = seeded(1);
        assert_eq!(
            engine.handle_local_insert(1, 'a'),
            Err(LseqError::IndexOutOfBounds { index: 1, len: 0 })
        );
        assert_eq!(
            engine.handle_local_delete(0),
            Err(LseqError::IndexOutOfBounds { index: 0, len: 0 })
        );
    }

    #[test]
    fn test_remote_insert_sorts_by_position() {
        let mut alice = seeded(1);
        let mut bob = seeded(2);

        let a = alice.handle_local_insert(0, 'a').unwrap();
        let b = alice.handle_local_insert(1, 'b').unwrap();
        bob.handle_remote_insert(a);
        bob.handle_remote_insert(b);

        assert_eq!(bob.text(), "ab");
        assert_strictly_sorted(&bob);
    }

    #[test]
    fn test_remote_insert_is_idempotent() {
        let mut alice = seeded(1);
        let mut bob = seeded(2);

        let a = alice.handle_local_insert(0, 'a').unwrap();
        bob.handle_remote_insert(a.clone());
        bob.handle_remote_insert(a);

        assert_eq!(bob.text(), "a");
        assert_eq!(bob.len(), 1);
    }

    #[test]
    fn test_remote_delete_removes_by_position() {
        let mut alice = seeded(1);
        let mut bob = seeded(2);

        let a = alice.handle_local_insert(0, 'a').unwrap();
        let b = alice.handle_local_insert(1, 'b').unwrap();
        bob.handle_remote_insert(a);
        bob.handle_remote_insert(b.clone());

        alice.handle_local_delete(1).unwrap();
        bob.handle_remote_delete(b);

        assert_eq!(alice.text(), bob.text());
        assert_eq!(bob.text(), "a");
    }

    #[test]
    fn test_delete_before_insert_is_buffered() {
        let mut alice = seeded(1);
        let mut bob = seeded(2);

        let a = alice.handle_local_insert(0, 'a').unwrap();
        let deleted = alice.handle_local_delete(0).unwrap();

        // Delete arrives first: nothing to remove yet.
        bob.handle_remote_delete(deleted);
        assert_eq!(bob.text(), "");
        assert_eq!(bob.deletion_buffer_len(), 1);

        // The insert both lands and is immediately cancelled by the buffered
        // delete.
        bob.handle_remote_insert(a.clone());
        assert_eq!(bob.text(), "");
        assert_eq!(bob.deletion_buffer_len(), 0);
        assert!(bob.version().has_been_applied(&a.version()));
    }

    #[test]
    fn test_allocator_rejects_misordered_inputs() {
        let mut engine = seeded(1);
        let left = Position::from(vec![Identifier::new(5, 1)]);
        let right = Position::from(vec![Identifier::new(3, 1)]);

        let result = engine.generate_pos_between(left.identifiers(), right.identifiers());
        assert_eq!(result, Err(LseqError::PositionOrder { level: 0 }));

        let left = Position::from(vec![Identifier::new(5, 2)]);
        let right = Position::from(vec![Identifier::new(5, 1)]);
        let result = engine.generate_pos_between(left.identifiers(), right.identifiers());
        assert_eq!(result, Err(LseqError::PositionOrder { level: 0 }));
    }

    #[test]
    fn test_allocator_descends_when_gap_is_one() {
        let mut engine = seeded(1);
        let left = Position::from(vec![Identifier::new(4, 1)]);
        let right = Position::from(vec![Identifier::new(5, 1)]);

        let position = engine
            .generate_pos_between(left.identifiers(), right.identifiers())
            .unwrap();

        assert!(position.depth() > 1);
        assert!(left < position);
        assert!(position < right);
    }

    #[test]
    fn test_allocator_descends_past_shared_prefix() {
        let mut engine = seeded(1);
        let left = Position::from(vec![Identifier::new(4, 2), Identifier::new(10, 2)]);
        let right = Position::from(vec![Identifier::new(4, 2), Identifier::new(40, 2)]);

        let position = engine
            .generate_pos_between(left.identifiers(), right.identifiers())
            .unwrap();

        assert_eq!(position.identifiers()[0], Identifier::new(4, 2));
        assert!(left < position);
        assert!(position < right);
    }

    #[test]
    fn test_allocation_stays_between_neighbors() {
        let mut engine = seeded(7);
        // Repeated insertion at the front forces allocations against an ever
        // smaller left gap.
        for i in 0..200 {
            let value = char::from_u32('a' as u32 + (i % 26)).unwrap();
            engine.handle_local_insert(0, value).unwrap();
        }
        assert_eq!(engine.len(), 200);
        assert_strictly_sorted(&engine);
    }

    #[test]
    fn test_seeded_engines_allocate_identically() {
        let mut a = seeded(9);
        let mut b = seeded(9);
        for i in 0..20 {
            let x = a.handle_local_insert(i, 'x').unwrap();
            let y = b.handle_local_insert(i, 'x').unwrap();
            assert_eq!(x.position, y.position);
        }
    }

    #[test]
    fn test_initial_elements_rebuild_text() {
        let mut source = seeded(1);
        source.handle_local_insert(0, 'h').unwrap();
        source.handle_local_insert(1, 'i').unwrap();

        let mut options = LseqOptions::new(2);
        options.initial_elements = source.elements().to_vec();
        let engine = Lseq::with_options(options);

        assert_eq!(engine.text(), "hi");
    }

    #[test]
    fn test_rebuild_text_matches_incremental_text() {
        let mut engine = seeded(3);
        for (i, value) in "hello".chars().enumerate() {
            engine.handle_local_insert(i, value).unwrap();
        }
        engine.handle_local_delete(1).unwrap();

        let incremental = engine.text().to_string();
        assert_eq!(engine.rebuild_text(), incremental);
    }
}

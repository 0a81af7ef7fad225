//! Error taxonomy for the sequence engine.

use thiserror::Error;

/// Errors surfaced by the sequence engine.
///
/// Only genuine misuse or corruption is an error. Duplicate remote inserts
/// are silently ignored, and deletes arriving before their matching insert
/// are buffered, never surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LseqError {
    /// The two positions handed to the allocator were not in order at the
    /// given path level. This signals a bug in the caller or a corrupted
    /// sequence and fails the allocation immediately.
    #[error("position inputs out of order at level {level}")]
    PositionOrder { level: usize },

    /// A local edit addressed an index past the end of the sequence.
    #[error("index {index} out of bounds for sequence of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

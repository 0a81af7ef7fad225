//! # LSEQ CRDT - Replicated Sequence
//!
//! A Conflict-free Replicated Data Type (CRDT) implementation of an ordered
//! text sequence, suitable for collaborative editing and similar applications
//! where concurrent modifications need to be merged consistently across
//! distributed replicas.
//!
//! ## Features
//!
//! - **Conflict-free**: Concurrent operations can be applied in any order and
//!   will converge
//! - **Idempotent**: Duplicate delivery of remote inserts is detected through
//!   per-site version vectors
//! - **Order-tolerant deletes**: A delete arriving before its matching insert
//!   is buffered and retried, never lost
//! - **Bounded growth**: Hierarchical position allocation with boundary
//!   strategies keeps identifier paths short under realistic editing
//!
//! ## Example
//!
//! ```rust
//! use crdt_lseq::Lseq;
//!
//! let mut alice = Lseq::new(1); // site ID = 1
//! let mut bob = Lseq::new(2);
//!
//! let op = alice.handle_local_insert(0, 'a').unwrap();
//! bob.handle_remote_insert(op); // delivered by the host's transport
//!
//! assert_eq!(alice.text(), bob.text());
//! ```

pub mod crdt;

// Re-export the main public API from the CRDT module
pub use crdt::{Char, Identifier, Position, SiteId, Version, VersionVector};
pub use crdt::{Lseq, LseqError, LseqOptions, RemoteOp, Strategy};

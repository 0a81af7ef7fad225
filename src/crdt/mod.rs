//! CRDT (Conflict-free Replicated Data Type) implementation module.
//!
//! This module contains the LSEQ sequence CRDT engine and all its supporting
//! types and structures.

pub mod error;
pub mod lseq;
pub mod op;
pub mod strategy;
pub mod types;

// Re-export the main public API
pub use error::LseqError;
pub use lseq::{Lseq, LseqOptions};
pub use op::RemoteOp;
pub use strategy::Strategy;
pub use types::{Char, Identifier, Position, SiteId, Version, VersionVector};

//! Type definitions for the LSEQ CRDT.
//!
//! This module contains all the fundamental types used throughout the engine,
//! organized into focused submodules for better maintainability.

pub mod char;
pub mod identifier;
pub mod position;
pub mod site;
pub mod version;

// Re-export all public types
pub use self::char::Char;
pub use identifier::Identifier;
pub use position::Position;
pub use site::SiteId;
pub use version::{Version, VersionVector};

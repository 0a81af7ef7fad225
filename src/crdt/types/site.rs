//! Site identifier type.
//!
//! This module contains the definition of SiteId, which uniquely identifies
//! each replica participating in the distributed sequence.

/// A unique identifier for each site (replica) in the distributed system.
///
/// Each participant in the collaborative editing system must have a unique
/// site ID. The site ID breaks ties between identifiers with equal digits,
/// so uniqueness is what guarantees that no two replicas ever mint the same
/// position.
pub type SiteId = u64;

//! Operation envelope exchanged with the host's broadcast layer.

use serde::{Deserialize, Serialize};

use crate::crdt::types::Char;

/// A remote operation as delivered by the host's transport.
///
/// Every successful local edit returns the affected [`Char`]; the host wraps
/// it in this envelope, broadcasts it, and feeds received envelopes back into
/// [`Lseq::apply_remote`]. The wire encoding itself is the host's concern;
/// this type only fixes the logical fields an operation must carry.
///
/// [`Lseq::apply_remote`]: crate::crdt::lseq::Lseq::apply_remote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum RemoteOp {
    /// Insert the carried element at its position.
    Insert { char: Char },
    /// Remove the element matching the carried position.
    Delete { char: Char },
}

impl RemoteOp {
    /// The element this operation carries.
    pub fn char(&self) -> &Char {
        match self {
            RemoteOp::Insert { char } | RemoteOp::Delete { char } => char,
        }
    }
}

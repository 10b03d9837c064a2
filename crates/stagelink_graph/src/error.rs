// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection protocol errors.

use crate::id::NodeKey;
use crate::port::Direction;

/// Why a connect or disconnect was refused. A refused call leaves every
/// port list untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
    /// The handle does not name a live node
    #[error("Unknown node: {0}")]
    UnknownNode(NodeKey),

    /// Index outside the addressable range of the list
    #[error("Invalid {direction} index {index} (list has {len} slots)")]
    InvalidIndex {
        /// Side addressed
        direction: Direction,
        /// Requested index
        index: usize,
        /// Current list length
        len: usize,
    },

    /// Direct-index connect onto a slot that already holds another neighbor
    #[error("{direction} slot {index} is occupied, disconnect it first")]
    SlotOccupied {
        /// Side addressed
        direction: Direction,
        /// Occupied index
        index: usize,
    },

    /// Fixed list with every slot occupied
    #[error("No free {direction} slot")]
    NoFreeSlot {
        /// Side addressed
        direction: Direction,
    },

    /// The stage refused the candidate on this side
    #[error("Capability check rejected the {direction} connection")]
    CapabilityRejected {
        /// Side whose check failed
        direction: Direction,
    },

    /// The candidate already sits at another slot of the same list
    #[error("Neighbor already connected at {direction} index {index}")]
    AlreadyConnected {
        /// Side addressed
        direction: Direction,
        /// Where the neighbor currently is
        index: usize,
    },

    /// A batch list names the same neighbor twice
    #[error("Duplicate neighbor in port list: {0}")]
    DuplicateNeighbor(NodeKey),

    /// Child operation on a node that cannot own children
    #[error("Node {0} is not a container")]
    NotAContainer(NodeKey),

    /// Adopting the child would make a container own itself
    #[error("Adding {child} to {container} would create an ownership cycle")]
    OwnershipCycle {
        /// Intended owner
        container: NodeKey,
        /// Node being adopted
        child: NodeKey,
    },
}

/// Result type for connection operations
pub type Result<T, E = ConnectError> = std::result::Result<T, E>;

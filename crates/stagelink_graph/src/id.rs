// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node identity: process-unique ids and arena handles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Next id handed out by [`NodeId::generate`]. Never rewinds.
static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier for a node.
///
/// Ids come from a single monotonic counter, so an id is never handed out
/// twice within a process, even after the node that carried it is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    /// Issue a fresh id
    pub fn generate() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id value
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a node slot inside a [`Graph`](crate::Graph).
///
/// Keys are generational: once the node behind a key is destroyed, the key
/// stops resolving even if its slot is later reused by another node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    index: u32,
    generation: u32,
}

impl NodeKey {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index inside the arena
    pub fn index(self) -> usize {
        self.index as usize
    }

    /// Generation of the slot this key was issued for
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let a = NodeId::generate();
        let b = NodeId::generate();
        let c = NodeId::generate();
        assert!(a < b && b < c);
        assert_ne!(a, c);
    }

    #[test]
    fn test_display() {
        let key = NodeKey::new(3, 7);
        assert_eq!(key.to_string(), "3v7");
        assert_eq!(key.index(), 3);
        assert_eq!(key.generation(), 7);
    }
}

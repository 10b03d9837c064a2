// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port lists: the ordered input/output slots of a node.

use crate::id::NodeKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Input side
    Input,
    /// Output side
    Output,
}

impl Direction {
    /// The side a reciprocal link lives on
    pub fn opposite(self) -> Self {
        match self {
            Self::Input => Self::Output,
            Self::Output => Self::Input,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// Ordered list of optional, non-owning neighbor handles.
///
/// A fixed list keeps its length: disconnecting clears the slot. A growable
/// list removes the slot instead, shifting later indices down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortList {
    slots: Vec<Option<NodeKey>>,
    fixed: bool,
}

impl PortList {
    /// Create a list of `len` empty slots
    pub fn new(len: usize, fixed: bool) -> Self {
        Self {
            slots: vec![None; len],
            fixed,
        }
    }

    /// Number of slots, occupied or not
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the list has no slots at all
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether the list length is fixed
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// Neighbor at `index`, if the slot exists and is occupied
    pub fn get(&self, index: usize) -> Option<NodeKey> {
        self.slots.get(index).copied().flatten()
    }

    /// Raw slots
    pub fn slots(&self) -> &[Option<NodeKey>] {
        &self.slots
    }

    /// Occupied slots in order
    pub fn neighbors(&self) -> impl DoubleEndedIterator<Item = NodeKey> + '_ {
        self.slots.iter().flatten().copied()
    }

    /// Index of `key`, if present
    pub fn position(&self, key: NodeKey) -> Option<usize> {
        self.slots.iter().position(|slot| *slot == Some(key))
    }

    /// Whether `key` occupies any slot
    pub fn contains(&self, key: NodeKey) -> bool {
        self.position(key).is_some()
    }

    /// Number of occupied slots
    pub fn occupied(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// True when no slot is empty
    pub fn is_saturated(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Whether `index` can be addressed by a connect. Growable lists also
    /// accept `len`, which appends.
    pub fn accepts_index(&self, index: usize) -> bool {
        if self.fixed {
            index < self.slots.len()
        } else {
            index <= self.slots.len()
        }
    }

    /// Write `key` into `index`, appending when `index == len`.
    pub(crate) fn place(&mut self, index: usize, key: NodeKey) {
        if index == self.slots.len() {
            self.slots.push(Some(key));
        } else {
            self.slots[index] = Some(key);
        }
    }

    /// Empty the slot at `index`, returning its previous occupant.
    pub(crate) fn vacate(&mut self, index: usize) -> Option<NodeKey> {
        if index >= self.slots.len() {
            return None;
        }
        if self.fixed {
            self.slots[index].take()
        } else {
            self.slots.remove(index)
        }
    }

    /// Disconnect every slot. Returns the previous slots.
    pub(crate) fn clear(&mut self) -> Vec<Option<NodeKey>> {
        let old = self.slots.clone();
        if self.fixed {
            self.slots.iter_mut().for_each(|slot| *slot = None);
        } else {
            self.slots.clear();
        }
        old
    }

    /// Resize to `len` slots. Returns occupants of trimmed slots.
    pub(crate) fn resize(&mut self, len: usize) -> Vec<NodeKey> {
        if len >= self.slots.len() {
            self.slots.resize(len, None);
            return Vec::new();
        }
        self.slots.drain(len..).flatten().collect()
    }

    /// Swap in a whole new slot layout. Returns the previous slots.
    pub(crate) fn replace_all(&mut self, slots: Vec<Option<NodeKey>>) -> Vec<Option<NodeKey>> {
        std::mem::replace(&mut self.slots, slots)
    }

    /// Move the slot at `from` to `to`, shifting the ones in between.
    pub(crate) fn move_slot(&mut self, from: usize, to: usize) {
        let slot = self.slots.remove(from);
        self.slots.insert(to, slot);
    }
}

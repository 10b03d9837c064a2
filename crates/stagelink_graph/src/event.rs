// SPDX-License-Identifier: MIT OR Apache-2.0
//! Structural-change events and per-node listener registration.
//!
//! Delivery is synchronous: an event reaches every listener of the node
//! before the mutating call returns. Listeners only see the event, never
//! the graph, so delivery cannot re-enter the protocol.

use crate::id::{NodeId, NodeKey};
use crate::port::Direction;
use std::cell::RefCell;
use std::rc::Rc;

/// Whether a connection change added or removed neighbors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Neighbors were connected (or the list was reordered)
    Connect,
    /// Neighbors were disconnected
    Disconnect,
}

/// A change to one side of a node's port lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEvent {
    /// Node whose list changed
    pub node: NodeKey,
    /// Id of that node
    pub node_id: NodeId,
    /// Connect or disconnect
    pub kind: ChangeKind,
    /// Side that changed
    pub direction: Direction,
    /// Neighbors added, or the new layout for whole-list changes
    pub new_neighbors: Vec<Option<NodeKey>>,
    /// Neighbors removed, or the previous layout for whole-list changes
    pub old_neighbors: Vec<Option<NodeKey>>,
}

/// Event delivered to node listeners
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEvent {
    /// A port list changed
    ConnectionChanged(ConnectionEvent),
    /// The node is about to be destroyed; its links are still intact
    Destructing {
        /// Node being destroyed
        node: NodeKey,
        /// Its id
        id: NodeId,
    },
    /// An event pushed along the graph from another node
    Propagated {
        /// Node that started the propagation
        origin: NodeKey,
        /// Caller-chosen topic
        topic: String,
    },
}

impl GraphEvent {
    /// The connection change, if this is one
    pub fn as_connection(&self) -> Option<&ConnectionEvent> {
        match self {
            Self::ConnectionChanged(event) => Some(event),
            _ => None,
        }
    }
}

/// Receiver of node events
pub trait Listener {
    /// Called synchronously for each event on the node
    fn receive(&mut self, event: &GraphEvent);
}

impl<F> Listener for F
where
    F: FnMut(&GraphEvent),
{
    fn receive(&mut self, event: &GraphEvent) {
        self(event);
    }
}

/// Handle returned when registering a listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Listeners registered on one node, in registration order
#[derive(Default)]
pub(crate) struct ListenerSet {
    entries: Vec<(ListenerId, Box<dyn Listener>)>,
    next_id: u64,
}

impl ListenerSet {
    pub(crate) fn add(&mut self, listener: Box<dyn Listener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn deliver(&mut self, event: &GraphEvent) {
        for (_, listener) in &mut self.entries {
            listener.receive(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Listener that records every event it receives.
///
/// Clones share the same log, so a test can register one clone and keep
/// another to inspect.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<GraphEvent>>>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all recorded events
    pub fn events(&self) -> Vec<GraphEvent> {
        self.events.borrow().clone()
    }

    /// Recorded connection changes only
    pub fn connection_events(&self) -> Vec<ConnectionEvent> {
        self.events
            .borrow()
            .iter()
            .filter_map(GraphEvent::as_connection)
            .cloned()
            .collect()
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Forget recorded events
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl Listener for EventLog {
    fn receive(&mut self, event: &GraphEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph storage and node lifecycle.

use crate::arena::Arena;
use crate::capability::Capability;
use crate::config::GraphConfig;
use crate::error::{ConnectError, Result};
use crate::event::{ChangeKind, ConnectionEvent, GraphEvent, Listener, ListenerId};
use crate::id::{NodeId, NodeKey};
use crate::node::{Node, NodeOptions};
use crate::port::Direction;

/// A graph of connectable nodes.
///
/// Nodes live in a generational arena and refer to their neighbors by
/// [`NodeKey`]. All mutation goes through the connection protocol
/// (see the `connection` module), container operations, and
/// [`Graph::remove_node`].
pub struct Graph {
    pub(crate) nodes: Arena<Node>,
    pub(crate) config: GraphConfig,
}

impl Graph {
    /// Create an empty graph with default settings
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    /// Create an empty graph with the given settings
    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            nodes: Arena::new(),
            config,
        }
    }

    /// Current settings
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Replace the settings
    pub fn set_config(&mut self, config: GraphConfig) {
        self.config = config;
    }

    /// Add a node and return its handle
    pub fn add_node(
        &mut self,
        options: NodeOptions,
        capability: impl Capability + 'static,
    ) -> NodeKey {
        self.add_node_boxed(options, Box::new(capability))
    }

    /// Add a node whose capability is already boxed
    pub fn add_node_boxed(&mut self, options: NodeOptions, capability: Box<dyn Capability>) -> NodeKey {
        let node = Node::new(options, capability);
        let id = node.id;
        let name = node.name.clone();
        let key = self.nodes.insert(node);
        tracing::debug!("Created node {id} ({name}) at {key}");
        key
    }

    /// Destroy a node.
    ///
    /// Listeners first receive [`GraphEvent::Destructing`]. Children of a
    /// container are destroyed next, then every neighbor drops its
    /// reciprocal link, including one-sided links the node never listed,
    /// and the node leaves its owner. Returns the detached
    /// node, or `None` if the handle was stale.
    pub fn remove_node(&mut self, key: NodeKey) -> Option<Node> {
        let id = self.nodes.get(key)?.id;
        self.fire(key, GraphEvent::Destructing { node: key, id });

        let children: Vec<NodeKey> = self
            .nodes
            .get(key)
            .map(|node| node.children().collect())
            .unwrap_or_default();
        for child in children {
            self.remove_node(child);
        }

        self.disconnect_node(key);
        self.purge_links(key);
        if let Some(owner) = self.nodes.get(key).and_then(|node| node.owner) {
            self.detach_child(owner, key);
        }

        let node = self.nodes.remove(key)?;
        tracing::debug!("Destroyed node {id} ({})", node.name);
        Some(node)
    }

    /// Get a node by handle
    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    /// Whether the handle names a live node
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains(key)
    }

    /// Resolve an id to a handle
    pub fn key_of(&self, id: NodeId) -> Option<NodeKey> {
        self.nodes
            .iter()
            .find_map(|(key, node)| (node.id == id).then_some(key))
    }

    /// Get all nodes in slot order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeKey, &Node)> {
        self.nodes.iter()
    }

    /// Get all node handles in slot order
    pub fn node_keys(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.nodes.iter().map(|(key, _)| key)
    }

    /// Get the number of live nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Change a node's description
    pub fn set_description(&mut self, key: NodeKey, description: impl Into<String>) -> bool {
        match self.nodes.get_mut(key) {
            Some(node) => {
                node.description = description.into();
                true
            }
            None => false,
        }
    }

    /// Register a listener on a node
    pub fn add_listener(
        &mut self,
        key: NodeKey,
        listener: impl Listener + 'static,
    ) -> Option<ListenerId> {
        let node = self.nodes.get_mut(key)?;
        Some(node.listeners.add(Box::new(listener)))
    }

    /// Unregister a listener
    pub fn remove_listener(&mut self, key: NodeKey, id: ListenerId) -> bool {
        self.nodes
            .get_mut(key)
            .is_some_and(|node| node.listeners.remove(id))
    }

    pub(crate) fn node_ref(&self, key: NodeKey) -> Result<&Node> {
        self.nodes.get(key).ok_or(ConnectError::UnknownNode(key))
    }

    pub(crate) fn node_mut(&mut self, key: NodeKey) -> Result<&mut Node> {
        self.nodes.get_mut(key).ok_or(ConnectError::UnknownNode(key))
    }

    /// Deliver an event to a node's listeners.
    pub(crate) fn fire(&mut self, key: NodeKey, event: GraphEvent) {
        if !self.config.emit_events {
            return;
        }
        if let Some(node) = self.nodes.get_mut(key) {
            node.listeners.deliver(&event);
        }
    }

    pub(crate) fn fire_connection(
        &mut self,
        key: NodeKey,
        kind: ChangeKind,
        direction: Direction,
        new_neighbors: Vec<Option<NodeKey>>,
        old_neighbors: Vec<Option<NodeKey>>,
    ) {
        let Some(node_id) = self.nodes.get(key).map(|node| node.id) else {
            return;
        };
        self.fire(
            key,
            GraphEvent::ConnectionChanged(ConnectionEvent {
                node: key,
                node_id,
                kind,
                direction,
                new_neighbors,
                old_neighbors,
            }),
        );
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

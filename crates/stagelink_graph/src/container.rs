// SPDX-License-Identifier: MIT OR Apache-2.0
//! Container nodes and child ownership.
//!
//! A container owns its children: destroying it destroys them. A child's
//! `owner` is only a back-reference used for escalation.

use crate::error::{ConnectError, Result};
use crate::graph::Graph;
use crate::id::{NodeId, NodeKey};
use crate::visitor::{SearchVisitor, Selector, VisitMask};

impl Graph {
    /// Make `child` a child of `container`.
    ///
    /// A child owned elsewhere moves over. Returns `false` if it already
    /// belonged to `container`.
    pub fn add_child(&mut self, container: NodeKey, child: NodeKey) -> Result<bool> {
        if !self.node_ref(container)?.is_container() {
            return Err(ConnectError::NotAContainer(container));
        }
        let child_node = self.node_ref(child)?;
        let child_id = child_node.id();
        let previous = child_node.owner();
        if previous == Some(container) {
            return Ok(false);
        }
        if self.owns(child, container) {
            return Err(ConnectError::OwnershipCycle { container, child });
        }

        if let Some(previous) = previous {
            self.detach_child(previous, child);
        }
        if let Some(children) = self.node_mut(container)?.children.as_mut() {
            children.insert(child_id, child);
        }
        self.node_mut(child)?.owner = Some(container);
        tracing::debug!("Added {child} to container {container}");
        Ok(true)
    }

    /// Release `child` from `container` without destroying it
    pub fn remove_child(&mut self, container: NodeKey, child: NodeKey) -> Result<bool> {
        let node = self.node_ref(container)?;
        if !node.is_container() {
            return Err(ConnectError::NotAContainer(container));
        }
        if self.nodes.get(child).and_then(|child| child.owner()) != Some(container) {
            return Ok(false);
        }
        self.detach_child(container, child);
        tracing::debug!("Removed {child} from container {container}");
        Ok(true)
    }

    /// Direct children of `container`, in insertion order
    pub fn children(&self, container: NodeKey) -> Vec<NodeKey> {
        self.nodes
            .get(container)
            .map(|node| node.children().collect())
            .unwrap_or_default()
    }

    /// Number of children, optionally counting nested ones too
    pub fn child_count(&self, container: NodeKey, recurse: bool) -> usize {
        let children = self.children(container);
        if !recurse {
            return children.len();
        }
        children.len()
            + children
                .iter()
                .map(|&child| self.child_count(child, true))
                .sum::<usize>()
    }

    /// Find a child by id, optionally searching nested containers
    pub fn find_child(&self, container: NodeKey, id: NodeId, recurse: bool) -> Option<NodeKey> {
        if !recurse {
            let children = self.nodes.get(container)?.children.as_ref()?;
            return children.get(&id).copied();
        }
        let mut search = SearchVisitor::new(Selector::Id(id), VisitMask::CHILDREN)
            .first_only()
            .excluding(container);
        self.accept(container, &mut search);
        search.first()
    }

    /// Enclosing container of `node`
    pub fn owner(&self, node: NodeKey) -> Option<NodeKey> {
        self.nodes.get(node)?.owner()
    }

    /// Whether `ancestor` is `node` or one of its owners
    fn owns(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        let mut current = Some(node);
        while let Some(key) = current {
            if key == ancestor {
                return true;
            }
            current = self.owner(key);
        }
        false
    }

    pub(crate) fn detach_child(&mut self, container: NodeKey, child: NodeKey) {
        let Some(id) = self.nodes.get(child).map(|node| node.id()) else {
            return;
        };
        if let Some(children) = self.nodes.get_mut(container).and_then(|node| node.children.as_mut()) {
            children.shift_remove(&id);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.owner = None;
        }
    }
}

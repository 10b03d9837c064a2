// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cycle-safe depth-first traversal.
//!
//! Every search in the crate is a [`SearchVisitor`] configuration driven by
//! [`Graph::accept`]. The walk keeps a per-run visited set, so cyclic
//! pipelines terminate, and descends into neighbors in a fixed order:
//! inputs, outputs, children, then the owner when escalation applies.

use crate::graph::Graph;
use crate::id::{NodeId, NodeKey};
use crate::node::{Node, StageKind};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Which links a traversal follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct VisitMask(u8);

impl VisitMask {
    /// Follow nothing; only the start node is visited
    pub const NONE: Self = Self(0);
    /// Follow input links
    pub const INPUTS: Self = Self(1);
    /// Follow output links
    pub const OUTPUTS: Self = Self(1 << 1);
    /// Descend into a container's children
    pub const CHILDREN: Self = Self(1 << 2);
    /// Escalate to the enclosing container
    pub const OWNER: Self = Self(1 << 3);
    /// Both port sides
    pub const ALL_PORTS: Self = Self(Self::INPUTS.0 | Self::OUTPUTS.0);
    /// Every link kind
    pub const ALL: Self = Self(Self::ALL_PORTS.0 | Self::CHILDREN.0 | Self::OWNER.0);

    /// Whether every bit of `other` is set
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any bit of `other` is set
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Bits set in either mask
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Bits of `self` not set in `other`
    pub fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Whether no bit is set
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for VisitMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for VisitMask {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl BitAnd for VisitMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// When a traversal with [`VisitMask::OWNER`] steps up to the owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EscalationPolicy {
    /// Only once the node is fully connected on the traversed sides
    #[default]
    WhenSaturated,
    /// After every node that has an owner
    Always,
}

/// Which nodes a search reports
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selector {
    /// Every visited node
    #[default]
    Any,
    /// Nodes of one kind
    Kind(StageKind),
    /// Nodes with a given type name
    Name(String),
    /// The node with a given id
    Id(NodeId),
}

impl Selector {
    /// Whether `node` is selected
    pub fn matches(&self, node: &Node) -> bool {
        match self {
            Self::Any => true,
            Self::Kind(kind) => node.kind() == kind,
            Self::Name(name) => node.name() == name,
            Self::Id(id) => node.id() == *id,
        }
    }
}

/// A traversal participant
pub trait Visitor {
    /// Links to follow from each visited node
    fn mask(&self) -> VisitMask;

    /// Escalation policy for [`VisitMask::OWNER`]
    fn escalation(&self) -> EscalationPolicy {
        EscalationPolicy::default()
    }

    /// Called once per reachable node
    fn visit(&mut self, graph: &Graph, key: NodeKey, node: &Node);

    /// Checked before each descent; once true the walk stops
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Collects nodes matching a [`Selector`]
#[derive(Debug, Clone)]
pub struct SearchVisitor {
    selector: Selector,
    mask: VisitMask,
    escalation: EscalationPolicy,
    first_only: bool,
    cancelled: bool,
    skip: Option<NodeKey>,
    matches: Vec<NodeKey>,
}

impl SearchVisitor {
    /// Create a search collecting every match
    pub fn new(selector: Selector, mask: VisitMask) -> Self {
        Self {
            selector,
            mask,
            escalation: EscalationPolicy::default(),
            first_only: false,
            cancelled: false,
            skip: None,
            matches: Vec::new(),
        }
    }

    /// Stop at the first match
    pub fn first_only(mut self) -> Self {
        self.first_only = true;
        self
    }

    /// Use a specific escalation policy
    pub fn with_escalation(mut self, escalation: EscalationPolicy) -> Self {
        self.escalation = escalation;
        self
    }

    /// Never report `key`, though it is still walked through
    pub fn excluding(mut self, key: NodeKey) -> Self {
        self.skip = Some(key);
        self
    }

    /// Stop the walk before the next descent
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// Matches in visit order
    pub fn matches(&self) -> &[NodeKey] {
        &self.matches
    }

    /// First match, if any
    pub fn first(&self) -> Option<NodeKey> {
        self.matches.first().copied()
    }

    /// Take the matches
    pub fn into_matches(self) -> Vec<NodeKey> {
        self.matches
    }

    /// Clear matches and cancellation so the search can run again
    pub fn reset(&mut self) {
        self.matches.clear();
        self.cancelled = false;
    }
}

impl Visitor for SearchVisitor {
    fn mask(&self) -> VisitMask {
        self.mask
    }

    fn escalation(&self) -> EscalationPolicy {
        self.escalation
    }

    fn visit(&mut self, _graph: &Graph, key: NodeKey, node: &Node) {
        if self.skip == Some(key) || !self.selector.matches(node) {
            return;
        }
        self.matches.push(key);
        if self.first_only {
            self.cancelled = true;
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl Graph {
    /// Walk the graph from `start`, calling `visitor` once per reachable node.
    ///
    /// Returns the number of nodes visited. A stale `start` visits nothing.
    pub fn accept(&self, start: NodeKey, visitor: &mut dyn Visitor) -> usize {
        let mask = visitor.mask();
        let escalation = visitor.escalation();
        let mut visited: IndexSet<NodeKey> = IndexSet::new();
        let mut stack = vec![start];
        let mut next = Vec::new();

        while let Some(key) = stack.pop() {
            if visitor.is_cancelled() {
                break;
            }
            if visited.contains(&key) {
                continue;
            }
            let Some(node) = self.nodes.get(key) else {
                continue;
            };
            visited.insert(key);
            if self.config.trace_traversal {
                tracing::trace!("Visiting {} ({}) at {key}", node.id(), node.name());
            }
            visitor.visit(self, key, node);
            if visitor.is_cancelled() {
                break;
            }

            next.clear();
            if mask.contains(VisitMask::INPUTS) {
                next.extend(node.inputs().neighbors());
            }
            if mask.contains(VisitMask::OUTPUTS) {
                next.extend(node.outputs().neighbors());
            }
            if mask.contains(VisitMask::CHILDREN) {
                next.extend(node.children());
            }
            if mask.contains(VisitMask::OWNER) {
                if let Some(owner) = node.owner() {
                    if should_escalate(node, mask, escalation) {
                        next.push(owner);
                    }
                }
            }
            stack.extend(next.iter().rev().filter(|key| !visited.contains(*key)));
        }

        visited.len()
    }
}

fn should_escalate(node: &Node, mask: VisitMask, escalation: EscalationPolicy) -> bool {
    match escalation {
        EscalationPolicy::Always => true,
        EscalationPolicy::WhenSaturated => {
            let sides = mask & VisitMask::ALL_PORTS;
            sides.is_empty() || node.is_connected(sides)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::AcceptAll;
    use crate::node::NodeOptions;

    fn stage(graph: &mut Graph, name: &str, kind: StageKind) -> NodeKey {
        graph.add_node(NodeOptions::new(name, kind), AcceptAll)
    }

    /// reader -> filter -> writer
    fn chain(graph: &mut Graph) -> [NodeKey; 3] {
        let reader = stage(graph, "reader", StageKind::Reader);
        let filter = stage(graph, "filter", StageKind::Filter);
        let writer = stage(graph, "writer", StageKind::Writer);
        graph.connect_output(reader, filter).unwrap();
        graph.connect_output(filter, writer).unwrap();
        [reader, filter, writer]
    }

    #[test]
    fn test_mask_ops() {
        let mask = VisitMask::INPUTS | VisitMask::OWNER;
        assert!(mask.contains(VisitMask::INPUTS));
        assert!(!mask.contains(VisitMask::ALL_PORTS));
        assert!(mask.intersects(VisitMask::ALL_PORTS));
        assert_eq!(mask.without(VisitMask::OWNER), VisitMask::INPUTS);
        assert!(VisitMask::default().is_empty());
    }

    #[test]
    fn test_preorder_visit() {
        let mut graph = Graph::new();
        let [reader, filter, writer] = chain(&mut graph);

        let mut search = SearchVisitor::new(Selector::Any, VisitMask::OUTPUTS);
        assert_eq!(graph.accept(reader, &mut search), 3);
        assert_eq!(search.matches(), &[reader, filter, writer]);

        let mut upstream = SearchVisitor::new(Selector::Any, VisitMask::INPUTS);
        graph.accept(filter, &mut upstream);
        assert_eq!(upstream.matches(), &[filter, reader]);
    }

    #[test]
    fn test_first_only_cancels() {
        let mut graph = Graph::new();
        let [reader, filter, _] = chain(&mut graph);
        let second = stage(&mut graph, "filter", StageKind::Filter);
        graph.connect_output(reader, second).unwrap();

        let mut search =
            SearchVisitor::new(Selector::Kind(StageKind::Filter), VisitMask::OUTPUTS).first_only();
        let visited = graph.accept(reader, &mut search);
        assert_eq!(search.matches(), &[filter]);
        assert_eq!(visited, 2);
    }

    #[test]
    fn test_cycle_terminates() {
        let mut graph = Graph::new();
        let a = stage(&mut graph, "a", StageKind::Filter);
        let b = stage(&mut graph, "b", StageKind::Filter);
        graph.connect_output(a, b).unwrap();
        graph.connect_output(b, a).unwrap();

        let mut search = SearchVisitor::new(Selector::Any, VisitMask::ALL);
        assert_eq!(graph.accept(a, &mut search), 2);
        assert_eq!(search.matches(), &[a, b]);
    }

    #[test]
    fn test_excluding_start() {
        let mut graph = Graph::new();
        let [reader, filter, _] = chain(&mut graph);
        let mut search = SearchVisitor::new(Selector::Any, VisitMask::INPUTS).excluding(filter);
        graph.accept(filter, &mut search);
        assert_eq!(search.into_matches(), vec![reader]);
    }

    #[test]
    fn test_selectors() {
        let mut graph = Graph::new();
        let [reader, _, writer] = chain(&mut graph);
        let writer_id = graph.node(writer).unwrap().id();

        let mut by_name = SearchVisitor::new(Selector::Name("writer".into()), VisitMask::OUTPUTS);
        graph.accept(reader, &mut by_name);
        assert_eq!(by_name.first(), Some(writer));

        let mut by_id = SearchVisitor::new(Selector::Id(writer_id), VisitMask::OUTPUTS);
        graph.accept(reader, &mut by_id);
        assert_eq!(by_id.first(), Some(writer));

        by_id.reset();
        assert!(by_id.matches().is_empty());
    }

    #[test]
    fn test_custom_visitor_cancels() {
        struct CountTo(usize, usize);
        impl Visitor for CountTo {
            fn mask(&self) -> VisitMask {
                VisitMask::OUTPUTS
            }
            fn visit(&mut self, _: &Graph, _: NodeKey, _: &Node) {
                self.0 += 1;
            }
            fn is_cancelled(&self) -> bool {
                self.0 >= self.1
            }
        }

        let mut graph = Graph::new();
        let [reader, ..] = chain(&mut graph);
        let mut visitor = CountTo(0, 2);
        assert_eq!(graph.accept(reader, &mut visitor), 2);
    }

    #[test]
    fn test_stale_start() {
        let mut graph = Graph::new();
        let a = stage(&mut graph, "a", StageKind::Filter);
        graph.remove_node(a);
        let mut search = SearchVisitor::new(Selector::Any, VisitMask::ALL);
        assert_eq!(graph.accept(a, &mut search), 0);
    }
}

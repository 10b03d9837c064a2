// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the connectable graph.

use crate::capability::Capability;
use crate::event::ListenerSet;
use crate::id::{NodeId, NodeKey};
use crate::port::{Direction, PortList};
use crate::visitor::VisitMask;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type tag of a processing stage
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageKind {
    /// Produces data from nothing (generators, constants)
    Source,
    /// Reads data from an external location
    Reader,
    /// Encodes or decodes a format
    Codec,
    /// One-to-one transform
    Filter,
    /// Merges several inputs
    Combiner,
    /// Classification or clustering stage
    Classifier,
    /// Writes data to an external location
    Writer,
    /// Owns a sub-pipeline of child nodes
    Container,
    /// Custom/user-defined
    Custom(String),
}

impl StageKind {
    /// Short label for logs
    pub fn label(&self) -> &str {
        match self {
            Self::Source => "source",
            Self::Reader => "reader",
            Self::Codec => "codec",
            Self::Filter => "filter",
            Self::Combiner => "combiner",
            Self::Classifier => "classifier",
            Self::Writer => "writer",
            Self::Container => "container",
            Self::Custom(name) => name,
        }
    }
}

/// Construction parameters for a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeOptions {
    /// Type name matched by name selectors
    pub name: String,
    /// Type tag matched by kind selectors
    pub kind: StageKind,
    /// Free-form description
    pub description: String,
    /// Initial number of input slots
    pub input_count: usize,
    /// Initial number of output slots
    pub output_count: usize,
    /// Whether the input list length is fixed
    pub inputs_fixed: bool,
    /// Whether the output list length is fixed
    pub outputs_fixed: bool,
    /// Whether the node can own children
    pub container: bool,
}

impl NodeOptions {
    /// Options for a plain node with empty, growable port lists
    pub fn new(name: impl Into<String>, kind: StageKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: String::new(),
            input_count: 0,
            output_count: 0,
            inputs_fixed: false,
            outputs_fixed: false,
            container: false,
        }
    }

    /// Options for a container with no ports of its own
    pub fn container(name: impl Into<String>) -> Self {
        Self {
            inputs_fixed: true,
            outputs_fixed: true,
            container: true,
            ..Self::new(name, StageKind::Container)
        }
    }

    /// Set the input list layout
    pub fn with_inputs(mut self, count: usize, fixed: bool) -> Self {
        self.input_count = count;
        self.inputs_fixed = fixed;
        self
    }

    /// Set the output list layout
    pub fn with_outputs(mut self, count: usize, fixed: bool) -> Self {
        self.output_count = count;
        self.outputs_fixed = fixed;
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A node in the graph
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) kind: StageKind,
    pub(crate) description: String,
    pub(crate) inputs: PortList,
    pub(crate) outputs: PortList,
    pub(crate) owner: Option<NodeKey>,
    /// Present only on containers, keyed by child id
    pub(crate) children: Option<IndexMap<NodeId, NodeKey>>,
    pub(crate) capability: Box<dyn Capability>,
    pub(crate) listeners: ListenerSet,
}

impl Node {
    pub(crate) fn new(options: NodeOptions, capability: Box<dyn Capability>) -> Self {
        Self {
            id: NodeId::generate(),
            name: options.name,
            kind: options.kind,
            description: options.description,
            inputs: PortList::new(options.input_count, options.inputs_fixed),
            outputs: PortList::new(options.output_count, options.outputs_fixed),
            owner: None,
            children: options.container.then(IndexMap::new),
            capability,
            listeners: ListenerSet::default(),
        }
    }

    /// Process-unique id
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type tag
    pub fn kind(&self) -> &StageKind {
        &self.kind
    }

    /// Description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Input port list
    pub fn inputs(&self) -> &PortList {
        &self.inputs
    }

    /// Output port list
    pub fn outputs(&self) -> &PortList {
        &self.outputs
    }

    /// Port list on the given side
    pub fn ports(&self, direction: Direction) -> &PortList {
        match direction {
            Direction::Input => &self.inputs,
            Direction::Output => &self.outputs,
        }
    }

    pub(crate) fn ports_mut(&mut self, direction: Direction) -> &mut PortList {
        match direction {
            Direction::Input => &mut self.inputs,
            Direction::Output => &mut self.outputs,
        }
    }

    /// Number of input slots
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Number of output slots
    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Neighbor connected at an input index
    pub fn input(&self, index: usize) -> Option<NodeKey> {
        self.inputs.get(index)
    }

    /// Neighbor connected at an output index
    pub fn output(&self, index: usize) -> Option<NodeKey> {
        self.outputs.get(index)
    }

    /// Enclosing container, if any
    pub fn owner(&self) -> Option<NodeKey> {
        self.owner
    }

    /// Whether this node can own children
    pub fn is_container(&self) -> bool {
        self.children.is_some()
    }

    /// Direct children, in insertion order. Empty for non-containers.
    pub fn children(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.children.iter().flat_map(|children| children.values().copied())
    }

    /// Whether every slot on the sides in `mask` is occupied.
    ///
    /// An empty growable input list counts as not connected: such a stage
    /// still waits for its first input.
    pub fn is_connected(&self, mask: VisitMask) -> bool {
        if mask.contains(VisitMask::INPUTS) {
            if self.inputs.is_empty() && !self.inputs.is_fixed() {
                return false;
            }
            if !self.inputs.is_saturated() {
                return false;
            }
        }
        !mask.contains(VisitMask::OUTPUTS) || self.outputs.is_saturated()
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Ask this node's capability whether `candidate` may occupy `index`.
    pub(crate) fn accepts(&self, direction: Direction, index: usize, candidate: &Node) -> bool {
        match direction {
            Direction::Input => self.capability.can_accept_input_at(self, index, candidate),
            Direction::Output => self.capability.can_accept_output_at(self, index, candidate),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("owner", &self.owner)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

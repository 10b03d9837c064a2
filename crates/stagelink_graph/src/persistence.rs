// SPDX-License-Identifier: MIT OR Apache-2.0
//! Serializable node records for external persistence.
//!
//! The graph exposes what a serializer needs and nothing more: ids,
//! descriptive fields, list fixedness and per-slot neighbor ids. Choosing
//! a file format is up to the caller.

use crate::capability::Capability;
use crate::connection::ConnectOptions;
use crate::error::ConnectError;
use crate::graph::Graph;
use crate::id::{NodeId, NodeKey};
use crate::node::{NodeOptions, StageKind};
use crate::port::Direction;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Persistent state of one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Id at the time of recording
    pub id: NodeId,
    /// Type name
    pub name: String,
    /// Type tag
    pub kind: StageKind,
    /// Description
    pub description: String,
    /// Whether the input list length is fixed
    pub input_list_fixed: bool,
    /// Whether the output list length is fixed
    pub output_list_fixed: bool,
    /// Whether the node owns children
    #[serde(default)]
    pub container: bool,
    /// Enclosing container
    #[serde(default)]
    pub owner: Option<NodeId>,
    /// Input neighbor ids by slot; `None` marks an empty slot
    pub inputs: Vec<Option<NodeId>>,
    /// Output neighbor ids by slot; `None` marks an empty slot
    pub outputs: Vec<Option<NodeId>>,
}

impl NodeRecord {
    fn options(&self) -> NodeOptions {
        NodeOptions {
            name: self.name.clone(),
            kind: self.kind.clone(),
            description: self.description.clone(),
            input_count: self.inputs.len(),
            output_count: self.outputs.len(),
            inputs_fixed: self.input_list_fixed,
            outputs_fixed: self.output_list_fixed,
            container: self.container,
        }
    }

    fn references(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.inputs
            .iter()
            .chain(&self.outputs)
            .flatten()
            .copied()
            .chain(self.owner)
    }
}

/// Records of every node in a graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Node records in storage order
    pub nodes: Vec<NodeRecord>,
}

impl Graph {
    /// Record one node
    pub fn record(&self, key: NodeKey) -> Option<NodeRecord> {
        let node = self.nodes.get(key)?;
        let ids = |slots: &[Option<NodeKey>]| -> Vec<Option<NodeId>> {
            slots
                .iter()
                .map(|slot| slot.and_then(|key| self.nodes.get(key)).map(|n| n.id()))
                .collect()
        };
        Some(NodeRecord {
            id: node.id(),
            name: node.name().to_string(),
            kind: node.kind().clone(),
            description: node.description().to_string(),
            input_list_fixed: node.inputs().is_fixed(),
            output_list_fixed: node.outputs().is_fixed(),
            container: node.is_container(),
            owner: node.owner().and_then(|owner| self.nodes.get(owner)).map(|n| n.id()),
            inputs: ids(node.inputs().slots()),
            outputs: ids(node.outputs().slots()),
        })
    }

    /// Record every node
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.node_keys().filter_map(|key| self.record(key)).collect(),
        }
    }

    /// Rebuild the nodes of `snapshot` in this graph.
    ///
    /// `factory` supplies each node's capability. Restored nodes get fresh
    /// ids; the returned map goes from recorded id to new handle. Slots are
    /// filled exactly as recorded, without events. On error every node
    /// created so far is removed again.
    pub fn restore<F>(
        &mut self,
        snapshot: &GraphSnapshot,
        mut factory: F,
    ) -> Result<IndexMap<NodeId, NodeKey>, RestoreError>
    where
        F: FnMut(&NodeRecord) -> Box<dyn Capability>,
    {
        let mut known = IndexSet::new();
        for record in &snapshot.nodes {
            if !known.insert(record.id) {
                return Err(RestoreError::DuplicateId(record.id));
            }
        }
        for record in &snapshot.nodes {
            if let Some(missing) = record.references().find(|id| !known.contains(id)) {
                return Err(RestoreError::UnknownReference {
                    node: record.id,
                    missing,
                });
            }
        }

        let mut restored = IndexMap::new();
        for record in &snapshot.nodes {
            let key = self.add_node_boxed(record.options(), factory(record));
            restored.insert(record.id, key);
        }

        if let Err(err) = self.relink(snapshot, &restored) {
            for &key in restored.values() {
                self.remove_node(key);
            }
            tracing::warn!("Graph restore failed, rolled back: {err}");
            return Err(err);
        }

        tracing::debug!("Restored {} node(s)", restored.len());
        Ok(restored)
    }

    fn relink(
        &mut self,
        snapshot: &GraphSnapshot,
        restored: &IndexMap<NodeId, NodeKey>,
    ) -> Result<(), RestoreError> {
        let quiet = ConnectOptions {
            reciprocal: false,
            emit: false,
        };
        let resolve = |id: &NodeId| {
            restored.get(id).copied().ok_or(RestoreError::UnknownReference {
                node: *id,
                missing: *id,
            })
        };

        for record in &snapshot.nodes {
            let key = resolve(&record.id)?;
            for (direction, slots) in [
                (Direction::Input, &record.inputs),
                (Direction::Output, &record.outputs),
            ] {
                for (index, id) in slots.iter().enumerate() {
                    if let Some(id) = id {
                        self.connect_port_at(key, direction, index, resolve(id)?, quiet)?;
                    }
                }
            }
            if let Some(owner) = &record.owner {
                self.add_child(resolve(owner)?, key)?;
            }
        }
        Ok(())
    }
}

/// Snapshot restore errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RestoreError {
    /// Two records share an id
    #[error("Duplicate node id in snapshot: {0}")]
    DuplicateId(NodeId),

    /// A record names a node that is not in the snapshot
    #[error("Node {node} references {missing}, which is not in the snapshot")]
    UnknownReference {
        /// Record holding the reference
        node: NodeId,
        /// Id that could not be resolved
        missing: NodeId,
    },

    /// Relinking was refused
    #[error(transparent)]
    Connect(#[from] ConnectError),
}

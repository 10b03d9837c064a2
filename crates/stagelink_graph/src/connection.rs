// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection protocol: keeps input and output lists cross-consistent.
//!
//! Every operation validates first and mutates second. A refused call
//! leaves all port lists as they were, and a bidirectional connect links
//! both sides or neither. Events are delivered only after every touched
//! list holds its final state, initiating node first.

use crate::error::{ConnectError, Result};
use crate::event::ChangeKind;
use crate::graph::Graph;
use crate::id::{NodeId, NodeKey};
use crate::node::Node;
use crate::port::Direction;
use crate::visitor::VisitMask;
use indexmap::IndexSet;

/// How a connect or disconnect treats the far side of the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Also update the neighbor's opposite list
    pub reciprocal: bool,
    /// Deliver change events
    pub emit: bool,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            reciprocal: true,
            emit: true,
        }
    }
}

impl ConnectOptions {
    /// Touch only the initiating node's list
    pub fn one_sided() -> Self {
        Self {
            reciprocal: false,
            emit: true,
        }
    }

    /// Link both sides without delivering events
    pub fn silent() -> Self {
        Self {
            reciprocal: true,
            emit: false,
        }
    }
}

struct Change {
    node: NodeKey,
    kind: ChangeKind,
    direction: Direction,
    new: Vec<Option<NodeKey>>,
    old: Vec<Option<NodeKey>>,
}

/// Events gathered while mutating, delivered once everything is in place
#[derive(Default)]
struct Changes(Vec<Change>);

impl Changes {
    fn push(
        &mut self,
        node: NodeKey,
        kind: ChangeKind,
        direction: Direction,
        new: Vec<Option<NodeKey>>,
        old: Vec<Option<NodeKey>>,
    ) {
        self.0.push(Change {
            node,
            kind,
            direction,
            new,
            old,
        });
    }
}

/// First empty slot the node accepts `candidate` at, else an append slot
/// on a growable list.
fn select_slot(node: &Node, direction: Direction, candidate: &Node) -> Result<usize> {
    let list = node.ports(direction);
    let free = list
        .slots()
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.is_none())
        .map(|(index, _)| index);
    for index in free {
        if node.accepts(direction, index, candidate) {
            return Ok(index);
        }
    }

    if !list.is_fixed() && node.accepts(direction, list.len(), candidate) {
        return Ok(list.len());
    }
    if list.is_fixed() && list.is_saturated() {
        return Err(ConnectError::NoFreeSlot { direction });
    }
    Err(ConnectError::CapabilityRejected { direction })
}

/// Where `candidate` would hold the back-link to `node`. `None` when it
/// already does.
fn plan_reciprocal(
    candidate: &Node,
    direction: Direction,
    node_key: NodeKey,
    node: &Node,
) -> Result<Option<usize>> {
    let side = direction.opposite();
    if candidate.ports(side).contains(node_key) {
        return Ok(None);
    }
    select_slot(candidate, side, node).map(Some)
}

impl Graph {
    /// Connect `candidate` to a free slot on one side of `node`.
    ///
    /// Returns the slot index. A candidate already on that side is left
    /// where it is and its index returned, without events.
    pub fn connect_port(
        &mut self,
        node: NodeKey,
        direction: Direction,
        candidate: NodeKey,
        options: ConnectOptions,
    ) -> Result<usize> {
        let this = self.node_ref(node)?;
        let other = self.node_ref(candidate)?;
        if let Some(index) = this.ports(direction).position(candidate) {
            return Ok(index);
        }

        let index = select_slot(this, direction, other).inspect_err(|err| {
            tracing::debug!("Refused {direction} connect of {candidate} to {node}: {err}");
        })?;
        let reciprocal = if options.reciprocal {
            plan_reciprocal(other, direction, node, this)?
        } else {
            None
        };

        let mut changes = Changes::default();
        changes.push(node, ChangeKind::Connect, direction, vec![Some(candidate)], Vec::new());
        self.link(node, direction, index, candidate, reciprocal, &mut changes)?;
        self.commit(changes, options.emit);
        tracing::debug!("Connected {candidate} to {direction} {index} of {node}");
        Ok(index)
    }

    /// Connect `candidate` at a specific slot.
    ///
    /// Fails with [`ConnectError::SlotOccupied`] if another neighbor holds
    /// the slot; use [`Graph::replace_port_at`] to swap it out. Growable
    /// lists accept `index == len`, which appends.
    pub fn connect_port_at(
        &mut self,
        node: NodeKey,
        direction: Direction,
        index: usize,
        candidate: NodeKey,
        options: ConnectOptions,
    ) -> Result<usize> {
        let this = self.node_ref(node)?;
        let other = self.node_ref(candidate)?;
        let list = this.ports(direction);
        if let Some(existing) = list.position(candidate) {
            return Ok(existing);
        }
        if !list.accepts_index(index) {
            return Err(ConnectError::InvalidIndex {
                direction,
                index,
                len: list.len(),
            });
        }
        if let Some(occupant) = list.get(index) {
            tracing::warn!(
                "{direction} {index} of {node} holds {occupant}, disconnect it first"
            );
            return Err(ConnectError::SlotOccupied { direction, index });
        }
        if !this.accepts(direction, index, other) {
            return Err(ConnectError::CapabilityRejected { direction });
        }
        let reciprocal = if options.reciprocal {
            plan_reciprocal(other, direction, node, this)?
        } else {
            None
        };

        let mut changes = Changes::default();
        changes.push(node, ChangeKind::Connect, direction, vec![Some(candidate)], Vec::new());
        self.link(node, direction, index, candidate, reciprocal, &mut changes)?;
        self.commit(changes, options.emit);
        tracing::debug!("Connected {candidate} to {direction} {index} of {node}");
        Ok(index)
    }

    /// Put `candidate` at `index`, displacing the current occupant.
    ///
    /// The occupant loses its back-link and the candidate gains one in the
    /// same step, with one event on `node` carrying both. Returns the
    /// displaced neighbor.
    pub fn replace_port_at(
        &mut self,
        node: NodeKey,
        direction: Direction,
        index: usize,
        candidate: NodeKey,
        options: ConnectOptions,
    ) -> Result<Option<NodeKey>> {
        let this = self.node_ref(node)?;
        let other = self.node_ref(candidate)?;
        let list = this.ports(direction);
        match list.position(candidate) {
            Some(existing) if existing == index => return Ok(None),
            Some(existing) => {
                return Err(ConnectError::AlreadyConnected {
                    direction,
                    index: existing,
                })
            }
            None => {}
        }
        if !list.accepts_index(index) {
            return Err(ConnectError::InvalidIndex {
                direction,
                index,
                len: list.len(),
            });
        }
        if !this.accepts(direction, index, other) {
            return Err(ConnectError::CapabilityRejected { direction });
        }
        let previous = list.get(index);
        let reciprocal = if options.reciprocal {
            plan_reciprocal(other, direction, node, this)?
        } else {
            None
        };

        let mut changes = Changes::default();
        changes.push(
            node,
            ChangeKind::Connect,
            direction,
            vec![Some(candidate)],
            vec![previous],
        );
        if let (Some(previous), true) = (previous, options.reciprocal) {
            self.unlink_reciprocal(previous, direction.opposite(), node, &mut changes);
        }
        self.link(node, direction, index, candidate, reciprocal, &mut changes)?;
        self.commit(changes, options.emit);
        tracing::debug!("Replaced {direction} {index} of {node} with {candidate}");
        Ok(previous)
    }

    /// Disconnect the neighbor at `index`. Returns it, or `None` if the
    /// slot was empty or out of range.
    pub fn disconnect_port(
        &mut self,
        node: NodeKey,
        direction: Direction,
        index: usize,
        options: ConnectOptions,
    ) -> Option<NodeKey> {
        let list = self.nodes.get_mut(node)?.ports_mut(direction);
        let neighbor = list.get(index)?;
        list.vacate(index);
        self.finish_disconnect(node, direction, vec![neighbor], options);
        Some(neighbor)
    }

    /// Disconnect several neighbors at once, with a single event on `node`.
    /// Returns those that were actually connected.
    pub fn disconnect_ports(
        &mut self,
        node: NodeKey,
        direction: Direction,
        neighbors: &[NodeKey],
        options: ConnectOptions,
    ) -> Vec<NodeKey> {
        let Some(this) = self.nodes.get_mut(node) else {
            return Vec::new();
        };
        let list = this.ports_mut(direction);
        let mut removed = Vec::new();
        for &neighbor in neighbors {
            if let Some(index) = list.position(neighbor) {
                list.vacate(index);
                removed.push(neighbor);
            }
        }
        self.finish_disconnect(node, direction, removed.clone(), options);
        removed
    }

    /// Disconnect everything on one side of `node`
    pub fn disconnect_all_ports(
        &mut self,
        node: NodeKey,
        direction: Direction,
        options: ConnectOptions,
    ) -> Vec<NodeKey> {
        let Some(this) = self.nodes.get_mut(node) else {
            return Vec::new();
        };
        let removed: Vec<NodeKey> = this.ports_mut(direction).clear().into_iter().flatten().collect();
        self.finish_disconnect(node, direction, removed.clone(), options);
        removed
    }

    /// Resize one side of `node`. Neighbors in trimmed slots are
    /// disconnected as one batch and returned.
    ///
    /// Any length change fires one event: a `Disconnect` listing the
    /// trimmed neighbors, or a `Connect` carrying the old and new layouts
    /// when no neighbor was lost.
    pub fn set_number_of_ports(
        &mut self,
        node: NodeKey,
        direction: Direction,
        count: usize,
        options: ConnectOptions,
    ) -> Result<Vec<NodeKey>> {
        let list = self.node_mut(node)?.ports_mut(direction);
        let old = list.slots().to_vec();
        if old.len() == count {
            return Ok(Vec::new());
        }
        let trimmed = list.resize(count);
        let new = list.slots().to_vec();
        tracing::debug!("Resized {direction} list of {node} to {count}");

        if trimmed.is_empty() {
            let mut changes = Changes::default();
            changes.push(node, ChangeKind::Connect, direction, new, old);
            self.commit(changes, options.emit);
        } else {
            self.finish_disconnect(node, direction, trimmed.clone(), options);
        }
        Ok(trimmed)
    }

    /// Replace one side of `node` with `slots` in a single step.
    ///
    /// Every entry is validated before anything changes. A fixed list keeps
    /// its length: shorter input is padded with empty slots, longer input
    /// is refused. Neighbors dropped from the list lose their back-link,
    /// new ones gain one.
    pub fn connect_port_list(
        &mut self,
        node: NodeKey,
        direction: Direction,
        slots: Vec<Option<NodeKey>>,
        options: ConnectOptions,
    ) -> Result<()> {
        let mut slots = slots;
        let this = self.node_ref(node)?;
        let current = this.ports(direction);
        if current.is_fixed() {
            if slots.len() > current.len() {
                return Err(ConnectError::InvalidIndex {
                    direction,
                    index: current.len(),
                    len: current.len(),
                });
            }
            slots.resize(current.len(), None);
        }

        let mut wanted: IndexSet<NodeKey> = IndexSet::new();
        for (index, slot) in slots.iter().enumerate() {
            let Some(candidate) = *slot else {
                continue;
            };
            if !wanted.insert(candidate) {
                return Err(ConnectError::DuplicateNeighbor(candidate));
            }
            if !this.accepts(direction, index, self.node_ref(candidate)?) {
                return Err(ConnectError::CapabilityRejected { direction });
            }
        }

        let old = current.slots().to_vec();
        let removed: Vec<NodeKey> = current
            .neighbors()
            .filter(|neighbor| !wanted.contains(neighbor))
            .collect();
        let mut plans = Vec::new();
        if options.reciprocal {
            for &candidate in wanted.iter().filter(|key| !current.contains(**key)) {
                if let Some(slot) = plan_reciprocal(self.node_ref(candidate)?, direction, node, this)? {
                    plans.push((candidate, slot));
                }
            }
        }

        let mut changes = Changes::default();
        changes.push(node, ChangeKind::Connect, direction, slots.clone(), old);
        self.node_mut(node)?.ports_mut(direction).replace_all(slots);
        let side = direction.opposite();
        if options.reciprocal {
            for neighbor in removed {
                self.unlink_reciprocal(neighbor, side, node, &mut changes);
            }
        }
        for (candidate, slot) in plans {
            self.node_mut(candidate)?.ports_mut(side).place(slot, node);
            changes.push(candidate, ChangeKind::Connect, side, vec![Some(node)], Vec::new());
        }
        self.commit(changes, options.emit);
        tracing::debug!("Replaced {direction} list of {node}");
        Ok(())
    }

    /// Remove every link between `node` and `neighbor`, in both
    /// directions. Returns whether anything was removed.
    pub fn disconnect(&mut self, node: NodeKey, neighbor: NodeKey) -> bool {
        let input = self.disconnect_input_node(node, neighbor).is_some();
        let output = self.disconnect_output_node(node, neighbor).is_some();
        input || output
    }

    /// Disconnect all inputs and outputs of `node`
    pub fn disconnect_node(&mut self, node: NodeKey) {
        self.disconnect_all_inputs(node);
        self.disconnect_all_outputs(node);
    }

    /// Index of `neighbor` on one side of `node`
    pub fn find_index(&self, node: NodeKey, direction: Direction, neighbor: NodeKey) -> Option<usize> {
        self.nodes.get(node)?.ports(direction).position(neighbor)
    }

    /// Index of the neighbor with the given id on one side of `node`
    pub fn find_index_by_id(&self, node: NodeKey, direction: Direction, id: NodeId) -> Option<usize> {
        self.nodes
            .get(node)?
            .ports(direction)
            .slots()
            .iter()
            .position(|slot| {
                slot.and_then(|key| self.nodes.get(key))
                    .is_some_and(|neighbor| neighbor.id() == id)
            })
    }

    /// Slot a connect of `candidate` would use, without connecting
    pub fn index_to_connect_to(
        &self,
        node: NodeKey,
        direction: Direction,
        candidate: NodeKey,
    ) -> Option<usize> {
        let this = self.nodes.get(node)?;
        if let Some(index) = this.ports(direction).position(candidate) {
            return Some(index);
        }
        select_slot(this, direction, self.nodes.get(candidate)?).ok()
    }

    /// Whether every slot on the sides in `mask` is occupied. Unknown
    /// nodes are never connected.
    pub fn is_connected(&self, node: NodeKey, mask: VisitMask) -> bool {
        self.nodes.get(node).is_some_and(|node| node.is_connected(mask))
    }

    // Inputs

    /// Connect `candidate` as an input of `node`
    pub fn connect_input(&mut self, node: NodeKey, candidate: NodeKey) -> Result<usize> {
        self.connect_port(node, Direction::Input, candidate, ConnectOptions::default())
    }

    /// Connect `candidate` as an input of `node` with explicit options
    pub fn connect_input_with(
        &mut self,
        node: NodeKey,
        candidate: NodeKey,
        options: ConnectOptions,
    ) -> Result<usize> {
        self.connect_port(node, Direction::Input, candidate, options)
    }

    /// Connect `candidate` at input slot `index`
    pub fn connect_input_at(
        &mut self,
        node: NodeKey,
        index: usize,
        candidate: NodeKey,
        options: ConnectOptions,
    ) -> Result<usize> {
        self.connect_port_at(node, Direction::Input, index, candidate, options)
    }

    /// Replace the input at `index`
    pub fn replace_input_at(
        &mut self,
        node: NodeKey,
        index: usize,
        candidate: NodeKey,
        options: ConnectOptions,
    ) -> Result<Option<NodeKey>> {
        self.replace_port_at(node, Direction::Input, index, candidate, options)
    }

    /// Disconnect the input at `index`
    pub fn disconnect_input(&mut self, node: NodeKey, index: usize) -> Option<NodeKey> {
        self.disconnect_port(node, Direction::Input, index, ConnectOptions::default())
    }

    /// Disconnect `neighbor` from the inputs. Returns its former index.
    pub fn disconnect_input_node(&mut self, node: NodeKey, neighbor: NodeKey) -> Option<usize> {
        let index = self.find_input_index(node, neighbor)?;
        self.disconnect_input(node, index).map(|_| index)
    }

    /// Disconnect the input with the given id
    pub fn disconnect_input_id(&mut self, node: NodeKey, id: NodeId) -> Option<NodeKey> {
        let index = self.find_input_index_by_id(node, id)?;
        self.disconnect_input(node, index)
    }

    /// Disconnect several inputs with one event
    pub fn disconnect_inputs(&mut self, node: NodeKey, neighbors: &[NodeKey]) -> Vec<NodeKey> {
        self.disconnect_ports(node, Direction::Input, neighbors, ConnectOptions::default())
    }

    /// Disconnect every input
    pub fn disconnect_all_inputs(&mut self, node: NodeKey) -> Vec<NodeKey> {
        self.disconnect_all_ports(node, Direction::Input, ConnectOptions::default())
    }

    /// Resize the input list
    pub fn set_number_of_inputs(&mut self, node: NodeKey, count: usize) -> Result<Vec<NodeKey>> {
        self.set_number_of_ports(node, Direction::Input, count, ConnectOptions::default())
    }

    /// Replace the whole input list
    pub fn connect_input_list(&mut self, node: NodeKey, slots: Vec<Option<NodeKey>>) -> Result<()> {
        self.connect_port_list(node, Direction::Input, slots, ConnectOptions::default())
    }

    /// Index of `neighbor` among the inputs
    pub fn find_input_index(&self, node: NodeKey, neighbor: NodeKey) -> Option<usize> {
        self.find_index(node, Direction::Input, neighbor)
    }

    /// Index of the input with the given id
    pub fn find_input_index_by_id(&self, node: NodeKey, id: NodeId) -> Option<usize> {
        self.find_index_by_id(node, Direction::Input, id)
    }

    /// Move an input one slot toward the front of a growable list
    pub fn move_input_up(&mut self, node: NodeKey, id: NodeId) -> bool {
        self.move_input(node, id, |index, _| index.checked_sub(1))
    }

    /// Move an input one slot toward the back of a growable list
    pub fn move_input_down(&mut self, node: NodeKey, id: NodeId) -> bool {
        self.move_input(node, id, |index, len| (index + 1 < len).then_some(index + 1))
    }

    /// Move an input to the front of a growable list
    pub fn move_input_to_top(&mut self, node: NodeKey, id: NodeId) -> bool {
        self.move_input(node, id, |index, _| (index > 0).then_some(0))
    }

    /// Move an input to the back of a growable list
    pub fn move_input_to_bottom(&mut self, node: NodeKey, id: NodeId) -> bool {
        self.move_input(node, id, |index, len| (index + 1 < len).then_some(len - 1))
    }

    // Outputs

    /// Connect `candidate` as an output of `node`
    pub fn connect_output(&mut self, node: NodeKey, candidate: NodeKey) -> Result<usize> {
        self.connect_port(node, Direction::Output, candidate, ConnectOptions::default())
    }

    /// Connect `candidate` as an output of `node` with explicit options
    pub fn connect_output_with(
        &mut self,
        node: NodeKey,
        candidate: NodeKey,
        options: ConnectOptions,
    ) -> Result<usize> {
        self.connect_port(node, Direction::Output, candidate, options)
    }

    /// Connect `candidate` at output slot `index`
    pub fn connect_output_at(
        &mut self,
        node: NodeKey,
        index: usize,
        candidate: NodeKey,
        options: ConnectOptions,
    ) -> Result<usize> {
        self.connect_port_at(node, Direction::Output, index, candidate, options)
    }

    /// Replace the output at `index`
    pub fn replace_output_at(
        &mut self,
        node: NodeKey,
        index: usize,
        candidate: NodeKey,
        options: ConnectOptions,
    ) -> Result<Option<NodeKey>> {
        self.replace_port_at(node, Direction::Output, index, candidate, options)
    }

    /// Disconnect the output at `index`
    pub fn disconnect_output(&mut self, node: NodeKey, index: usize) -> Option<NodeKey> {
        self.disconnect_port(node, Direction::Output, index, ConnectOptions::default())
    }

    /// Disconnect `neighbor` from the outputs. Returns its former index.
    pub fn disconnect_output_node(&mut self, node: NodeKey, neighbor: NodeKey) -> Option<usize> {
        let index = self.find_output_index(node, neighbor)?;
        self.disconnect_output(node, index).map(|_| index)
    }

    /// Disconnect the output with the given id
    pub fn disconnect_output_id(&mut self, node: NodeKey, id: NodeId) -> Option<NodeKey> {
        let index = self.find_output_index_by_id(node, id)?;
        self.disconnect_output(node, index)
    }

    /// Disconnect several outputs with one event
    pub fn disconnect_outputs(&mut self, node: NodeKey, neighbors: &[NodeKey]) -> Vec<NodeKey> {
        self.disconnect_ports(node, Direction::Output, neighbors, ConnectOptions::default())
    }

    /// Disconnect every output
    pub fn disconnect_all_outputs(&mut self, node: NodeKey) -> Vec<NodeKey> {
        self.disconnect_all_ports(node, Direction::Output, ConnectOptions::default())
    }

    /// Resize the output list
    pub fn set_number_of_outputs(&mut self, node: NodeKey, count: usize) -> Result<Vec<NodeKey>> {
        self.set_number_of_ports(node, Direction::Output, count, ConnectOptions::default())
    }

    /// Replace the whole output list
    pub fn connect_output_list(&mut self, node: NodeKey, slots: Vec<Option<NodeKey>>) -> Result<()> {
        self.connect_port_list(node, Direction::Output, slots, ConnectOptions::default())
    }

    /// Index of `neighbor` among the outputs
    pub fn find_output_index(&self, node: NodeKey, neighbor: NodeKey) -> Option<usize> {
        self.find_index(node, Direction::Output, neighbor)
    }

    /// Index of the output with the given id
    pub fn find_output_index_by_id(&self, node: NodeKey, id: NodeId) -> Option<usize> {
        self.find_index_by_id(node, Direction::Output, id)
    }

    fn link(
        &mut self,
        node: NodeKey,
        direction: Direction,
        index: usize,
        candidate: NodeKey,
        reciprocal: Option<usize>,
        changes: &mut Changes,
    ) -> Result<()> {
        self.node_mut(node)?.ports_mut(direction).place(index, candidate);
        if let Some(slot) = reciprocal {
            let side = direction.opposite();
            self.node_mut(candidate)?.ports_mut(side).place(slot, node);
            changes.push(candidate, ChangeKind::Connect, side, vec![Some(node)], Vec::new());
        }
        Ok(())
    }

    /// Drop `node` from `side` of `neighbor`, if it is there
    fn unlink_reciprocal(
        &mut self,
        neighbor: NodeKey,
        side: Direction,
        node: NodeKey,
        changes: &mut Changes,
    ) {
        let Some(list) = self.nodes.get_mut(neighbor).map(|n| n.ports_mut(side)) else {
            return;
        };
        if let Some(index) = list.position(node) {
            list.vacate(index);
            changes.push(neighbor, ChangeKind::Disconnect, side, Vec::new(), vec![Some(node)]);
        }
    }

    /// Drop every remaining reference to `key` from other nodes' lists,
    /// one-sided links included.
    pub(crate) fn purge_links(&mut self, key: NodeKey) {
        let stale: Vec<(NodeKey, Direction)> = self
            .nodes
            .iter()
            .filter(|(other, _)| *other != key)
            .flat_map(|(other, node)| {
                [Direction::Input, Direction::Output]
                    .into_iter()
                    .filter(move |&side| node.ports(side).contains(key))
                    .map(move |side| (other, side))
            })
            .collect();
        if stale.is_empty() {
            return;
        }

        let mut changes = Changes::default();
        for (other, side) in stale {
            self.unlink_reciprocal(other, side, key, &mut changes);
        }
        self.commit(changes, true);
        tracing::debug!("Cleared stray links to {key}");
    }

    fn finish_disconnect(
        &mut self,
        node: NodeKey,
        direction: Direction,
        removed: Vec<NodeKey>,
        options: ConnectOptions,
    ) {
        if removed.is_empty() {
            return;
        }
        let mut changes = Changes::default();
        changes.push(
            node,
            ChangeKind::Disconnect,
            direction,
            Vec::new(),
            removed.iter().copied().map(Some).collect(),
        );
        if options.reciprocal {
            for &neighbor in &removed {
                self.unlink_reciprocal(neighbor, direction.opposite(), node, &mut changes);
            }
        }
        self.commit(changes, options.emit);
        tracing::debug!("Disconnected {} {direction}(s) of {node}", removed.len());
    }

    fn move_input(
        &mut self,
        node: NodeKey,
        id: NodeId,
        target: impl FnOnce(usize, usize) -> Option<usize>,
    ) -> bool {
        let Some(from) = self.find_input_index_by_id(node, id) else {
            return false;
        };
        let Some(this) = self.nodes.get_mut(node) else {
            return false;
        };
        if this.inputs.is_fixed() {
            return false;
        }
        let Some(to) = target(from, this.inputs.len()) else {
            return false;
        };

        let old = this.inputs.slots().to_vec();
        this.inputs.move_slot(from, to);
        let new = this.inputs.slots().to_vec();
        self.fire_connection(node, ChangeKind::Connect, Direction::Input, new, old);
        tracing::debug!("Moved input {from} of {node} to {to}");
        true
    }

    fn commit(&mut self, changes: Changes, emit: bool) {
        if !emit {
            return;
        }
        for change in changes.0 {
            self.fire_connection(change.node, change.kind, change.direction, change.new, change.old);
        }
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Accept-checks a processing stage exposes to the connection protocol.
//!
//! The graph never looks at what a stage computes. Before placing a
//! neighbor in a slot it only asks the stage's [`Capability`] whether that
//! neighbor may sit at that index.

use crate::node::{Node, StageKind};

/// Connection capability of a participant.
///
/// Both checks default to accepting. Bounds and fixed-list rules are
/// enforced by the protocol itself, so implementations only express what
/// the stage is willing to be wired to.
pub trait Capability {
    /// May `candidate` occupy input slot `index` of `node`?
    fn can_accept_input_at(&self, node: &Node, index: usize, candidate: &Node) -> bool {
        let _ = (node, index, candidate);
        true
    }

    /// May `candidate` occupy output slot `index` of `node`?
    fn can_accept_output_at(&self, node: &Node, index: usize, candidate: &Node) -> bool {
        let _ = (node, index, candidate);
        true
    }
}

/// Accepts any neighbor on either side
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Capability for AcceptAll {}

/// Refuses every connection. Plain containers use this: they are wired
/// through their children, not their own ports.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectAll;

impl Capability for RejectAll {
    fn can_accept_input_at(&self, _: &Node, _: usize, _: &Node) -> bool {
        false
    }

    fn can_accept_output_at(&self, _: &Node, _: usize, _: &Node) -> bool {
        false
    }
}

/// Restricts neighbors by kind, per side. `None` leaves a side open.
#[derive(Debug, Clone, Default)]
pub struct AcceptKinds {
    inputs: Option<Vec<StageKind>>,
    outputs: Option<Vec<StageKind>>,
}

impl AcceptKinds {
    /// Only accept inputs of the given kinds
    pub fn inputs(kinds: impl IntoIterator<Item = StageKind>) -> Self {
        Self {
            inputs: Some(kinds.into_iter().collect()),
            outputs: None,
        }
    }

    /// Only accept outputs of the given kinds
    pub fn outputs(kinds: impl IntoIterator<Item = StageKind>) -> Self {
        Self {
            inputs: None,
            outputs: Some(kinds.into_iter().collect()),
        }
    }

    /// Additionally restrict the output side
    pub fn with_outputs(mut self, kinds: impl IntoIterator<Item = StageKind>) -> Self {
        self.outputs = Some(kinds.into_iter().collect());
        self
    }

    fn allows(filter: Option<&[StageKind]>, candidate: &Node) -> bool {
        filter.map_or(true, |kinds| kinds.contains(candidate.kind()))
    }
}

impl Capability for AcceptKinds {
    fn can_accept_input_at(&self, _: &Node, _: usize, candidate: &Node) -> bool {
        Self::allows(self.inputs.as_deref(), candidate)
    }

    fn can_accept_output_at(&self, _: &Node, _: usize, candidate: &Node) -> bool {
        Self::allows(self.outputs.as_deref(), candidate)
    }
}

/// Per-slot input constraints: slot `i` accepts the kinds in entry `i`.
/// Slots past the end of the table accept anything.
#[derive(Debug, Clone, Default)]
pub struct SlotKinds {
    slots: Vec<Vec<StageKind>>,
}

impl SlotKinds {
    /// Build from one kind list per input slot
    pub fn new(slots: Vec<Vec<StageKind>>) -> Self {
        Self { slots }
    }
}

impl Capability for SlotKinds {
    fn can_accept_input_at(&self, _: &Node, index: usize, candidate: &Node) -> bool {
        self.slots
            .get(index)
            .map_or(true, |kinds| kinds.contains(candidate.kind()))
    }
}

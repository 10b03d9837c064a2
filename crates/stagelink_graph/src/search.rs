// SPDX-License-Identifier: MIT OR Apache-2.0
//! Search and propagation helpers built on [`Graph::accept`].

use crate::event::GraphEvent;
use crate::graph::Graph;
use crate::id::{NodeId, NodeKey};
use crate::node::StageKind;
use crate::visitor::{SearchVisitor, Selector, VisitMask};

impl Graph {
    /// The walk still passes through `start`, but never reports it.
    fn search(&self, start: NodeKey, selector: Selector, mask: VisitMask) -> SearchVisitor {
        SearchVisitor::new(selector, mask)
            .with_escalation(self.config.escalation)
            .excluding(start)
    }

    /// First node reachable from `start` that matches, not counting
    /// `start` itself. Use [`Graph::accept`] with a [`SearchVisitor`] to
    /// include it.
    pub fn find_first(&self, start: NodeKey, selector: Selector, mask: VisitMask) -> Option<NodeKey> {
        let mut search = self.search(start, selector, mask).first_only();
        self.accept(start, &mut search);
        search.first()
    }

    /// Every other node reachable from `start` that matches, in visit order
    pub fn find_all(&self, start: NodeKey, selector: Selector, mask: VisitMask) -> Vec<NodeKey> {
        let mut search = self.search(start, selector, mask);
        self.accept(start, &mut search);
        search.into_matches()
    }

    /// First reachable node of `kind`
    pub fn find_by_kind(&self, start: NodeKey, kind: StageKind, mask: VisitMask) -> Option<NodeKey> {
        self.find_first(start, Selector::Kind(kind), mask)
    }

    /// Every reachable node of `kind`
    pub fn find_all_of_kind(&self, start: NodeKey, kind: StageKind, mask: VisitMask) -> Vec<NodeKey> {
        self.find_all(start, Selector::Kind(kind), mask)
    }

    /// Reachable node with the given id
    pub fn find_by_id(&self, start: NodeKey, id: NodeId, mask: VisitMask) -> Option<NodeKey> {
        self.find_first(start, Selector::Id(id), mask)
    }

    /// First reachable node with the given type name
    pub fn find_by_name(&self, start: NodeKey, name: &str, mask: VisitMask) -> Option<NodeKey> {
        self.find_first(start, Selector::Name(name.to_string()), mask)
    }

    /// Nearest upstream node of `kind`, not counting `node` itself.
    ///
    /// Walks inputs and, for containers, their children.
    pub fn find_input_of_kind(&self, node: NodeKey, kind: StageKind) -> Option<NodeKey> {
        self.find_first(node, Selector::Kind(kind), VisitMask::INPUTS | VisitMask::CHILDREN)
    }

    /// Deliver a [`GraphEvent::Propagated`] to every node downstream of
    /// `origin`. Returns how many nodes received it.
    pub fn propagate_to_outputs(&mut self, origin: NodeKey, topic: &str) -> usize {
        self.propagate(origin, topic, VisitMask::OUTPUTS)
    }

    /// Deliver a [`GraphEvent::Propagated`] to every node upstream of
    /// `origin`. Returns how many nodes received it.
    pub fn propagate_to_inputs(&mut self, origin: NodeKey, topic: &str) -> usize {
        self.propagate(origin, topic, VisitMask::INPUTS)
    }

    fn propagate(&mut self, origin: NodeKey, topic: &str, mask: VisitMask) -> usize {
        let mut search = SearchVisitor::new(Selector::Any, mask).excluding(origin);
        self.accept(origin, &mut search);
        let targets = search.into_matches();
        for &target in &targets {
            self.fire(
                target,
                GraphEvent::Propagated {
                    origin,
                    topic: topic.to_string(),
                },
            );
        }
        tracing::debug!("Propagated '{topic}' from {origin} to {} node(s)", targets.len());
        targets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::AcceptAll;
    use crate::event::EventLog;
    use crate::node::NodeOptions;

    fn stage(graph: &mut Graph, name: &str, kind: StageKind) -> NodeKey {
        graph.add_node(NodeOptions::new(name, kind), AcceptAll)
    }

    #[test]
    fn test_find_helpers() {
        let mut graph = Graph::new();
        let reader = stage(&mut graph, "tiff_reader", StageKind::Reader);
        let filter = stage(&mut graph, "speckle", StageKind::Filter);
        let writer = stage(&mut graph, "png_writer", StageKind::Writer);
        graph.connect_output(reader, filter).unwrap();
        graph.connect_output(filter, writer).unwrap();
        let writer_id = graph.node(writer).unwrap().id();

        assert_eq!(graph.find_by_kind(reader, StageKind::Writer, VisitMask::OUTPUTS), Some(writer));
        assert_eq!(graph.find_by_id(reader, writer_id, VisitMask::OUTPUTS), Some(writer));
        assert_eq!(graph.find_by_name(writer, "tiff_reader", VisitMask::INPUTS), Some(reader));
        assert_eq!(graph.find_by_kind(reader, StageKind::Writer, VisitMask::INPUTS), None);
        assert_eq!(
            graph.find_all(reader, Selector::Any, VisitMask::OUTPUTS),
            vec![filter, writer]
        );
    }

    #[test]
    fn test_find_helpers_skip_start() {
        let mut graph = Graph::new();
        let reader = stage(&mut graph, "tiff_reader", StageKind::Reader);
        let writer = stage(&mut graph, "png_writer", StageKind::Writer);
        graph.connect_output(reader, writer).unwrap();
        let writer_id = graph.node(writer).unwrap().id();

        assert_eq!(graph.find_by_kind(writer, StageKind::Writer, VisitMask::INPUTS), None);
        assert_eq!(graph.find_by_id(writer, writer_id, VisitMask::ALL), None);
        assert_eq!(graph.find_by_name(reader, "tiff_reader", VisitMask::NONE), None);
        assert!(graph.find_all_of_kind(writer, StageKind::Writer, VisitMask::ALL).is_empty());

        // The start node is still reachable through an explicit visitor
        let mut search = SearchVisitor::new(Selector::Kind(StageKind::Writer), VisitMask::NONE);
        graph.accept(writer, &mut search);
        assert_eq!(search.first(), Some(writer));
    }

    #[test]
    fn test_find_input_of_kind_skips_self() {
        let mut graph = Graph::new();
        let upstream = stage(&mut graph, "a", StageKind::Filter);
        let node = stage(&mut graph, "b", StageKind::Filter);
        graph.connect_output(upstream, node).unwrap();

        assert_eq!(graph.find_input_of_kind(node, StageKind::Filter), Some(upstream));
        assert_eq!(graph.find_input_of_kind(upstream, StageKind::Filter), None);
    }

    #[test]
    fn test_find_all_of_kind_in_diamond() {
        let mut graph = Graph::new();
        let reader = stage(&mut graph, "reader", StageKind::Reader);
        let left = stage(&mut graph, "left", StageKind::Filter);
        let right = stage(&mut graph, "right", StageKind::Filter);
        let merge = stage(&mut graph, "merge", StageKind::Combiner);
        for branch in [left, right] {
            graph.connect_output(reader, branch).unwrap();
            graph.connect_output(branch, merge).unwrap();
        }

        assert_eq!(
            graph.find_all_of_kind(reader, StageKind::Filter, VisitMask::OUTPUTS),
            vec![left, right]
        );
        assert_eq!(
            graph.find_all(reader, Selector::Kind(StageKind::Combiner), VisitMask::OUTPUTS),
            vec![merge]
        );
    }

    #[test]
    fn test_propagation_reaches_each_node_once() {
        let mut graph = Graph::new();
        let a = stage(&mut graph, "a", StageKind::Filter);
        let b = stage(&mut graph, "b", StageKind::Filter);
        let c = stage(&mut graph, "c", StageKind::Filter);
        graph.connect_output(a, b).unwrap();
        graph.connect_output(b, c).unwrap();
        graph.connect_output(c, a).unwrap();

        let logs: Vec<_> = [a, b, c]
            .iter()
            .map(|&node| {
                let log = EventLog::new();
                graph.add_listener(node, log.clone());
                log
            })
            .collect();

        assert_eq!(graph.propagate_to_outputs(a, "refresh"), 2);
        assert!(logs[0].is_empty());
        for log in &logs[1..] {
            assert_eq!(
                log.events(),
                vec![GraphEvent::Propagated {
                    origin: a,
                    topic: "refresh".to_string()
                }]
            );
        }
        assert_eq!(graph.propagate_to_inputs(c, "reset"), 2);
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end wiring scenarios.

use stagelink_graph::{
    AcceptAll, ChangeKind, ConnectError, ConnectOptions, Direction, EscalationPolicy, EventLog,
    Graph, GraphConfig, GraphEvent, NodeKey, NodeOptions, RejectAll, SearchVisitor, Selector,
    StageKind, VisitMask,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn stage(graph: &mut Graph, name: &str, kind: StageKind) -> NodeKey {
    graph.add_node(NodeOptions::new(name, kind), AcceptAll)
}

fn visit_all(graph: &Graph, start: NodeKey, mask: VisitMask) -> Vec<NodeKey> {
    let mut search = SearchVisitor::new(Selector::Any, mask);
    graph.accept(start, &mut search);
    search.into_matches()
}

#[test]
fn test_connect_output_links_both_sides() {
    init_tracing();
    let mut graph = Graph::new();
    let a = graph.add_node(
        NodeOptions::new("ortho", StageKind::Filter).with_inputs(1, true),
        AcceptAll,
    );
    let b = stage(&mut graph, "tiff_writer", StageKind::Writer);

    assert_eq!(graph.connect_output(a, b), Ok(0));
    assert_eq!(graph.node(b).unwrap().input(0), Some(a));
    assert_eq!(graph.node(a).unwrap().output(0), Some(b));
}

#[test]
fn test_cycle_is_visited_once() {
    init_tracing();
    let mut graph = Graph::new();
    let a = stage(&mut graph, "a", StageKind::Filter);
    let b = stage(&mut graph, "b", StageKind::Filter);
    graph.connect_output(a, b).unwrap();
    graph.connect_output(b, a).unwrap();

    let visited = visit_all(&graph, a, VisitMask::ALL_PORTS);
    assert_eq!(visited, vec![a, b]);
}

#[test]
fn test_disconnect_all_outputs_clears_every_back_link() {
    init_tracing();
    let mut graph = Graph::new();
    let a = stage(&mut graph, "reader", StageKind::Reader);
    let targets = ["x", "y", "z"].map(|name| stage(&mut graph, name, StageKind::Writer));
    for target in targets {
        graph.connect_output(a, target).unwrap();
    }
    let log = EventLog::new();
    graph.add_listener(a, log.clone());

    let removed = graph.disconnect_all_outputs(a);
    assert_eq!(removed, targets.to_vec());
    assert!(graph.node(a).unwrap().outputs().is_empty());
    for target in targets {
        assert!(!graph.node(target).unwrap().inputs().contains(a));
    }

    let events = log.connection_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, ChangeKind::Disconnect);
    assert_eq!(events[0].direction, Direction::Output);
    assert_eq!(events[0].old_neighbors, targets.map(Some).to_vec());
}

/// Container C owns D. D's only output is taken, so a search from D may
/// climb to C and continue through C's outputs.
struct Escalation {
    graph: Graph,
    container: NodeKey,
    child: NodeKey,
    target: NodeKey,
}

fn escalation_graph(child_outputs_full: bool) -> Escalation {
    let mut graph = Graph::new();
    let container = graph.add_node(
        NodeOptions::container("classify_chain").with_outputs(0, false),
        AcceptAll,
    );
    let child = graph.add_node(
        NodeOptions::new("kmeans", StageKind::Classifier).with_outputs(1, true),
        AcceptAll,
    );
    let local = stage(&mut graph, "png_codec", StageKind::Codec);
    let target = stage(&mut graph, "tiff_writer", StageKind::Writer);

    graph.add_child(container, child).unwrap();
    if child_outputs_full {
        graph.connect_output(child, local).unwrap();
    }
    graph.connect_output(container, target).unwrap();
    Escalation {
        graph,
        container,
        child,
        target,
    }
}

#[test]
fn test_owner_escalation_crosses_container() {
    init_tracing();
    let setup = escalation_graph(true);
    let graph = &setup.graph;
    assert_eq!(graph.owner(setup.child), Some(setup.container));

    let local = graph.find_by_kind(setup.child, StageKind::Writer, VisitMask::OUTPUTS);
    assert_eq!(local, None);

    let escalated = graph.find_by_kind(
        setup.child,
        StageKind::Writer,
        VisitMask::OUTPUTS | VisitMask::OWNER,
    );
    assert_eq!(escalated, Some(setup.target));
}

#[test]
fn test_escalation_policy_decides_for_free_slots() {
    init_tracing();
    let mut setup = escalation_graph(false);
    let mask = VisitMask::OUTPUTS | VisitMask::OWNER;

    assert_eq!(
        setup.graph.find_by_kind(setup.child, StageKind::Writer, mask),
        None
    );

    setup.graph.set_config(GraphConfig {
        escalation: EscalationPolicy::Always,
        ..GraphConfig::default()
    });
    assert_eq!(
        setup.graph.find_by_kind(setup.child, StageKind::Writer, mask),
        Some(setup.target)
    );
}

#[test]
fn test_plain_container_rejects_connections() {
    init_tracing();
    let mut graph = Graph::new();
    let container = graph.add_node(NodeOptions::container("group"), RejectAll);
    let reader = stage(&mut graph, "reader", StageKind::Reader);

    assert!(graph.connect_output(reader, container).is_err());
    assert!(graph.node(reader).unwrap().outputs().is_empty());
}

#[test]
fn test_fixed_inputs_keep_their_count() {
    init_tracing();
    let mut graph = Graph::new();
    let node = graph.add_node(
        NodeOptions::new("blend", StageKind::Combiner).with_inputs(3, true),
        AcceptAll,
    );
    let sources = ["a", "b", "c", "d"].map(|name| stage(&mut graph, name, StageKind::Reader));

    for source in sources {
        let _ = graph.connect_input(node, source);
        assert_eq!(graph.node(node).unwrap().input_count(), 3);
    }
    assert_eq!(
        graph.connect_input(node, sources[3]),
        Err(ConnectError::NoFreeSlot {
            direction: Direction::Input
        })
    );

    graph.disconnect_input(node, 1);
    graph.disconnect_input_node(node, sources[0]);
    assert_eq!(graph.node(node).unwrap().input_count(), 3);
    assert_eq!(graph.connect_input(node, sources[3]), Ok(0));
    graph.disconnect_all_inputs(node);
    assert_eq!(graph.node(node).unwrap().input_count(), 3);
}

#[test]
fn test_idempotent_connect_keeps_length() {
    init_tracing();
    let mut graph = Graph::new();
    let node = stage(&mut graph, "mosaic", StageKind::Combiner);
    let source = stage(&mut graph, "reader", StageKind::Reader);

    let first = graph.connect_input(node, source).unwrap();
    let second = graph.connect_input(node, source).unwrap();
    assert_eq!(first, second);
    assert_eq!(graph.node(node).unwrap().input_count(), 1);
    assert_eq!(graph.node(source).unwrap().output_count(), 1);
}

#[test]
fn test_destroyed_node_leaves_no_dangling_links() {
    init_tracing();
    let mut graph = Graph::new();
    let hub = stage(&mut graph, "hub", StageKind::Filter);
    let upstream = ["r1", "r2"].map(|name| stage(&mut graph, name, StageKind::Reader));
    let downstream = ["w1", "w2", "w3"].map(|name| stage(&mut graph, name, StageKind::Writer));
    for source in upstream {
        graph.connect_input(hub, source).unwrap();
    }
    for sink in downstream {
        graph.connect_output(hub, sink).unwrap();
    }
    let log = EventLog::new();
    graph.add_listener(hub, log.clone());

    assert!(graph.remove_node(hub).is_some());
    assert!(matches!(log.events()[0], GraphEvent::Destructing { .. }));
    for neighbor in upstream.iter().chain(&downstream) {
        let node = graph.node(*neighbor).unwrap();
        assert!(!node.inputs().contains(hub));
        assert!(!node.outputs().contains(hub));
    }
    assert_eq!(graph.find_by_name(upstream[0], "hub", VisitMask::ALL), None);
}

#[test]
fn test_destroying_one_sided_neighbor_frees_fixed_slot() {
    init_tracing();
    let mut graph = Graph::new();
    let writer = graph.add_node(
        NodeOptions::new("tiff_writer", StageKind::Writer).with_inputs(1, true),
        AcceptAll,
    );
    let reader = stage(&mut graph, "reader", StageKind::Reader);
    graph
        .connect_input_with(writer, reader, ConnectOptions::one_sided())
        .unwrap();
    assert!(graph.node(reader).unwrap().outputs().is_empty());
    let log = EventLog::new();
    graph.add_listener(writer, log.clone());

    assert!(graph.remove_node(reader).is_some());
    assert_eq!(graph.node(writer).unwrap().inputs().slots(), &[None]);

    let events = log.connection_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, ChangeKind::Disconnect);
    assert_eq!(events[0].direction, Direction::Input);
    assert_eq!(events[0].old_neighbors, vec![Some(reader)]);

    let replacement = stage(&mut graph, "reader", StageKind::Reader);
    assert_eq!(graph.connect_input(writer, replacement), Ok(0));
}

#[test]
fn test_replace_then_reconnect_old_neighbor() {
    init_tracing();
    let mut graph = Graph::new();
    let filter = graph.add_node(
        NodeOptions::new("speckle", StageKind::Filter).with_inputs(1, true),
        AcceptAll,
    );
    let old = stage(&mut graph, "old", StageKind::Reader);
    let new = stage(&mut graph, "new", StageKind::Reader);
    graph.connect_input(filter, old).unwrap();

    graph
        .replace_input_at(filter, 0, new, ConnectOptions::default())
        .unwrap();
    assert!(graph.node(old).unwrap().outputs().is_empty());
    assert_eq!(
        graph.connect_input(filter, old),
        Err(ConnectError::NoFreeSlot {
            direction: Direction::Input
        })
    );
}

#[test]
fn test_graph_config_from_ron() {
    let config = GraphConfig::from_ron("(escalation: Always, emit_events: false)").unwrap();
    let mut graph = Graph::with_config(config);
    let a = stage(&mut graph, "a", StageKind::Reader);
    let b = stage(&mut graph, "b", StageKind::Writer);
    let log = EventLog::new();
    graph.add_listener(a, log.clone());

    graph.connect_output(a, b).unwrap();
    assert!(log.is_empty());
    assert_eq!(graph.config().escalation, EscalationPolicy::Always);
}

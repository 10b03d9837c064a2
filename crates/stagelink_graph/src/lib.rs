// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connectable node graph for stagelink processing pipelines.
//!
//! This crate wires processing stages (readers, codecs, filters,
//! classifiers, writers) together before anything runs. It knows nothing
//! about pixels or formats; it only keeps the wiring consistent.
//!
//! ## Architecture
//!
//! The graph is built on:
//! - Nodes in a generational arena, referenced by [`NodeKey`]
//! - Fixed or growable input/output port lists
//! - A connection protocol that keeps both sides of every link in sync
//! - Synchronous per-node change events
//! - A cycle-safe visitor that every search is built on
//! - Containers that own sub-pipelines
//! - Serializable node records for persistence

mod arena;
pub mod capability;
pub mod config;
pub mod connection;
mod container;
pub mod error;
pub mod event;
pub mod graph;
pub mod id;
pub mod node;
pub mod persistence;
pub mod port;
mod search;
pub mod visitor;

pub use capability::{AcceptAll, AcceptKinds, Capability, RejectAll, SlotKinds};
pub use config::{ConfigError, GraphConfig};
pub use connection::ConnectOptions;
pub use error::{ConnectError, Result};
pub use event::{ChangeKind, ConnectionEvent, EventLog, GraphEvent, Listener, ListenerId};
pub use graph::Graph;
pub use id::{NodeId, NodeKey};
pub use node::{Node, NodeOptions, StageKind};
pub use persistence::{GraphSnapshot, NodeRecord, RestoreError};
pub use port::{Direction, PortList};
pub use visitor::{EscalationPolicy, SearchVisitor, Selector, VisitMask, Visitor};

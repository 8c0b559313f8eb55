//! Read-only, serializable view of the registry at a tick boundary.
//!
//! Used by the runner's control loop to report state. Never read back
//! into a registry: there is no resume-from-snapshot.

use crate::{
    geometry::{Point, Rect},
    node::Node,
    signal::{Signal, SignalState},
    types::{NodeId, RunId, Rgb, SignalId, Tick},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub run_id:  RunId,
    pub tick:    Tick,
    pub running: bool,
    pub nodes:   Vec<NodeView>,
    pub signals: Vec<SignalView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeView {
    pub id:            NodeId,
    pub rect:          Rect,
    pub color:         Rgb,
    pub alive:         bool,
    pub remembered:    usize,
    pub applied_count: u64,
}

impl From<&Node> for NodeView {
    fn from(node: &Node) -> Self {
        Self {
            id:            node.id(),
            rect:          node.rect(),
            color:         node.color(),
            alive:         node.is_alive(),
            remembered:    node.memory().len(),
            applied_count: node.applied_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalView {
    pub id:     SignalId,
    pub origin: NodeId,
    pub center: Point,
    pub radius: u32,
    pub ttl:    u32,
    pub color:  Rgb,
    pub state:  SignalState,
}

impl From<&Signal> for SignalView {
    fn from(signal: &Signal) -> Self {
        Self {
            id:     signal.id(),
            origin: signal.origin(),
            center: signal.center(),
            radius: signal.radius(),
            ttl:    signal.ttl(),
            color:  signal.color(),
            state:  signal.state(),
        }
    }
}

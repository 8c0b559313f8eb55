//! Shared primitive types used across the entire simulation.

use serde::{Deserialize, Serialize};

/// A simulation tick. One tick = one rendered frame.
pub type Tick = u64;

/// Identifier of a node. Issued by the registry, never reused.
pub type NodeId = u64;

/// Identifier of a signal. Issued by the registry, never reused.
pub type SignalId = u64;

/// The canonical run identifier.
pub type RunId = String;

/// The single broadcast channel every node subscribes to.
pub const COLOR_CHANGE: &str = "colorchange";

/// An RGB triple. Serialized as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);
}

/// The entity kinds that draw from separate ID counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Node,
    Signal,
}

//! The event bus — everything observable that happens during a tick.
//!
//! RULE: Every state change an outside observer may care about
//! (spawn, kill, broadcast, reception, relay, decay, collection)
//! is reported as a SimEvent in the tick's returned log.

use crate::types::{NodeId, RunId, Rgb, SignalId, Tick};
use serde::{Deserialize, Serialize};

/// Every event emitted during simulation.
/// Variants are append-only. Never remove or reorder them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine events ──────────────────────────────
    TickStarted {
        tick: Tick,
    },
    TickCompleted {
        tick: Tick,
        live_nodes: usize,
        live_signals: usize,
    },
    RunInitialized {
        run_id: RunId,
        seed: u64,
    },
    RunStopped {
        tick: Tick,
    },

    // ── Node lifecycle ─────────────────────────────
    NodeSpawned {
        tick: Tick,
        node_id: NodeId,
        x: i32,
        y: i32,
    },
    NodeKilled {
        tick: Tick,
        node_id: NodeId,
    },

    // ── Flood events ───────────────────────────────
    BroadcastOriginated {
        tick: Tick,
        node_id: NodeId,
        signal_id: SignalId,
        color: Rgb,
    },
    SignalReceived {
        tick: Tick,
        node_id: NodeId,
        signal_id: SignalId,
        ttl_after: u32,
        applied: bool,
    },
    SignalRelayed {
        tick: Tick,
        node_id: NodeId,
        from_signal: SignalId,
        relay_id: SignalId,
        ttl: u32,
    },
    SignalDecayed {
        tick: Tick,
        signal_id: SignalId,
        radius: u32,
        ttl: u32,
    },

    // ── Cleanup ────────────────────────────────────
    EntitiesCollected {
        tick: Tick,
        nodes: usize,
        signals: usize,
    },
}

impl SimEvent {
    /// Stable string name of the variant, for summaries and log lines.
    pub fn type_name(&self) -> &'static str {
        match self {
            SimEvent::TickStarted { .. }         => "tick_started",
            SimEvent::TickCompleted { .. }       => "tick_completed",
            SimEvent::RunInitialized { .. }      => "run_initialized",
            SimEvent::RunStopped { .. }          => "run_stopped",
            SimEvent::NodeSpawned { .. }         => "node_spawned",
            SimEvent::NodeKilled { .. }          => "node_killed",
            SimEvent::BroadcastOriginated { .. } => "broadcast_originated",
            SimEvent::SignalReceived { .. }      => "signal_received",
            SimEvent::SignalRelayed { .. }       => "signal_relayed",
            SimEvent::SignalDecayed { .. }       => "signal_decayed",
            SimEvent::EntitiesCollected { .. }   => "entities_collected",
        }
    }
}

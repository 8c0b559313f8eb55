//! Nodes: stationary boxes that relay and act on signals.
//!
//! RULE: a node handles any given signal ID at most once. The dedup
//! memory is keyed by the ID of the signal that arrived, so a relay
//! (which carries a fresh ID) is a new signal to every other node.

use crate::{
    config::SimConfig,
    geometry::{Point, Rect},
    ids::IdCounters,
    signal::{Countdown, Payload, Signal},
    surface::Surface,
    types::{EntityKind, NodeId, Rgb, SignalId},
};
use std::collections::{HashSet, VecDeque};

/// Record of signal IDs a node has already handled.
///
/// Unbounded unless built with a capacity, in which case the oldest IDs
/// are evicted first.
#[derive(Debug, Clone, Default)]
pub struct DedupMemory {
    seen:     HashSet<SignalId>,
    order:    VecDeque<SignalId>,
    capacity: Option<usize>,
}

impl DedupMemory {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            seen: HashSet::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    pub fn contains(&self, id: SignalId) -> bool {
        self.seen.contains(&id)
    }

    /// Returns false if the ID was already remembered.
    pub fn remember(&mut self, id: SignalId) -> bool {
        if !self.seen.insert(id) {
            return false;
        }
        self.order.push_back(id);
        if let Some(cap) = self.capacity {
            while self.order.len() > cap {
                if let Some(evicted) = self.order.pop_front() {
                    self.seen.remove(&evicted);
                }
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Remembered IDs, oldest first.
    pub fn ids(&self) -> impl Iterator<Item = SignalId> + '_ {
        self.order.iter().copied()
    }
}

/// Outcome of handing a signal to a node.
#[derive(Debug)]
pub enum Reception {
    /// The node had already handled this signal ID.
    Duplicate,
    Delivered {
        /// The payload matched a subscription and was applied.
        applied: bool,
        /// Present when the signal still had hop budget.
        relay:   Option<Signal>,
    },
}

#[derive(Debug, Clone)]
pub struct Node {
    id:            NodeId,
    rect:          Rect,
    color:         Rgb,
    alive:         bool,
    subscriptions: Vec<String>,
    memory:        DedupMemory,
    applied_count: u64,
}

impl Node {
    pub fn new(
        id: NodeId,
        rect: Rect,
        subscriptions: Vec<String>,
        dedup_capacity: Option<usize>,
    ) -> Self {
        Self {
            id,
            rect,
            color: Rgb::WHITE,
            alive: true,
            subscriptions,
            memory: DedupMemory::new(dedup_capacity),
            applied_count: 0,
        }
    }

    pub fn id(&self) -> NodeId { self.id }
    pub fn rect(&self) -> Rect { self.rect }
    pub fn center(&self) -> Point { self.rect.center() }
    pub fn color(&self) -> Rgb { self.color }
    pub fn is_alive(&self) -> bool { self.alive }
    pub fn subscriptions(&self) -> &[String] { &self.subscriptions }
    pub fn memory(&self) -> &DedupMemory { &self.memory }

    /// How many times a signal's instruction has been applied here.
    pub fn applied_count(&self) -> u64 { self.applied_count }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    /// Removal is deferred to the registry's end-of-tick collection.
    pub fn kill(&mut self) {
        self.alive = false;
    }

    pub fn subscribes_to(&self, addresses: &[String]) -> bool {
        addresses.iter().any(|a| self.subscriptions.contains(a))
    }

    /// Originate a broadcast with the full configured budget. The new ID
    /// goes straight into this node's memory so it ignores its own echo.
    pub fn create_signal(
        &mut self,
        addresses: Vec<String>,
        color_instruction: Rgb,
        color: Rgb,
        ids: &mut IdCounters,
        config: &SimConfig,
    ) -> Signal {
        let signal = Signal::new(
            ids.generate(EntityKind::Signal),
            self.id,
            self.center(),
            Payload { addresses, color_instruction, color },
            Countdown::from_config(config),
        );
        self.memory.remember(signal.id());
        signal
    }

    /// Handle a signal whose bounds reached this node.
    ///
    /// A signal with hop budget left loses one hop and is relayed from
    /// here under a fresh ID carrying the remaining budget. A spent signal
    /// is still delivered but not relayed.
    pub fn receive_signal(
        &mut self,
        signal: &mut Signal,
        ids: &mut IdCounters,
        config: &SimConfig,
    ) -> Reception {
        if self.memory.contains(signal.id()) {
            return Reception::Duplicate;
        }

        let relay = if signal.ttl() > 0 {
            signal.decrement_ttl();
            let relay = Signal::new(
                ids.generate(EntityKind::Signal),
                self.id,
                self.center(),
                signal.payload().clone(),
                Countdown::from_config(config).with_ttl(signal.ttl()),
            );
            // Same echo suppression as create_signal.
            self.memory.remember(relay.id());
            Some(relay)
        } else {
            None
        };
        self.memory.remember(signal.id());

        let applied = self.subscribes_to(signal.addresses());
        if applied {
            self.color = signal.color_instruction();
            self.applied_count += 1;
        }
        Reception::Delivered { applied, relay }
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        surface.fill_rect(self.rect, self.color);
    }
}

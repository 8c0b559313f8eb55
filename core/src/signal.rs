//! Signals: expanding circular wavefronts.
//!
//! A signal grows one radius unit every `speed` propagation steps. Each
//! growth recomputes its bounding square and delivers it to every node
//! whose box that square overlaps. It decays once its radius reaches
//! `strength` or its hop budget is spent, checked only on growth steps.

use crate::{
    config::SimConfig,
    event::SimEvent,
    geometry::{Point, Rect},
    ids::IdCounters,
    node::{Node, Reception},
    surface::Surface,
    types::{NodeId, Rgb, SignalId, Tick},
};
use serde::{Deserialize, Serialize};

/// Radius of a freshly emitted signal.
pub const INITIAL_RADIUS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalState {
    Growing,
    Decayed,
}

/// What a signal carries from hop to hop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub addresses:         Vec<String>,
    pub color_instruction: Rgb,
    /// Display color of the ring.
    pub color:             Rgb,
}

/// Decay parameters of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub ttl:      u32,
    pub strength: u32,
    pub speed:    u32,
}

impl Countdown {
    /// Full configured budget, as given to a fresh broadcast.
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            ttl:      config.signal_ttl,
            strength: config.signal_strength,
            speed:    config.signal_speed,
        }
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Signal {
    id:            SignalId,
    origin:        NodeId,
    center:        Point,
    radius:        u32,
    bounds:        Rect,
    payload:       Payload,
    ttl:           u32,
    strength:      u32,
    speed:         u32,
    speed_counter: u32,
    alive:         bool,
}

/// Result of one propagation step.
#[derive(Debug, Default)]
pub struct Propagation {
    pub grew:   bool,
    pub relays: Vec<Signal>,
    pub events: Vec<SimEvent>,
}

impl Signal {
    pub fn new(
        id: SignalId,
        origin: NodeId,
        center: Point,
        payload: Payload,
        countdown: Countdown,
    ) -> Self {
        Self {
            id,
            origin,
            center,
            radius: INITIAL_RADIUS,
            bounds: Rect::around(center, INITIAL_RADIUS as i32),
            payload,
            ttl: countdown.ttl,
            strength: countdown.strength,
            speed: countdown.speed,
            speed_counter: 0,
            alive: true,
        }
    }

    pub fn id(&self) -> SignalId { self.id }
    pub fn origin(&self) -> NodeId { self.origin }
    pub fn center(&self) -> Point { self.center }
    pub fn radius(&self) -> u32 { self.radius }
    pub fn bounds(&self) -> Rect { self.bounds }
    pub fn payload(&self) -> &Payload { &self.payload }
    pub fn addresses(&self) -> &[String] { &self.payload.addresses }
    pub fn color_instruction(&self) -> Rgb { self.payload.color_instruction }
    pub fn color(&self) -> Rgb { self.payload.color }
    pub fn ttl(&self) -> u32 { self.ttl }
    pub fn strength(&self) -> u32 { self.strength }
    pub fn speed(&self) -> u32 { self.speed }
    pub fn is_alive(&self) -> bool { self.alive }

    pub fn state(&self) -> SignalState {
        if self.alive { SignalState::Growing } else { SignalState::Decayed }
    }

    /// Called by a receiving node, once per node that newly handles this
    /// signal. Never goes below zero.
    pub fn decrement_ttl(&mut self) {
        self.ttl = self.ttl.saturating_sub(1);
    }

    pub fn intersects(&self, rect: &Rect) -> bool {
        self.bounds.intersects(rect)
    }

    /// Advance the speed counter. Returns true when the radius grew.
    pub fn grow(&mut self) -> bool {
        if !self.alive {
            return false;
        }
        self.speed_counter += 1;
        if self.speed_counter < self.speed {
            return false;
        }
        self.speed_counter = 0;
        self.radius += 1;
        self.bounds = Rect::around(self.center, self.radius as i32);
        true
    }

    /// Mark decayed if the radius or hop budget is exhausted.
    /// Returns true only on the transition.
    pub fn check_decay(&mut self) -> bool {
        if self.alive && (self.radius >= self.strength || self.ttl == 0) {
            self.alive = false;
            return true;
        }
        false
    }

    /// One propagation step against every node in `nodes`, including nodes
    /// killed earlier this tick that are not yet collected.
    pub fn propagate(
        &mut self,
        nodes: &mut [Node],
        ids: &mut IdCounters,
        config: &SimConfig,
        tick: Tick,
    ) -> Propagation {
        let mut step = Propagation::default();
        if !self.grow() {
            return step;
        }
        step.grew = true;

        for node in nodes.iter_mut() {
            if !self.intersects(&node.rect()) {
                continue;
            }
            let (applied, relay) = match node.receive_signal(self, ids, config) {
                Reception::Duplicate => continue,
                Reception::Delivered { applied, relay } => (applied, relay),
            };
            log::trace!(
                "tick={tick} signal {} reached node {} (ttl now {})",
                self.id,
                node.id(),
                self.ttl
            );
            step.events.push(SimEvent::SignalReceived {
                tick,
                node_id: node.id(),
                signal_id: self.id,
                ttl_after: self.ttl,
                applied,
            });
            if let Some(relay) = relay {
                step.events.push(SimEvent::SignalRelayed {
                    tick,
                    node_id: node.id(),
                    from_signal: self.id,
                    relay_id: relay.id(),
                    ttl: relay.ttl(),
                });
                step.relays.push(relay);
            }
        }

        if self.check_decay() {
            log::debug!(
                "tick={tick} signal {} decayed at radius {} ttl {}",
                self.id,
                self.radius,
                self.ttl
            );
            step.events.push(SimEvent::SignalDecayed {
                tick,
                signal_id: self.id,
                radius: self.radius,
                ttl: self.ttl,
            });
        }
        step
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        surface.ring(self.center, self.radius, self.radius.min(1), self.payload.color);
    }
}

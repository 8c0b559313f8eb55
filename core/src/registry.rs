//! The registry — owns every node and signal for one run and drives ticks.
//!
//! EXECUTION ORDER per tick (fixed, never reordered):
//!   1. Apply queued input events (spawn / kill / quit).
//!   2. If no signal is in flight and a live node exists, a random live
//!      node originates a broadcast in a random palette color.
//!   3. Propagate every signal one step (see RelayPolicy for relays).
//!   4. Render signals, then nodes.
//!   5. Drop dead signals and nodes.
//!
//! RULES:
//!   - Entities refer to each other by ID only; the registry owns them all.
//!   - Nothing is removed mid-tick. Killed nodes stay collision targets
//!     until step 5.
//!   - All randomness flows through the RngBank.
//!   - Only one broadcast wave (plus its relays) is in flight at a time.

use crate::{
    clock::SimClock,
    command::InputEvent,
    config::{RelayPolicy, SimConfig},
    error::{SimError, SimResult},
    event::SimEvent,
    geometry::{Point, Rect},
    ids::IdCounters,
    node::Node,
    rng::{RngBank, StreamSlot},
    signal::Signal,
    snapshot::{NodeView, SignalView, SimSnapshot},
    surface::Surface,
    types::{EntityKind, NodeId, Rgb, RunId, SignalId, Tick, COLOR_CHANGE},
};
use std::collections::VecDeque;

/// Seeded nodes keep this far from every screen edge.
pub const PLACEMENT_MARGIN: i32 = 50;

pub struct Registry {
    pub run_id: RunId,
    pub clock:  SimClock,
    config:     SimConfig,
    rng_bank:   RngBank,
    ids:        IdCounters,
    nodes:      Vec<Node>,
    signals:    Vec<Signal>,
    inputs:     VecDeque<InputEvent>,
}

impl Registry {
    /// An empty registry. Does not validate `config` or seed nodes.
    pub fn new(run_id: RunId, seed: u64, config: SimConfig) -> Self {
        Self {
            clock:    SimClock::new(run_id.clone()),
            rng_bank: RngBank::new(seed),
            ids:      IdCounters::new(),
            nodes:    Vec::new(),
            signals:  Vec::new(),
            inputs:   VecDeque::new(),
            config,
            run_id,
        }
    }

    /// Validate `config` and seed the starting nodes.
    /// Call this instead of new() outside of tests.
    pub fn build(run_id: RunId, seed: u64, config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        let mut registry = Registry::new(run_id, seed, config);
        registry.seed_nodes();
        Ok(registry)
    }

    fn seed_nodes(&mut self) {
        let mut rng = self.rng_bank.for_stream_at_tick(StreamSlot::Placement, 0);
        let max_x = self.config.screen_width as i32 - PLACEMENT_MARGIN;
        let max_y = self.config.screen_height as i32 - PLACEMENT_MARGIN;
        for _ in 0..self.config.starting_node_count {
            let x = rng.range_inclusive(PLACEMENT_MARGIN, max_x);
            let y = rng.range_inclusive(PLACEMENT_MARGIN, max_y);
            self.spawn_node_at(Point::new(x, y));
        }
        log::info!(
            "run={} seeded {} nodes on a {}x{} screen",
            self.run_id,
            self.nodes.len(),
            self.config.screen_width,
            self.config.screen_height
        );
    }

    // ── Collections ────────────────────────────────────────────

    pub fn generate_id(&mut self, kind: EntityKind) -> u64 {
        self.ids.generate(kind)
    }

    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn add_signal(&mut self, signal: Signal) {
        self.signals.push(signal);
    }

    /// Place a configured-size node with its top-left corner at `top_left`.
    pub fn spawn_node_at(&mut self, top_left: Point) -> NodeId {
        let size = self.config.node_size as i32;
        let node = Node::new(
            self.ids.generate(EntityKind::Node),
            Rect::new(top_left.x, top_left.y, size, size),
            vec![COLOR_CHANGE.to_string()],
            self.config.dedup_capacity,
        );
        let id = node.id();
        self.add_node(node);
        id
    }

    /// Have node `node_id` originate a broadcast on the color channel.
    /// Returns None if no such node is in the collection.
    pub fn originate(&mut self, node_id: NodeId, color: Rgb) -> Option<SignalId> {
        let node = self.nodes.iter_mut().find(|n| n.id() == node_id)?;
        let signal = node.create_signal(
            vec![COLOR_CHANGE.to_string()],
            color,
            color,
            &mut self.ids,
            &self.config,
        );
        let id = signal.id();
        self.add_signal(signal);
        Some(id)
    }

    pub fn queue_input(&mut self, event: InputEvent) {
        self.inputs.push_back(event);
    }

    // ── Tick ───────────────────────────────────────────────────

    /// Advance one tick. This is the core simulation step.
    pub fn tick(&mut self, surface: &mut dyn Surface) -> SimResult<Vec<SimEvent>> {
        if !self.clock.running {
            return Err(SimError::RunStopped);
        }
        let tick = self.clock.advance();
        let mut events = vec![SimEvent::TickStarted { tick }];

        self.apply_inputs(tick, &mut events);
        self.maybe_originate(tick, &mut events);
        self.propagate_signals(tick, &mut events);
        self.render(surface);
        self.collect_dead(tick, &mut events);

        events.push(SimEvent::TickCompleted {
            tick,
            live_nodes:   self.nodes.len(),
            live_signals: self.signals.len(),
        });
        if !self.clock.running {
            log::info!("run={} stopped at tick {tick}", self.run_id);
            events.push(SimEvent::RunStopped { tick });
        }
        Ok(events)
    }

    /// Run up to `n` ticks, stopping early on quit.
    /// Returns every event emitted, in order.
    pub fn run_ticks(&mut self, n: u64, surface: &mut dyn Surface) -> SimResult<Vec<SimEvent>> {
        let mut log = Vec::new();
        // RunInitialized at tick 0 so seed differences are observable.
        if self.clock.current_tick == 0 {
            log.push(SimEvent::RunInitialized {
                run_id: self.run_id.clone(),
                seed:   self.rng_bank.master_seed(),
            });
        }
        for _ in 0..n {
            if !self.clock.running {
                break;
            }
            log.extend(self.tick(surface)?);
        }
        Ok(log)
    }

    fn apply_inputs(&mut self, tick: Tick, events: &mut Vec<SimEvent>) {
        while let Some(input) = self.inputs.pop_front() {
            match input {
                InputEvent::SpawnNode { x, y } => {
                    let node_id = self.spawn_node_at(Point::new(x, y));
                    log::debug!("tick={tick} spawned node {node_id} at ({x}, {y})");
                    events.push(SimEvent::NodeSpawned { tick, node_id, x, y });
                }
                InputEvent::KillNode { x, y } => {
                    let point = Point::new(x, y);
                    match self
                        .nodes
                        .iter_mut()
                        .find(|n| n.is_alive() && n.rect().contains(point))
                    {
                        Some(node) => {
                            node.kill();
                            log::debug!("tick={tick} killed node {}", node.id());
                            events.push(SimEvent::NodeKilled { tick, node_id: node.id() });
                        }
                        None => log::debug!("tick={tick} no live node at ({x}, {y})"),
                    }
                }
                InputEvent::Quit => self.clock.stop(),
            }
        }
    }

    fn maybe_originate(&mut self, tick: Tick, events: &mut Vec<SimEvent>) {
        if !self.signals.is_empty() {
            return;
        }
        let live: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|n| n.is_alive())
            .map(|n| n.id())
            .collect();
        let mut rng = self.rng_bank.for_stream_at_tick(StreamSlot::Broadcast, tick);
        let Some(&node_id) = rng.pick(&live) else {
            return;
        };
        let Some(&color) = rng.pick(&self.config.color_palette) else {
            return;
        };
        if let Some(signal_id) = self.originate(node_id, color) {
            log::debug!("tick={tick} node {node_id} originated broadcast {signal_id} color={color:?}");
            events.push(SimEvent::BroadcastOriginated { tick, node_id, signal_id, color });
        }
    }

    fn propagate_signals(&mut self, tick: Tick, events: &mut Vec<SimEvent>) {
        // SameTick re-reads the length every iteration, so relays appended
        // during the pass are visited by it.
        let snapshot_len = match self.config.relay_policy {
            RelayPolicy::SameTick => None,
            RelayPolicy::NextTick => Some(self.signals.len()),
        };
        let mut i = 0;
        while i < snapshot_len.unwrap_or(self.signals.len()) {
            let step = self.signals[i].propagate(&mut self.nodes, &mut self.ids, &self.config, tick);
            events.extend(step.events);
            self.signals.extend(step.relays);
            i += 1;
        }
    }

    /// Draw every live signal, then every live node.
    pub fn render(&self, surface: &mut dyn Surface) {
        for signal in self.signals.iter().filter(|s| s.is_alive()) {
            signal.draw(surface);
        }
        for node in self.nodes.iter().filter(|n| n.is_alive()) {
            node.draw(surface);
        }
    }

    fn collect_dead(&mut self, tick: Tick, events: &mut Vec<SimEvent>) {
        let nodes_before = self.nodes.len();
        let signals_before = self.signals.len();
        self.nodes.retain(|n| n.is_alive());
        self.signals.retain(|s| s.is_alive());
        let nodes = nodes_before - self.nodes.len();
        let signals = signals_before - self.signals.len();
        if nodes > 0 || signals > 0 {
            events.push(SimEvent::EntitiesCollected { tick, nodes, signals });
        }
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn config(&self) -> &SimConfig { &self.config }
    pub fn ids(&self) -> &IdCounters { &self.ids }
    pub fn seed(&self) -> u64 { self.rng_bank.master_seed() }
    pub fn nodes(&self) -> &[Node] { &self.nodes }
    pub fn signals(&self) -> &[Signal] { &self.signals }
    pub fn pending_inputs(&self) -> usize { self.inputs.len() }
    pub fn is_running(&self) -> bool { self.clock.running }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    pub fn signal(&self, id: SignalId) -> Option<&Signal> {
        self.signals.iter().find(|s| s.id() == id)
    }

    pub fn snapshot(&self) -> SimSnapshot {
        SimSnapshot {
            run_id:  self.run_id.clone(),
            tick:    self.clock.current_tick,
            running: self.clock.running,
            nodes:   self.nodes.iter().map(NodeView::from).collect(),
            signals: self.signals.iter().map(SignalView::from).collect(),
        }
    }
}

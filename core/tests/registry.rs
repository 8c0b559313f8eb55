//! Registry tests: tick orchestration, pacing, input handling and cleanup.

use meshflood_core::{
    command::InputEvent,
    config::{RelayPolicy, SimConfig},
    error::SimError,
    event::SimEvent,
    geometry::{Point, Rect},
    registry::Registry,
    signal::{Countdown, Payload, Signal},
    surface::{DrawCommand, FrameRecorder, NullSurface},
    types::{EntityKind, Rgb, COLOR_CHANGE},
};

fn build(config: SimConfig) -> Registry {
    Registry::new("registry-test".into(), 42, config)
}

fn count<F: Fn(&SimEvent) -> bool>(events: &[SimEvent], pred: F) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

fn received_by(events: &[SimEvent], node: u64) -> bool {
    events
        .iter()
        .any(|e| matches!(e, SimEvent::SignalReceived { node_id, .. } if *node_id == node))
}

#[test]
fn ids_are_strictly_increasing_per_kind() {
    let mut registry = build(SimConfig::default_test());
    let mut last_node = 0;
    let mut last_signal = 0;
    for _ in 0..20 {
        let n = registry.generate_id(EntityKind::Node);
        let s = registry.generate_id(EntityKind::Signal);
        assert!(n > last_node);
        assert!(s > last_signal);
        last_node = n;
        last_signal = s;
    }
}

#[test]
fn spawned_node_is_neutral_and_subscribed() {
    let mut registry = build(SimConfig::default_test());
    registry.queue_input(InputEvent::SpawnNode { x: 10, y: 20 });
    let events = registry.tick(&mut NullSurface).unwrap();

    assert!(events.contains(&SimEvent::NodeSpawned { tick: 1, node_id: 1, x: 10, y: 20 }));
    let node = registry.node(1).expect("spawned node");
    assert_eq!(node.rect(), Rect::new(10, 20, 20, 20));
    assert_eq!(node.color(), Rgb::WHITE);
    assert_eq!(node.subscriptions(), [COLOR_CHANGE.to_string()].as_slice());
}

/// With no nodes, nothing is ever broadcast.
#[test]
fn empty_network_never_broadcasts() {
    let mut registry = Registry::build("empty".into(), 7, SimConfig::default_test()).unwrap();
    let events = registry.run_ticks(200, &mut NullSurface).unwrap();

    assert_eq!(count(&events, |e| matches!(e, SimEvent::BroadcastOriginated { .. })), 0);
    assert!(registry.signals().is_empty());
}

/// Pacing rule: a spontaneous broadcast starts only on a tick that began
/// with no signal in flight, so exactly one wave is ever alive.
#[test]
fn broadcast_only_starts_when_no_signal_is_in_flight() {
    let config = SimConfig {
        starting_node_count: 8,
        ..SimConfig::default_test()
    };
    let mut registry = Registry::build("pacing".into(), 99, config).unwrap();

    let mut signals_at_end_of_previous_tick = 0;
    let mut broadcasts = 0;
    for _ in 0..400 {
        let events = registry.tick(&mut NullSurface).unwrap();
        let originated = count(&events, |e| matches!(e, SimEvent::BroadcastOriginated { .. }));
        assert!(originated <= 1);
        if originated == 1 {
            assert_eq!(
                signals_at_end_of_previous_tick, 0,
                "Broadcast originated while signals were still in flight"
            );
            broadcasts += 1;
        }
        signals_at_end_of_previous_tick = registry.signals().len();
    }
    assert!(broadcasts >= 2, "Expected the flood to restart, got {broadcasts} broadcasts");
}

#[test]
fn first_tick_with_nodes_originates_from_a_live_node() {
    let config = SimConfig {
        starting_node_count: 5,
        ..SimConfig::default_test()
    };
    let mut registry = Registry::build("origin".into(), 3, config.clone()).unwrap();
    let events = registry.tick(&mut NullSurface).unwrap();

    let (node_id, color) = events
        .iter()
        .find_map(|e| match e {
            SimEvent::BroadcastOriginated { node_id, color, .. } => Some((*node_id, *color)),
            _ => None,
        })
        .expect("broadcast on first tick");
    assert!(registry.node(node_id).is_some());
    assert!(config.color_palette.contains(&color));
}

#[test]
fn seeded_nodes_respect_placement_margin() {
    let config = SimConfig::default();
    let mut registry = Registry::build("seed".into(), 1234, config).unwrap();
    assert_eq!(registry.nodes().len(), 30);
    for (i, node) in registry.nodes().iter().enumerate() {
        assert_eq!(node.id(), i as u64 + 1);
        let r = node.rect();
        assert!((50..=1150).contains(&r.x), "x out of range: {}", r.x);
        assert!((50..=1050).contains(&r.y), "y out of range: {}", r.y);
        assert_eq!((r.w, r.h), (20, 20));
    }
    registry.tick(&mut NullSurface).unwrap();
}

#[test]
fn build_rejects_invalid_config() {
    let config = SimConfig {
        color_palette: vec![],
        ..SimConfig::default_test()
    };
    let err = Registry::build("bad".into(), 1, config).err().expect("invalid config");
    assert!(matches!(err, SimError::InvalidConfig { field: "color_palette", .. }));
}

/// A node killed at the start of a tick can still be reached by signals
/// during that tick; it is gone from the next tick on.
#[test]
fn killed_node_stays_a_target_until_end_of_tick() {
    let mut registry = build(SimConfig::default_test());
    let origin = registry.spawn_node_at(Point::new(100, 100));
    let victim = registry.spawn_node_at(Point::new(120, 100));
    registry.originate(origin, Rgb(127, 176, 105)).unwrap();

    registry.queue_input(InputEvent::KillNode { x: 125, y: 105 });
    let mut frame = FrameRecorder::new();
    let events = registry.tick(&mut frame).unwrap();

    assert!(events.contains(&SimEvent::NodeKilled { tick: 1, node_id: victim }));
    assert!(received_by(&events, victim), "Killed node should still receive this tick");
    assert_eq!(frame.rect_count(), 1, "Killed node is not drawn");
    assert!(events.iter().any(|e| matches!(e, SimEvent::EntitiesCollected { nodes: 1, .. })));
    assert!(registry.node(victim).is_none());

    let events = registry.tick(&mut NullSurface).unwrap();
    assert!(!received_by(&events, victim));
}

#[test]
fn kill_on_empty_space_does_nothing() {
    let mut registry = build(SimConfig::default_test());
    registry.spawn_node_at(Point::new(100, 100));
    registry.queue_input(InputEvent::KillNode { x: 5, y: 5 });
    let events = registry.tick(&mut NullSurface).unwrap();

    assert_eq!(count(&events, |e| matches!(e, SimEvent::NodeKilled { .. })), 0);
    assert_eq!(registry.nodes().len(), 1);
}

#[test]
fn kill_removes_only_the_first_live_match() {
    let mut registry = build(SimConfig::default_test());
    let first = registry.spawn_node_at(Point::new(100, 100));
    let second = registry.spawn_node_at(Point::new(105, 105));
    registry.queue_input(InputEvent::KillNode { x: 110, y: 110 });
    registry.queue_input(InputEvent::KillNode { x: 110, y: 110 });
    let events = registry.tick(&mut NullSurface).unwrap();

    assert!(events.contains(&SimEvent::NodeKilled { tick: 1, node_id: first }));
    assert!(events.contains(&SimEvent::NodeKilled { tick: 1, node_id: second }));
    assert!(registry.nodes().is_empty());
}

#[test]
fn quit_finishes_the_tick_then_stops() {
    let mut registry = build(SimConfig::default_test());
    registry.spawn_node_at(Point::new(100, 100));
    registry.queue_input(InputEvent::Quit);

    let events = registry.tick(&mut NullSurface).unwrap();
    assert!(events.iter().any(|e| matches!(e, SimEvent::TickCompleted { tick: 1, .. })));
    assert_eq!(events.last(), Some(&SimEvent::RunStopped { tick: 1 }));
    assert!(!registry.is_running());

    assert!(matches!(registry.tick(&mut NullSurface), Err(SimError::RunStopped)));
    let more = registry.run_ticks(10, &mut NullSurface).unwrap();
    assert!(more.is_empty());
    assert_eq!(registry.clock.current_tick, 1);
}

#[test]
fn signals_render_before_nodes() {
    let mut registry = build(SimConfig::default_test());
    registry.spawn_node_at(Point::new(100, 100));
    let mut frame = FrameRecorder::new();
    registry.tick(&mut frame).unwrap();

    assert_eq!(frame.commands.len(), 2);
    assert!(matches!(
        frame.commands[0],
        DrawCommand::Ring { center: Point { x: 110, y: 110 }, radius: 11, width: 1, .. }
    ));
    assert!(matches!(
        frame.commands[1],
        DrawCommand::Rect { color: Rgb::WHITE, .. }
    ));
}

fn single_node_end_to_end(policy: RelayPolicy) -> (Registry, Vec<Vec<SimEvent>>) {
    let config = SimConfig {
        signal_ttl: 1,
        relay_policy: policy,
        ..SimConfig::default_test()
    };
    let strength = config.signal_strength;
    let mut registry = build(config);
    let node_id = registry.spawn_node_at(Point::new(100, 100));
    let center = registry.node(node_id).unwrap().center();

    let instruction = Rgb(243, 222, 138);
    let id = registry.generate_id(EntityKind::Signal);
    registry.add_signal(Signal::new(
        id,
        0,
        center,
        Payload {
            addresses: vec![COLOR_CHANGE.to_string()],
            color_instruction: instruction,
            color: instruction,
        },
        Countdown { ttl: 1, strength, speed: 1 },
    ));

    let mut ticks = Vec::new();
    while !registry.signals().is_empty() {
        assert!(
            ticks.len() < strength as usize,
            "Did not converge within {strength} ticks"
        );
        ticks.push(registry.tick(&mut NullSurface).unwrap());
    }
    let node = registry.node(node_id).unwrap();
    assert_eq!(node.applied_count(), 1, "Node processes the signal exactly once");
    assert_eq!(node.color(), instruction);
    (registry, ticks)
}

/// TTL 1, one node, one injected signal: one delivery, one relay, and
/// the relay decays on its first growth step.
#[test]
fn single_node_flood_converges_same_tick() {
    let (_, ticks) = single_node_end_to_end(RelayPolicy::SameTick);
    assert_eq!(ticks.len(), 1);
    let all: Vec<SimEvent> = ticks.concat();
    assert_eq!(count(&all, |e| matches!(e, SimEvent::SignalRelayed { .. })), 1);
    assert_eq!(count(&all, |e| matches!(e, SimEvent::SignalDecayed { .. })), 2);
}

#[test]
fn single_node_flood_converges_next_tick() {
    let (_, ticks) = single_node_end_to_end(RelayPolicy::NextTick);
    assert_eq!(ticks.len(), 2);
    let all: Vec<SimEvent> = ticks.concat();
    assert_eq!(count(&all, |e| matches!(e, SimEvent::SignalRelayed { .. })), 1);
    assert!(ticks[1]
        .iter()
        .any(|e| matches!(e, SimEvent::SignalDecayed { ttl: 0, radius: 11, .. })));
}

fn three_in_a_row(policy: RelayPolicy) -> (Registry, [u64; 3]) {
    let config = SimConfig {
        relay_policy: policy,
        ..SimConfig::default_test()
    };
    let mut registry = build(config);
    let a = registry.spawn_node_at(Point::new(100, 100));
    let b = registry.spawn_node_at(Point::new(120, 100));
    let c = registry.spawn_node_at(Point::new(140, 100));
    registry.originate(a, Rgb(90, 125, 124)).unwrap();
    (registry, [a, b, c])
}

/// Relays born during a pass are propagated by that same pass, so the
/// flood crosses two hops (A → B → C) in a single tick.
#[test]
fn same_tick_policy_spreads_relays_within_the_tick() {
    let (mut registry, [_, b, c]) = three_in_a_row(RelayPolicy::SameTick);
    let events = registry.tick(&mut NullSurface).unwrap();

    assert!(received_by(&events, b));
    assert!(received_by(&events, c), "C should be reached through B's relay this tick");
    assert!(count(&events, |e| matches!(e, SimEvent::SignalRelayed { .. })) > 1);
}

/// Relays wait for the next tick, so C is only reached on tick 2.
#[test]
fn next_tick_policy_defers_relays() {
    let (mut registry, [_, b, c]) = three_in_a_row(RelayPolicy::NextTick);

    let first = registry.tick(&mut NullSurface).unwrap();
    assert!(received_by(&first, b));
    assert!(!received_by(&first, c));
    assert_eq!(count(&first, |e| matches!(e, SimEvent::SignalRelayed { .. })), 1);

    let second = registry.tick(&mut NullSurface).unwrap();
    assert!(received_by(&second, c));
}

#[test]
fn snapshot_reflects_live_entities() {
    let mut registry = build(SimConfig::default_test());
    registry.spawn_node_at(Point::new(100, 100));
    registry.tick(&mut NullSurface).unwrap();

    let snapshot = registry.snapshot();
    assert_eq!(snapshot.tick, 1);
    assert!(snapshot.running);
    assert_eq!(snapshot.nodes.len(), 1);
    assert_eq!(snapshot.signals.len(), 1);
    assert_eq!(snapshot.signals[0].radius, 11);
    assert_eq!(snapshot.nodes[0].remembered, 1);

    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(json.contains("\"growing\""));
}

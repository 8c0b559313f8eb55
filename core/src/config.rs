//! Run configuration. Fixed at startup, never mutated while ticking.

use crate::{
    error::{SimError, SimResult},
    types::Rgb,
};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which signals a propagation pass visits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RelayPolicy {
    /// Relays born during a pass are visited by that same pass, so a flood
    /// can cross several hops in one tick.
    #[default]
    SameTick,
    /// A pass only visits signals that existed when it started.
    NextTick,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimConfig {
    /// Ticks per radius unit. Lower is faster.
    pub signal_speed: u32,
    /// Initial hop budget of a broadcast.
    pub signal_ttl: u32,
    /// Radius at which a signal decays.
    pub signal_strength: u32,
    pub starting_node_count: usize,
    /// Width and height of every node, in pixels.
    pub node_size: u32,
    pub color_palette: Vec<Rgb>,
    pub screen_width: u32,
    pub screen_height: u32,
    #[serde(default)]
    pub relay_policy: RelayPolicy,
    /// Upper bound on each node's dedup memory. None keeps every ID.
    #[serde(default)]
    pub dedup_capacity: Option<usize>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            signal_speed: 5,
            signal_ttl: 15,
            signal_strength: 350,
            starting_node_count: 30,
            node_size: 20,
            color_palette: vec![
                Rgb(90, 125, 124),
                Rgb(243, 222, 138),
                Rgb(235, 148, 134),
                Rgb(127, 176, 105),
                Rgb(74, 111, 165),
            ],
            screen_width: 1200,
            screen_height: 1100,
            relay_policy: RelayPolicy::SameTick,
            dedup_capacity: None,
        }
    }
}

impl SimConfig {
    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: SimConfig = serde_json::from_str(&content)?;
        config.validate()?;
        log::info!(
            "loaded config from {}: {} starting nodes, ttl={} strength={} speed={}",
            path.display(),
            config.starting_node_count,
            config.signal_ttl,
            config.signal_strength,
            config.signal_speed
        );
        Ok(config)
    }

    /// Fail fast on values the simulation loop cannot run with.
    pub fn validate(&self) -> SimResult<()> {
        fn invalid(field: &'static str, reason: &str) -> SimError {
            SimError::InvalidConfig { field, reason: reason.to_string() }
        }

        if self.signal_speed == 0 {
            return Err(invalid("signal_speed", "must be greater than zero"));
        }
        if self.signal_strength == 0 {
            return Err(invalid("signal_strength", "must be greater than zero"));
        }
        if self.node_size == 0 {
            return Err(invalid("node_size", "must be greater than zero"));
        }
        if self.color_palette.is_empty() {
            return Err(invalid("color_palette", "must contain at least one color"));
        }
        if self.screen_width == 0 {
            return Err(invalid("screen_width", "must be greater than zero"));
        }
        if self.screen_height == 0 {
            return Err(invalid("screen_height", "must be greater than zero"));
        }
        if self.dedup_capacity == Some(0) {
            return Err(invalid("dedup_capacity", "must be greater than zero when set"));
        }
        // Geometry is i32 screen space.
        for (field, value) in [
            ("signal_strength", self.signal_strength),
            ("node_size", self.node_size),
            ("screen_width", self.screen_width),
            ("screen_height", self.screen_height),
        ] {
            if value > i32::MAX as u32 / 4 {
                return Err(invalid(field, "too large for screen coordinates"));
            }
        }
        Ok(())
    }

    /// Small, fast-moving fixture for tests: no starting nodes, speed 1.
    pub fn default_test() -> Self {
        Self {
            signal_speed: 1,
            signal_ttl: 3,
            signal_strength: 40,
            starting_node_count: 0,
            node_size: 20,
            color_palette: vec![Rgb(90, 125, 124), Rgb(243, 222, 138)],
            screen_width: 400,
            screen_height: 400,
            relay_policy: RelayPolicy::SameTick,
            dedup_capacity: None,
        }
    }
}

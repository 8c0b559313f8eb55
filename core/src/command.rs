use serde::{Deserialize, Serialize};

/// Discrete events produced by the input source.
/// Applied at the start of the next tick, in queue order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    /// Place a node of the configured size with its top-left corner at (x, y).
    SpawnNode { x: i32, y: i32 },
    /// Kill the first live node whose box contains (x, y).
    KillNode { x: i32, y: i32 },
    Quit,
}

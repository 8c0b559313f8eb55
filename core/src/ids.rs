use crate::types::EntityKind;
use serde::{Deserialize, Serialize};

/// Per-kind identifier counters. Strictly increasing, never reset during
/// a run. The first ID issued for each kind is 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdCounters {
    node:   u64,
    signal: u64,
}

impl IdCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate(&mut self, kind: EntityKind) -> u64 {
        let counter = match kind {
            EntityKind::Node   => &mut self.node,
            EntityKind::Signal => &mut self.signal,
        };
        *counter += 1;
        *counter
    }

    /// The last ID issued for `kind`, or 0 if none has been.
    pub fn last_issued(&self, kind: EntityKind) -> u64 {
        match kind {
            EntityKind::Node   => self.node,
            EntityKind::Signal => self.signal,
        }
    }
}

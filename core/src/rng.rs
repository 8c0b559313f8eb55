//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through StreamRng instances derived
//! from the single master seed handed to the registry.
//!
//! Each stream is seeded from (master_seed, stream slot, tick). This means:
//!   - Node placement and broadcast picks never share a stream.
//!   - Any tick's rolls are reproducible without replaying earlier ticks.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

use crate::types::Tick;

/// A named, deterministic RNG for one stream at one tick.
pub struct StreamRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl StreamRng {
    /// Create a stream RNG from the master seed, a stable stream index,
    /// and the tick it is drawn for.
    pub fn new(master_seed: u64, stream_index: u64, tick: Tick) -> Self {
        let derived_seed = master_seed
            ^ stream_index.wrapping_mul(0x9e37_79b9_7f4a_7c15)
            ^ tick.wrapping_mul(0xbf58_476d_1ce4_e5b9);
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        use rand::RngCore;
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::Rng;
        assert!(n > 0, "n must be > 0");
        self.inner.gen_range(0..n)
    }

    /// Roll an i32 in [lo, hi], both ends inclusive.
    pub fn range_inclusive(&mut self, lo: i32, hi: i32) -> i32 {
        use rand::Rng;
        if hi <= lo {
            return lo;
        }
        self.inner.gen_range(lo..=hi)
    }

    /// Pick one element uniformly. Returns None for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.next_u64_below(items.len() as u64) as usize;
        items.get(idx)
    }
}

/// Hands out stream RNGs for a single run.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn for_stream_at_tick(&self, slot: StreamSlot, tick: Tick) -> StreamRng {
        StreamRng::new(self.master_seed, slot as u64, tick).with_name(slot.name())
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries — only append.
/// Reordering changes every stream's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Placement = 0,
    Broadcast = 1,
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Placement => "placement",
            Self::Broadcast => "broadcast",
        }
    }
}

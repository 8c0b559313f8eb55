//! meshflood — a managed-flood broadcast simulation.
//!
//! Nodes sit at fixed points on a screen. A node emits a signal, an
//! expanding ring that every node it touches relays once, spending one hop
//! of the signal's TTL, until the ring reaches its maximum radius or its
//! budget runs out. The [`registry::Registry`] owns every entity and
//! drives the per-tick loop; display and input live behind
//! [`surface::Surface`] and [`command::InputEvent`].

pub mod clock;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod geometry;
pub mod ids;
pub mod node;
pub mod registry;
pub mod rng;
pub mod signal;
pub mod snapshot;
pub mod surface;
pub mod types;

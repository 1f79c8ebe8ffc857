//! telemetry/mod.rs
//! Counters, stage timers and immutable snapshots for one streaming session.
//!
//! - Counters are plain fields on the session; no atomics, sessions are single-threaded.
//! - Snapshots serialize with serde for logs and benchmarks.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;

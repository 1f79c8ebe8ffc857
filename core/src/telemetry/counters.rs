// ### `src/telemetry/counters.rs`

//! telemetry/counters.rs
//! Mutable counters used during a streaming session.
//!
//! Summary: Collects byte and chunk counts for the plain pump and both
//! decryption passes. Converted into an immutable TelemetrySnapshot at session end.
use serde::{Deserialize, Serialize};

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    /// Bytes read from the underlying source (all passes).
    pub bytes_read: u64,
    /// Bytes forwarded to the sink.
    pub bytes_emitted: u64,
    /// Chunks MAC'd and checkpointed in pass 1.
    pub chunks_verified: u64,
    /// Chunks re-verified against the ledger in pass 2.
    pub chunks_reverified: u64,
    /// Chunks decrypted and emitted (partially or fully) in pass 2.
    pub chunks_decrypted: u64,
    /// Reads that returned fewer bytes than requested before EOF.
    pub short_reads: u64,
    /// Times the pump lowered its chunk hint.
    pub hint_reductions: u64,
}

impl TelemetryCounters {
    pub fn add_read(&mut self, n: usize) {
        self.bytes_read += n as u64;
    }

    pub fn add_emitted(&mut self, n: usize) {
        self.bytes_emitted += n as u64;
    }

    pub fn add_short_read(&mut self, lowered_hint: bool) {
        self.short_reads += 1;
        if lowered_hint {
            self.hint_reductions += 1;
        }
    }
}

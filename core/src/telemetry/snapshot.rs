// ## src/telemetry/snapshot.rs

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{StageTimes, TelemetryTimer};

/// Immutable end-of-session telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub counters: TelemetryCounters,
    /// Pump hint when the session ended (equals the starting hint on the sealed path).
    pub final_chunk_hint: usize,
    pub throughput_emitted_bytes_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(counters: &TelemetryCounters, timer: &TelemetryTimer, final_chunk_hint: usize) -> Self {
        let elapsed = timer.elapsed();
        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_emitted as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            counters: counters.clone(),
            final_chunk_hint,
            throughput_emitted_bytes_per_sec: throughput,
            elapsed,
            stage_times: timer.stage_times.clone(),
        }
    }

    pub fn total_stage_time(&self) -> Duration {
        self.stage_times.total()
    }

    /// Invariants: stage time never exceeds wall time; pass 2 never re-verifies more than pass 1 recorded.
    pub fn sanity_check(&self) -> bool {
        self.total_stage_time() <= self.elapsed
            && self.counters.chunks_reverified <= self.counters.chunks_verified
            && self.counters.chunks_decrypted <= self.counters.chunks_reverified
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

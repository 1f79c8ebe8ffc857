//! Adaptive byte pump for plain (non-sealed) sources.
//!
//! Streams `[start, end]` from a reader already positioned at `start`.
//! The chunk hint starts at the configured default and only ever shrinks:
//! when a read comes back short and the source still has data, the hint drops
//! to the observed read size. Each chunk handed to the sink is still topped up
//! to its full requested length unless the source is exhausted.

use std::io::{Read, Write};

use tracing::{debug, trace, warn};

use crate::range::ByteSpan;
use crate::stream::io::read_once;
use crate::telemetry::TelemetryCounters;
use crate::types::StreamResult;

#[derive(Debug, Clone)]
pub struct AdaptivePump {
    hint: usize,
}

impl AdaptivePump {
    pub fn new(hint: usize) -> Self {
        Self { hint: hint.max(1) }
    }

    /// Current chunk hint.
    pub fn hint(&self) -> usize {
        self.hint
    }

    /// Forward `span` from `src` to `sink`. Returns bytes forwarded.
    ///
    /// Fewer than `span.len()` bytes means the source ended early.
    /// A sink write failure (e.g. client gone) aborts immediately.
    pub fn pump<R: Read + ?Sized, W: Write + ?Sized>(
        &mut self,
        src: &mut R,
        span: ByteSpan,
        sink: &mut W,
        counters: &mut TelemetryCounters,
    ) -> StreamResult<u64> {
        let mut buf = vec![0u8; self.hint];
        let mut offset = span.start;
        let mut exhausted = false;

        while !exhausted && offset <= span.end {
            let want = (self.hint as u64).min(span.end - offset + 1) as usize;

            let mut filled = read_once(src, &mut buf[..want])?;
            if filled == 0 {
                break;
            }

            if filled < want {
                let observed = filled;
                let mut lowered = false;
                while filled < want {
                    let n = read_once(src, &mut buf[filled..want])?;
                    if n == 0 {
                        exhausted = true;
                        break;
                    }
                    // More data behind a short read: the source is slow, not finished.
                    if !lowered && observed < self.hint {
                        trace!(from = self.hint, to = observed, "lowering pump hint");
                        self.hint = observed;
                        lowered = true;
                    }
                    filled += n;
                }
                counters.add_short_read(lowered);
            }

            counters.add_read(filled);
            if let Err(e) = sink.write_all(&buf[..filled]) {
                warn!(error = %e, offset, "sink write failed; aborting pump");
                return Err(e.into());
            }
            counters.add_emitted(filled);
            offset += filled as u64;
        }

        let forwarded = offset - span.start;
        if forwarded < span.len() {
            debug!(forwarded, expected = span.len(), "source exhausted before end of span");
        }
        Ok(forwarded)
    }
}

// # 📂 `src/stream/decrypt.rs`

//! Two-pass authenticated streaming decryption.
//!
//! Pass 1 (verify): MAC header ‖ ciphertext chunk by chunk, record a running
//! digest per chunk in the ledger, compare the final digest with the trailing
//! MAC. Emits nothing.
//!
//! Pass 2 (decrypt): reopen the source, recompute the same running MAC,
//! check each chunk's digest against the ledger *before* touching its
//! plaintext, then decrypt under AES-CTR and emit.
//!
//! Both passes read from a freshly opened handle, so seekable and
//! forward-only sources behave the same. Chunk boundaries are identical in
//! both passes because the ledger is positional.
//!
//! Ranged output: every chunk is read and MAC-checked from the start of the
//! ciphertext, but only chunks overlapping the requested span are decrypted,
//! and emission is trimmed to the span. Pass 2 stops after the chunk holding
//! the span's last byte.

use std::io::Write;

use tracing::{debug, trace, warn};

use crate::config::validate_cipher_chunk;
use crate::constants::MAC_LEN;
use crate::container::{decode::read_fixed, ContainerLayout};
use crate::crypto::{
    derive_keys, digests_equal, ChunkMacLedger, CounterState, DerivedKeys, IntegrityError, RunningMac,
};
use crate::range::ByteSpan;
use crate::source::{ByteSource, SourceHandle};
use crate::stream::io::read_exact_or_eof;
use crate::telemetry::TelemetryCounters;
use crate::types::{StreamError, StreamResult};

#[derive(Debug)]
pub struct StreamingDecryptor {
    layout: ContainerLayout,
    keys: DerivedKeys,
    chunk_size: usize,
}

impl StreamingDecryptor {
    /// Derive keys for `layout` from the caller secret.
    ///
    /// `chunk_size` must be a whole number of cipher blocks (`Config` error otherwise).
    pub fn new(layout: ContainerLayout, secret: &[u8], chunk_size: usize) -> StreamResult<Self> {
        validate_cipher_chunk("decrypt chunk size", chunk_size)?;
        let keys = derive_keys(secret, &layout.header.salt)?;
        Self::with_keys(layout, keys, chunk_size)
    }

    pub fn with_keys(layout: ContainerLayout, keys: DerivedKeys, chunk_size: usize) -> StreamResult<Self> {
        validate_cipher_chunk("decrypt chunk size", chunk_size)?;
        Ok(Self { layout, keys, chunk_size })
    }

    pub fn layout(&self) -> &ContainerLayout {
        &self.layout
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of chunks covering the ciphertext region.
    pub fn chunk_count(&self) -> u64 {
        self.layout.cipher_len.div_ceil(self.chunk_size as u64)
    }

    /// Pass 1: verify the whole container and produce the chunk ledger.
    ///
    /// For forward-only sources the trailing MAC is read here, right after the
    /// ciphertext, and remembered in the layout.
    pub fn verify(
        &mut self,
        source: &dyn ByteSource,
        counters: &mut TelemetryCounters,
    ) -> StreamResult<ChunkMacLedger> {
        let mut handle = self.open_at_ciphertext(source)?;
        let mut mac = RunningMac::for_container(&self.keys.authentication, &self.layout.header)?;
        let mut ledger = ChunkMacLedger::new();
        let mut buf = vec![0u8; self.chunk_size];

        let mut offset = 0u64;
        while offset < self.layout.cipher_len {
            let want = self.chunk_len_at(offset);
            let got = read_exact_or_eof(&mut handle, &mut buf[..want])?;
            counters.add_read(got);
            if got < want {
                return Err(self.truncated(offset + got as u64).into());
            }

            mac.update(&buf[..want]);
            ledger.record(mac.snapshot());
            counters.chunks_verified += 1;
            offset += want as u64;
        }

        let trailing = match self.layout.mac {
            Some(stored) => stored,
            None => {
                let mut trailer = [0u8; MAC_LEN];
                read_fixed(&mut handle, &mut trailer).map_err(|_| {
                    StreamError::Integrity(IntegrityError::Truncated {
                        expected: self.layout.total_len,
                        actual: handle.position(),
                    })
                })?;
                counters.add_read(MAC_LEN);
                self.layout.mac = Some(trailer);
                trailer
            }
        };

        if !digests_equal(&mac.finalize(), &trailing) {
            warn!(source = source.id(), "final MAC mismatch");
            return Err(IntegrityError::FinalMacMismatch.into());
        }

        debug!(chunks = ledger.len(), "pass 1 verified");
        Ok(ledger)
    }

    /// Pass 2: re-verify against `ledger`, decrypt, and emit `span` (whole plaintext if `None`).
    ///
    /// Returns plaintext bytes written to `sink`.
    pub fn decrypt(
        &self,
        source: &dyn ByteSource,
        mut ledger: ChunkMacLedger,
        span: Option<ByteSpan>,
        sink: &mut dyn Write,
        counters: &mut TelemetryCounters,
    ) -> StreamResult<u64> {
        let span = match span.or_else(|| ByteSpan::whole(self.layout.cipher_len)) {
            Some(span) => span,
            None => {
                ledger.finish()?;
                return Ok(0);
            }
        };
        if span.end >= self.layout.cipher_len {
            return Err(StreamError::RangeNotSatisfiable { size: self.layout.cipher_len });
        }

        let mut handle = self.open_at_ciphertext(source)?;
        let mut mac = RunningMac::for_container(&self.keys.authentication, &self.layout.header)?;
        let mut counter = CounterState::new(self.layout.header.iv);
        let mut buf = vec![0u8; self.chunk_size];
        let mut emitted = 0u64;

        let mut offset = 0u64;
        while offset < self.layout.cipher_len {
            let want = self.chunk_len_at(offset);
            let got = read_exact_or_eof(&mut handle, &mut buf[..want])?;
            counters.add_read(got);
            if got < want {
                return Err(self.truncated(offset + got as u64).into());
            }

            mac.update(&buf[..want]);
            ledger.expect_next(&mac.snapshot())?;
            counters.chunks_reverified += 1;

            let chunk_end = offset + want as u64 - 1;
            if chunk_end >= span.start {
                counter.apply(&self.keys.encryption, &mut buf[..want]);
                let from = span.start.saturating_sub(offset) as usize;
                let to = (span.end.min(chunk_end) - offset) as usize;
                sink.write_all(&buf[from..=to])?;
                counters.chunks_decrypted += 1;
                counters.add_emitted(to - from + 1);
                emitted += (to - from + 1) as u64;
                trace!(offset, from, to, "chunk emitted");
            }

            counter.advance_for_chunk(self.chunk_size);
            offset += want as u64;

            if chunk_end >= span.end {
                break;
            }
        }

        if offset >= self.layout.cipher_len {
            ledger.finish()?;
        } else {
            debug!(remaining = ledger.len(), "pass 2 stopped after end of span");
        }

        debug!(emitted, "pass 2 complete");
        Ok(emitted)
    }

    /// Both passes back to back.
    pub fn run(
        &mut self,
        source: &dyn ByteSource,
        span: Option<ByteSpan>,
        sink: &mut dyn Write,
        counters: &mut TelemetryCounters,
    ) -> StreamResult<u64> {
        let ledger = self.verify(source, counters)?;
        self.decrypt(source, ledger, span, sink, counters)
    }

    fn open_at_ciphertext(&self, source: &dyn ByteSource) -> StreamResult<SourceHandle> {
        let mut handle = source.open()?;
        handle.seek_to(self.layout.cipher_start)?;
        Ok(handle)
    }

    fn chunk_len_at(&self, offset: u64) -> usize {
        (self.chunk_size as u64).min(self.layout.cipher_len - offset) as usize
    }

    fn truncated(&self, actual_cipher_bytes: u64) -> IntegrityError {
        IntegrityError::Truncated {
            expected: self.layout.cipher_len,
            actual: actual_cipher_bytes,
        }
    }
}

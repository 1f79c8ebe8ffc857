// ## 📂 File: `src/stream/session.rs`
// ## One logical transfer: negotiate → assemble → pump | verify + decrypt

//! A `StreamSession` owns one resource and serves exactly one response.
//!
//! Lifecycle:
//! 1. Negotiate the range against the plaintext size and assemble the head.
//! 2. `NotSatisfiable` → emit a bodyless 416 (or surface the error when heads
//!    are suppressed). No source bytes are read.
//! 3. Negotiate again to fix the span on the descriptor, then stream it:
//!    plain sources through the adaptive pump, sealed sources through both
//!    decryption passes. For sealed sources pass 1 completes before the head
//!    is emitted, so a tampered container never produces a success status.
//!
//! Every handle is opened inside the step that needs it and dropped on return,
//! error paths included.

use std::io::Write;

use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::container::locate;
use crate::crypto::ChunkMacLedger;
use crate::range::{negotiate, ByteSpan};
use crate::source::{resolve_location, ByteSource, DefaultMetadataProvider, MetadataCache, ResourceMetadata};
use crate::stream::decrypt::StreamingDecryptor;
use crate::stream::pump::AdaptivePump;
use crate::stream::response::{assemble, HeaderEmitter, ResponseHead};
use crate::telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::{StreamError, StreamResult};

/// The resource one session serves.
///
/// Immutable after construction except for the span, which is fixed once
/// right before the first byte is read.
pub struct ResourceDescriptor {
    source: Box<dyn ByteSource>,
    size: u64,
    encrypted: bool,
    span: Option<ByteSpan>,
}

impl ResourceDescriptor {
    pub fn source(&self) -> &dyn ByteSource {
        self.source.as_ref()
    }

    /// Plaintext-equivalent size (ciphertext region length when sealed).
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    pub fn span(&self) -> Option<ByteSpan> {
        self.span
    }

    fn fix_span(&mut self, span: ByteSpan) {
        debug_assert!(self.span.is_none(), "span fixed twice");
        self.span = Some(span);
    }
}

enum Mode {
    Plain,
    Sealed(StreamingDecryptor),
}

/// Result of a completed `respond`.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub head: ResponseHead,
    pub bytes_emitted: u64,
    /// Span fixed on the descriptor before any source byte was read; `None` for 416 and empty bodies.
    pub span: Option<ByteSpan>,
    pub telemetry: TelemetrySnapshot,
}

pub struct StreamSession {
    descriptor: ResourceDescriptor,
    metadata: ResourceMetadata,
    mode: Mode,
    pump: AdaptivePump,
    config: SessionConfig,
    counters: TelemetryCounters,
    timer: TelemetryTimer,
}

impl StreamSession {
    /// Session over a plain source.
    pub fn open_plain(
        source: Box<dyn ByteSource>,
        metadata: ResourceMetadata,
        config: SessionConfig,
    ) -> StreamResult<Self> {
        config.validate()?;
        let size = source.size();
        let metadata = ResourceMetadata { size, ..metadata };
        Ok(Self::assemble_session(source, size, false, metadata, Mode::Plain, config, TelemetryTimer::new()))
    }

    /// Session over a sealed container. Locates the layout and derives keys up front;
    /// `metadata.size` is replaced by the plaintext size.
    pub fn open_sealed(
        source: Box<dyn ByteSource>,
        metadata: ResourceMetadata,
        secret: &[u8],
        config: SessionConfig,
    ) -> StreamResult<Self> {
        config.validate()?;
        let mut timer = TelemetryTimer::new();
        let layout = timer.time(Stage::Locate, || locate(source.as_ref()))?;
        let size = layout.plaintext_len();
        let decryptor = StreamingDecryptor::new(layout, secret, config.decrypt_chunk_size)?;
        let metadata = ResourceMetadata { size, ..metadata };
        Ok(Self::assemble_session(source, size, true, metadata, Mode::Sealed(decryptor), config, timer))
    }

    /// Resolve `location`, describe it through `cache`, and open a plain or sealed session.
    pub fn open_location(
        location: &str,
        cache: &mut MetadataCache,
        secret: Option<&[u8]>,
        config: SessionConfig,
    ) -> StreamResult<Self> {
        let source = resolve_location(location, cache, &config.http)?;
        let metadata = cache.describe_with(&DefaultMetadataProvider, source.as_ref())?;
        match secret {
            Some(secret) => Self::open_sealed(source, metadata, secret, config),
            None => Self::open_plain(source, metadata, config),
        }
    }

    fn assemble_session(
        source: Box<dyn ByteSource>,
        size: u64,
        encrypted: bool,
        metadata: ResourceMetadata,
        mode: Mode,
        config: SessionConfig,
        timer: TelemetryTimer,
    ) -> Self {
        debug!(id = source.id(), size, encrypted, "session opened");
        Self {
            descriptor: ResourceDescriptor { source, size, encrypted, span: None },
            metadata,
            mode,
            pump: AdaptivePump::new(config.chunk_hint),
            config,
            counters: TelemetryCounters::default(),
            timer,
        }
    }

    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    pub fn metadata(&self) -> &ResourceMetadata {
        &self.metadata
    }

    /// Response head for `range` without touching the source.
    pub fn head(&self, range: Option<&str>) -> ResponseHead {
        assemble(&negotiate(range, self.descriptor.size), &self.metadata, self.config.disposition)
    }

    /// Serve `range` into `sink`, emitting the head through `emitter` when heads are enabled.
    pub fn respond(
        mut self,
        range: Option<&str>,
        emitter: Option<&mut dyn HeaderEmitter>,
        sink: &mut dyn Write,
    ) -> StreamResult<SessionOutcome> {
        let size = self.descriptor.size;
        let (negotiation, head) = self.timer.time(Stage::Negotiate, || {
            let negotiation = negotiate(range, size);
            let head = assemble(&negotiation, &self.metadata, self.config.disposition);
            (negotiation, head)
        });

        if !negotiation.is_satisfiable() {
            if !self.config.send_headers {
                return Err(StreamError::RangeNotSatisfiable { size });
            }
            debug!(id = self.descriptor.source.id(), ?range, size, "range not satisfiable");
            self.emit(emitter, &head)?;
            return Ok(self.finish(head, 0));
        }

        // Recomputed right before reading; must agree with the head.
        let span = negotiate(range, size).span();
        debug_assert_eq!(span, negotiation.span());
        if let Some(span) = span {
            self.descriptor.fix_span(span);
        }

        let emitted = match std::mem::replace(&mut self.mode, Mode::Plain) {
            Mode::Plain => {
                self.emit(emitter, &head)?;
                match span {
                    Some(span) => self.stream_plain(span, sink)?,
                    None => 0,
                }
            }
            Mode::Sealed(mut decryptor) => {
                let ledger = self.verify(&mut decryptor)?;
                self.emit(emitter, &head)?;
                self.stream_sealed(&decryptor, ledger, span, sink)?
            }
        };

        if let Some(span) = span {
            if emitted < span.len() {
                warn!(emitted, expected = span.len(), "response body shorter than negotiated span");
            }
        }
        info!(
            id = self.descriptor.source.id(),
            status = head.status,
            emitted,
            encrypted = self.descriptor.encrypted,
            "response complete"
        );
        Ok(self.finish(head, emitted))
    }

    fn emit(&self, emitter: Option<&mut dyn HeaderEmitter>, head: &ResponseHead) -> StreamResult<()> {
        if !self.config.send_headers {
            return Ok(());
        }
        if let Some(emitter) = emitter {
            emitter.emit(head)?;
        }
        Ok(())
    }

    fn stream_plain(&mut self, span: ByteSpan, sink: &mut dyn Write) -> StreamResult<u64> {
        let Self { descriptor, pump, counters, timer, .. } = self;
        timer.time(Stage::Pump, || {
            let mut handle = descriptor.source.open()?;
            handle.seek_to(span.start)?;
            pump.pump(&mut handle, span, sink, counters)
        })
    }

    fn verify(&mut self, decryptor: &mut StreamingDecryptor) -> StreamResult<ChunkMacLedger> {
        let Self { descriptor, counters, timer, .. } = self;
        timer.time(Stage::Verify, || decryptor.verify(descriptor.source.as_ref(), counters))
    }

    fn stream_sealed(
        &mut self,
        decryptor: &StreamingDecryptor,
        ledger: ChunkMacLedger,
        span: Option<ByteSpan>,
        sink: &mut dyn Write,
    ) -> StreamResult<u64> {
        let Self { descriptor, counters, timer, .. } = self;
        timer.time(Stage::Decrypt, || decryptor.decrypt(descriptor.source.as_ref(), ledger, span, sink, counters))
    }

    fn finish(mut self, head: ResponseHead, bytes_emitted: u64) -> SessionOutcome {
        self.timer.finish();
        let telemetry = TelemetrySnapshot::from(&self.counters, &self.timer, self.pump.hint());
        SessionOutcome { head, bytes_emitted, span: self.descriptor.span, telemetry }
    }
}

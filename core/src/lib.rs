//! rangeseal-core
//!
//! Range-aware streaming of plain and sealed (encrypted + authenticated) resources.
//! Pure Rust, blocking I/O, one session per transfer.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod config;
pub mod range;

// Container format + crypto provider
pub mod container;
pub mod crypto;

// Sources and stream layers
pub mod source;
pub mod stream;
pub mod telemetry;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::config::{Disposition, SessionConfig};
    pub use crate::range::{negotiate, ByteSpan, Negotiation};
    pub use crate::source::{
        resolve_location, ByteSource, HttpConfig, LocalSource, MemorySource, MetadataCache, ResourceMetadata,
    };
    pub use crate::stream::{
        seal, seal_bytes, CollectingEmitter, HeaderEmitter, OutputSink, ResponseHead, SessionOutcome,
        StreamSession,
    };
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::types::{StreamError, StreamResult};
}

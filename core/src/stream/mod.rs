//! stream/mod.rs
//! Streaming layer: sinks, the adaptive pump, two-pass decryption, sealing,
//! response heads and the session that ties them together.

pub mod io;
pub mod pump;
pub mod decrypt;
pub mod seal;
pub mod response;
pub mod session;

pub use io::{open_output, read_exact_or_eof, OutputSink};
pub use pump::AdaptivePump;
pub use decrypt::StreamingDecryptor;
pub use seal::{seal, seal_bytes, seal_with};
pub use response::{assemble, CollectingEmitter, HeaderEmitter, ResponseHead};
pub use session::{ResourceDescriptor, SessionOutcome, StreamSession};

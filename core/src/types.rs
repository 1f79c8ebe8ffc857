use std::io;
use thiserror::Error;

use crate::container::FormatError;
use crate::crypto::{CryptoError, IntegrityError};

/// Unified session error covering source, range, container, crypto and I/O failures.
/// - `From<T>` impls enable `?` across the pipeline.
/// - Everything except `RangeNotSatisfiable` is fatal to the session.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Source does not exist or could not be opened.
    #[error("cannot open source {location}: {reason}")]
    OpenFailure { location: String, reason: String },

    /// Location is neither a local path nor an HTTP(S) URL.
    #[error("unsupported source location: {location}")]
    UnsupportedSource { location: String },

    /// Range header cannot be satisfied against a resource of `size` bytes.
    #[error("range not satisfiable for resource of {size} bytes")]
    RangeNotSatisfiable { size: u64 },

    /// Container header malformed.
    #[error("container format error: {0}")]
    Format(#[from] FormatError),

    /// Final MAC mismatch or pass-1/pass-2 divergence.
    #[error("integrity error: {0}")]
    Integrity(#[from] IntegrityError),

    /// Seek/read/write failure on the source or sink.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Cryptographic primitive unavailable or misbehaving.
    #[error("environment error: {0}")]
    Environment(#[from] CryptoError),

    /// Rejected session configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StreamError {
    /// `RangeNotSatisfiable` is the only caller-recoverable variant (maps to 416).
    pub fn is_fatal(&self) -> bool {
        !matches!(self, StreamError::RangeNotSatisfiable { .. })
    }

    pub(crate) fn open_failure(location: &str, reason: impl std::fmt::Display) -> Self {
        StreamError::OpenFailure { location: location.to_string(), reason: reason.to_string() }
    }
}

pub type StreamResult<T> = Result<T, StreamError>;

//! Session configuration.

use crate::constants::{BLOCK_LEN, DEFAULT_CHUNK_HINT, DEFAULT_DECRYPT_CHUNK_SIZE, MAX_CHUNK_SIZE};
use crate::source::HttpConfig;
use crate::types::StreamError;

/// `Content-Disposition` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    #[default]
    Attachment,
    Inline,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Attachment => "attachment",
            Disposition::Inline => "inline",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Starting chunk hint for the plain pump (shrinks on short reads, never grows).
    pub chunk_hint: usize,
    /// MAC/decrypt chunk size for sealed sources. Must be a non-zero multiple of the cipher block.
    pub decrypt_chunk_size: usize,
    pub disposition: Disposition,
    /// Emit response heads through the caller's emitter.
    /// When off, an unsatisfiable range surfaces as `RangeNotSatisfiable`.
    pub send_headers: bool,
    pub http: HttpConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            chunk_hint: DEFAULT_CHUNK_HINT,
            decrypt_chunk_size: DEFAULT_DECRYPT_CHUNK_SIZE,
            disposition: Disposition::Attachment,
            send_headers: true,
            http: HttpConfig::default(),
        }
    }
}

/// Cipher-side chunk sizes must be whole AES blocks: the CTR counter advances
/// `chunk / BLOCK_LEN` blocks per chunk.
pub fn validate_cipher_chunk(name: &str, chunk_size: usize) -> Result<(), StreamError> {
    if chunk_size == 0 || chunk_size > MAX_CHUNK_SIZE || chunk_size % BLOCK_LEN != 0 {
        return Err(StreamError::Config(format!(
            "{name} must be a multiple of {BLOCK_LEN} in {BLOCK_LEN}..={MAX_CHUNK_SIZE}, got {chunk_size}"
        )));
    }
    Ok(())
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), StreamError> {
        if self.chunk_hint == 0 || self.chunk_hint > MAX_CHUNK_SIZE {
            return Err(StreamError::Config(format!(
                "chunk_hint must be in 1..={MAX_CHUNK_SIZE}, got {}",
                self.chunk_hint
            )));
        }
        validate_cipher_chunk("decrypt_chunk_size", self.decrypt_chunk_size)
    }

    pub fn with_disposition(mut self, disposition: Disposition) -> Self {
        self.disposition = disposition;
        self
    }

    pub fn without_headers(mut self) -> Self {
        self.send_headers = false;
        self
    }
}

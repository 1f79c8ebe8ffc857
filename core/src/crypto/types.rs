// ## 📂 File: `src/crypto/types.rs`

use thiserror::Error;

use crate::constants::{KEY_LEN_32, MAC_LEN};

/// Running MAC digest (HMAC-SHA256 output).
pub type MacDigest = [u8; MAC_LEN];

/// Key pair derived from (salt, secret).
/// - `encryption`: AES-256-CTR key
/// - `authentication`: HMAC-SHA256 key
#[derive(Clone)]
pub struct DerivedKeys {
    pub encryption: [u8; KEY_LEN_32],
    pub authentication: [u8; KEY_LEN_32],
}

// Never print key material.
impl std::fmt::Debug for DerivedKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKeys").finish_non_exhaustive()
    }
}

/// Primitive-provider failures (environment errors).
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Caller secret is empty.
    #[error("secret must not be empty")]
    EmptySecret,

    /// Salt is all zeros.
    #[error("invalid salt: all zeros")]
    InvalidSalt,

    /// Key length rejected by a primitive.
    #[error("invalid key length: expected={expected}, actual={actual}")]
    InvalidKeyLen { expected: usize, actual: usize },

    /// HKDF expand failed.
    #[error("key derivation failed: {0}")]
    Kdf(String),

    /// Random source failed.
    #[error("random generator failure: {0}")]
    Rng(String),
}

/// Tamper evidence raised by the two-pass decryptor.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntegrityError {
    /// Pass 1 final digest differs from the container's trailing MAC.
    #[error("final MAC mismatch: container was modified or the secret is wrong")]
    FinalMacMismatch,

    /// Pass 2 checkpoint differs from pass 1 at `chunk`.
    #[error("chunk {chunk} changed between verification and decryption")]
    LedgerMismatch { chunk: u64 },

    /// Pass 2 read more chunks than pass 1 recorded.
    #[error("chunk {chunk} has no recorded checkpoint")]
    LedgerExhausted { chunk: u64 },

    /// Pass 2 finished with checkpoints left over.
    #[error("{remaining} recorded checkpoints were never consumed")]
    LedgerNotDrained { remaining: usize },

    /// Source ended before the region declared by the container layout.
    #[error("source truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: u64, actual: u64 },
}

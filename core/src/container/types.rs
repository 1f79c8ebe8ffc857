// ## 📂 File: `src/container/types.rs`

//! container/types.rs
//! Sealed container header and located layout.
//!
//! Layout (fixed fields in order, then variable ciphertext, then trailing MAC):
//!
//! ```text
//! [version_tag: 4][salt: 32][iv: 16][ciphertext: N][mac: 32]
//! ```

use thiserror::Error;

use crate::constants::{CONTAINER_HEADER_LEN, CONTAINER_VERSION_TAG, IV_LEN, MAC_LEN, SALT_LEN, VERSION_TAG_LEN};
use crate::crypto::MacDigest;

/// Fixed-size header fields. Authenticated, not encrypted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHeader {
    pub version: [u8; VERSION_TAG_LEN],
    pub salt: [u8; SALT_LEN],
    pub iv: [u8; IV_LEN],
}

impl ContainerHeader {
    pub const LEN: usize = CONTAINER_HEADER_LEN;

    pub fn new(salt: [u8; SALT_LEN], iv: [u8; IV_LEN]) -> Self {
        Self { version: CONTAINER_VERSION_TAG, salt, iv }
    }

    pub fn validate(&self) -> Result<(), FormatError> {
        if self.version != CONTAINER_VERSION_TAG {
            return Err(FormatError::BadVersion { found: self.version });
        }
        Ok(())
    }
}

/// Where everything lives inside one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerLayout {
    pub header: ContainerHeader,
    /// Total container length in bytes.
    pub total_len: u64,
    /// Offset of the first ciphertext byte.
    pub cipher_start: u64,
    /// Ciphertext region length (= plaintext length under CTR).
    pub cipher_len: u64,
    /// Trailing MAC. `None` for forward-only sources until pass 1 reaches it.
    pub mac: Option<MacDigest>,
}

impl ContainerLayout {
    /// Offset of the last ciphertext byte; `None` when the region is empty.
    pub fn cipher_end(&self) -> Option<u64> {
        (self.cipher_len > 0).then(|| self.cipher_start + self.cipher_len - 1)
    }

    pub fn mac_offset(&self) -> u64 {
        self.total_len - MAC_LEN as u64
    }

    pub fn plaintext_len(&self) -> u64 {
        self.cipher_len
    }
}

/// Ciphertext region length, or `NegativeRegion` when the container is too short.
pub fn cipher_region_len(total_len: u64) -> Result<u64, FormatError> {
    let overhead = (CONTAINER_HEADER_LEN + MAC_LEN) as u64;
    total_len
        .checked_sub(overhead)
        .ok_or(FormatError::NegativeRegion { total_len, overhead })
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// Version tag is not the single supported value.
    #[error("unsupported version tag {}", hex::encode(found))]
    BadVersion { found: [u8; VERSION_TAG_LEN] },

    /// Container shorter than header + MAC.
    #[error("ciphertext region would be negative: total {total_len} < overhead {overhead}")]
    NegativeRegion { total_len: u64, overhead: u64 },

    /// Buffer shorter than a fixed field run.
    #[error("buffer too short: have={have}, need={need}")]
    BufferTooShort { have: usize, need: usize },
}

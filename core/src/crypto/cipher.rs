//! AES-256-CTR keystream with an explicit, caller-advanced counter.
//!
//! The counter block is the full 16-byte IV read as a big-endian integer
//! (`Ctr128BE`). Each chunk starts a fresh keystream at the current counter,
//! then the caller advances it by `chunk_size / BLOCK_LEN` blocks.

use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};

use crate::constants::{BLOCK_LEN, IV_LEN};

type Aes256Ctr = ctr::Ctr128BE<Aes256>;

/// Counter state owned by one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterState {
    iv: [u8; IV_LEN],
}

impl CounterState {
    pub fn new(iv: [u8; IV_LEN]) -> Self {
        Self { iv }
    }

    pub fn current(&self) -> &[u8; IV_LEN] {
        &self.iv
    }

    /// Apply the keystream at the current counter to `buf` in place.
    /// CTR encrypt == decrypt.
    pub fn apply(&self, key: &[u8; 32], buf: &mut [u8]) {
        let mut cipher = Aes256Ctr::new(key.into(), (&self.iv).into());
        cipher.apply_keystream(buf);
    }

    /// Advance by the number of whole blocks in `chunk_size` (integer division).
    pub fn advance_for_chunk(&mut self, chunk_size: usize) {
        self.iv = increment_counter(&self.iv, (chunk_size / BLOCK_LEN) as u64);
    }
}

/// Add `blocks` to a 128-bit big-endian counter, wrapping on overflow.
pub fn increment_counter(iv: &[u8; IV_LEN], blocks: u64) -> [u8; IV_LEN] {
    let value = u128::from_be_bytes(*iv).wrapping_add(u128::from(blocks));
    value.to_be_bytes()
}

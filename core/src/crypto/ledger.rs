// ## 📂 File: `src/crypto/ledger.rs`

//! Chunk MAC ledger: positional checkpoints from pass 1, consumed by pass 2.
//!
//! Invariants:
//! - One entry per ciphertext chunk, in read order.
//! - Pass 2 dequeues exactly one entry per chunk; values compared in constant time.
//! - After the last chunk the ledger is empty.

use std::collections::VecDeque;

use crate::crypto::mac::digests_equal;
use crate::crypto::types::{IntegrityError, MacDigest};

#[derive(Debug, Default, Clone)]
pub struct ChunkMacLedger {
    entries: VecDeque<MacDigest>,
    consumed: u64,
}

impl ChunkMacLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pass 1: append the running digest after a chunk.
    pub fn record(&mut self, digest: MacDigest) {
        self.entries.push_back(digest);
    }

    /// Pass 2: dequeue the next checkpoint and compare it to `actual`.
    pub fn expect_next(&mut self, actual: &MacDigest) -> Result<(), IntegrityError> {
        let chunk = self.consumed;
        let expected = self
            .entries
            .pop_front()
            .ok_or(IntegrityError::LedgerExhausted { chunk })?;
        self.consumed += 1;

        if !digests_equal(&expected, actual) {
            return Err(IntegrityError::LedgerMismatch { chunk });
        }
        Ok(())
    }

    /// Pass 2 reached the final chunk: nothing may remain.
    pub fn finish(&self) -> Result<(), IntegrityError> {
        if !self.entries.is_empty() {
            return Err(IntegrityError::LedgerNotDrained { remaining: self.entries.len() });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

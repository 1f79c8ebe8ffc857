// ## 📂 File: `src/crypto/mac.rs`

//! Running HMAC-SHA256 with per-chunk snapshots.
//!
//! Design notes:
//! - Snapshot = digest of everything fed so far; the context keeps running.
//! - All digest comparisons are constant-time.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::constants::KEY_LEN_32;
use crate::container::ContainerHeader;
use crate::crypto::types::{CryptoError, MacDigest};

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct RunningMac {
    inner: HmacSha256,
}

impl RunningMac {
    pub fn new(auth_key: &[u8]) -> Result<Self, CryptoError> {
        let inner = <HmacSha256 as Mac>::new_from_slice(auth_key).map_err(|_| {
            CryptoError::InvalidKeyLen { expected: KEY_LEN_32, actual: auth_key.len() }
        })?;
        Ok(Self { inner })
    }

    /// Context already fed with version tag, salt and IV (in that order).
    /// Both passes start from here so their digests line up chunk for chunk.
    pub fn for_container(auth_key: &[u8], header: &ContainerHeader) -> Result<Self, CryptoError> {
        let mut mac = Self::new(auth_key)?;
        mac.update(&header.version);
        mac.update(&header.salt);
        mac.update(&header.iv);
        Ok(mac)
    }

    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Digest of the input so far, without consuming the context.
    #[inline]
    pub fn snapshot(&self) -> MacDigest {
        self.inner.clone().finalize().into_bytes().into()
    }

    #[inline]
    pub fn finalize(self) -> MacDigest {
        self.inner.finalize().into_bytes().into()
    }
}

/// Constant-time equality for MAC digests of any length.
#[inline]
pub fn digests_equal(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

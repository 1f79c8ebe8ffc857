// ## src/crypto/kdf.rs

//! crypto/kdf.rs
//! HKDF-based key derivation from caller secret and container salt.
//!
//! Design:
//! - HKDF-Extract(salt, secret) -> PRK
//! - HKDF-Expand(PRK, info) -> encryption key, authentication key (32 bytes each)
//!
//! Salt is random per container. Distinct info labels keep the two keys independent.

use hkdf::Hkdf;
use sha2::Sha256;

use crate::constants::{KDF_INFO_AUTHENTICATION, KDF_INFO_ENCRYPTION, KEY_LEN_32, SALT_LEN};
use crate::crypto::types::{CryptoError, DerivedKeys};

/// Derive the encryption and authentication keys for one container.
///
/// Errors:
/// - `EmptySecret` if `secret` is empty.
/// - `InvalidSalt` if `salt` is all zeros.
/// - `Kdf` if HKDF expansion fails.
pub fn derive_keys(secret: &[u8], salt: &[u8; SALT_LEN]) -> Result<DerivedKeys, CryptoError> {
    if secret.is_empty() {
        return Err(CryptoError::EmptySecret);
    }
    if salt.iter().all(|&b| b == 0) {
        return Err(CryptoError::InvalidSalt);
    }

    let hk = Hkdf::<Sha256>::new(Some(salt), secret);

    let mut encryption = [0u8; KEY_LEN_32];
    hk.expand(KDF_INFO_ENCRYPTION, &mut encryption)
        .map_err(|e| CryptoError::Kdf(format!("encryption key: {e}")))?;

    let mut authentication = [0u8; KEY_LEN_32];
    hk.expand(KDF_INFO_AUTHENTICATION, &mut authentication)
        .map_err(|e| CryptoError::Kdf(format!("authentication key: {e}")))?;

    Ok(DerivedKeys { encryption, authentication })
}

//! container/mod.rs
//! Sealed container format: `[version_tag][salt][iv][ciphertext...][mac]`.
//!
//! Notes:
//! - Exactly one version tag is accepted.
//! - Header fields are authenticated by the MAC but never encrypted.
//! - Ciphertext length is implied by the total size; there is no length field.

pub mod types;
pub mod encode;
pub mod decode;

pub use types::*;
pub use encode::*;
pub use decode::*;

// ## 📂 File: `src/container/encode.rs`
//! Header encoding.
//!
//! Field order must match `decode.rs` exactly: version tag, salt, IV.

use crate::constants::CONTAINER_HEADER_LEN;
use crate::container::types::ContainerHeader;

/// Serialize the fixed header fields.
#[inline]
pub fn encode_header(h: &ContainerHeader) -> [u8; CONTAINER_HEADER_LEN] {
    let mut out = [0u8; CONTAINER_HEADER_LEN];
    let mut i = 0usize;

    fn put_bytes(out: &mut [u8], i: &mut usize, b: &[u8]) {
        out[*i..*i + b.len()].copy_from_slice(b);
        *i += b.len();
    }

    put_bytes(&mut out, &mut i, &h.version); // 0..4   version tag
    put_bytes(&mut out, &mut i, &h.salt);    // 4..36  salt
    put_bytes(&mut out, &mut i, &h.iv);      // 36..52 IV

    debug_assert_eq!(i, CONTAINER_HEADER_LEN, "encoding wrote incorrect length");
    out
}

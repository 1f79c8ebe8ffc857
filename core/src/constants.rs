
/// Version tag for the sealed container.
/// "RSC" + 0x02 = Range-Sealed Container, format 2. Exactly one value is accepted.
// Kept as `[u8; 4]` so the type itself enforces "exactly 4 bytes" and matches the container field.
pub const CONTAINER_VERSION_TAG: [u8; 4] = [0x52, 0x53, 0x43, 0x02];

/// Fixed container field sizes (bytes).
pub const VERSION_TAG_LEN: usize = 4;
pub const SALT_LEN: usize = 32;
/// IV length equals the AES block size.
pub const IV_LEN: usize = 16;
pub const BLOCK_LEN: usize = 16;
/// HMAC-SHA256 output length.
pub const MAC_LEN: usize = 32;

/// Bytes preceding the ciphertext region.
pub const CONTAINER_HEADER_LEN: usize = VERSION_TAG_LEN + SALT_LEN + IV_LEN;
/// Minimal container: header + MAC, empty ciphertext.
pub const MIN_CONTAINER_LEN: usize = CONTAINER_HEADER_LEN + MAC_LEN;

/// Derived key length for both AES-256 and HMAC-SHA256.
pub const KEY_LEN_32: usize = 32;

/// HKDF info labels (bind derived keys to their purpose).
pub const KDF_INFO_ENCRYPTION: &[u8] = b"RangeSeal|V2|KeyForEncryption";
pub const KDF_INFO_AUTHENTICATION: &[u8] = b"RangeSeal|V2|KeyForAuthentication";

/// Defaults when the caller does not override them.
pub const DEFAULT_CHUNK_HINT: usize = 100 * 1024; // 100 KiB, plain pump starting hint
pub const DEFAULT_DECRYPT_CHUNK_SIZE: usize = 1024 * 1024; // 1 MiB, MAC/decrypt chunk
/// Max chunk size sanity bound (32 MiB).
pub const MAX_CHUNK_SIZE: usize = 32 * 1024 * 1024;

/// Prefix length sniffed for content-type detection.
pub const SNIFF_LEN: usize = 512;

/// Default content type when nothing better is known.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// HTTP status codes emitted by the response assembler.
pub mod status {
    pub const OK: u16 = 200;
    pub const PARTIAL_CONTENT: u16 = 206;
    pub const RANGE_NOT_SATISFIABLE: u16 = 416;
}

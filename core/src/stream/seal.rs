// ## 📂 File: `src/stream/seal.rs`
// ## Produce sealed containers readable by the streaming decryptor

use std::io::{Read, Write};

use rand::RngCore;
use tracing::debug;

use crate::config::validate_cipher_chunk;
use crate::constants::{DEFAULT_DECRYPT_CHUNK_SIZE, IV_LEN, MIN_CONTAINER_LEN, SALT_LEN};
use crate::container::{encode_header, ContainerHeader};
use crate::crypto::{derive_keys, CounterState, CryptoError, RunningMac};
use crate::stream::io::read_exact_or_eof;
use crate::types::StreamResult;

/// Seal `reader` into `writer` with a fresh random salt and IV.
///
/// Returns the number of plaintext bytes sealed.
pub fn seal<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    secret: &[u8],
    chunk_size: usize,
) -> StreamResult<u64> {
    let mut rng = rand::thread_rng();
    let mut salt = [0u8; SALT_LEN];
    let mut iv = [0u8; IV_LEN];
    rng.try_fill_bytes(&mut salt).map_err(|e| CryptoError::Rng(e.to_string()))?;
    rng.try_fill_bytes(&mut iv).map_err(|e| CryptoError::Rng(e.to_string()))?;
    seal_with(reader, writer, secret, salt, iv, chunk_size)
}

/// Seal with caller-chosen salt and IV. Deterministic for fixed inputs.
pub fn seal_with<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    secret: &[u8],
    salt: [u8; SALT_LEN],
    iv: [u8; IV_LEN],
    chunk_size: usize,
) -> StreamResult<u64> {
    validate_cipher_chunk("seal chunk size", chunk_size)?;

    let keys = derive_keys(secret, &salt)?;
    let header = ContainerHeader::new(salt, iv);
    writer.write_all(&encode_header(&header))?;

    let mut mac = RunningMac::for_container(&keys.authentication, &header)?;
    let mut counter = CounterState::new(iv);
    let mut buf = vec![0u8; chunk_size];
    let mut total = 0u64;

    loop {
        let n = read_exact_or_eof(reader, &mut buf)?;
        if n == 0 {
            break;
        }
        counter.apply(&keys.encryption, &mut buf[..n]);
        counter.advance_for_chunk(chunk_size);
        mac.update(&buf[..n]);
        writer.write_all(&buf[..n])?;
        total += n as u64;
        if n < chunk_size {
            break;
        }
    }

    writer.write_all(&mac.finalize())?;
    writer.flush()?;
    debug!(plaintext_len = total, "container sealed");
    Ok(total)
}

/// Seal an in-memory plaintext.
pub fn seal_bytes(plaintext: &[u8], secret: &[u8]) -> StreamResult<Vec<u8>> {
    let mut out = Vec::with_capacity(plaintext.len() + MIN_CONTAINER_LEN);
    seal(&mut &plaintext[..], &mut out, secret, DEFAULT_DECRYPT_CHUNK_SIZE)?;
    Ok(out)
}

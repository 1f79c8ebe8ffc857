// ## 📂 File: `src/container/decode.rs`
//! Header decoding and container layout discovery.
//!
//! Design notes:
//! - Field order must match `encode.rs`.
//! - Seekable sources: header from offset 0, MAC read from `total_len - MAC_LEN`.
//! - Forward-only sources: the header prefix is mirrored into a temporary spool
//!   and parsed from there; the probe handle is then dropped. The region end comes
//!   from the known total size, and the MAC is left for pass 1 to pick up.

use std::io::{self, Read, Seek, SeekFrom};

use tracing::{debug, trace};

use crate::constants::{CONTAINER_HEADER_LEN, IV_LEN, MAC_LEN, SALT_LEN, VERSION_TAG_LEN};
use crate::container::types::{cipher_region_len, ContainerHeader, ContainerLayout, FormatError};
use crate::source::{ByteSource, SourceHandle};
use crate::types::{StreamError, StreamResult};

/// Deserialize the fixed header fields and validate the version tag.
#[inline]
pub fn decode_header(buf: &[u8]) -> Result<ContainerHeader, FormatError> {
    if buf.len() < CONTAINER_HEADER_LEN {
        return Err(FormatError::BufferTooShort { have: buf.len(), need: CONTAINER_HEADER_LEN });
    }

    let mut i = 0usize;
    #[inline]
    fn get_bytes<const N: usize>(buf: &[u8], i: &mut usize) -> [u8; N] {
        let mut dst = [0u8; N];
        dst.copy_from_slice(&buf[*i..*i + N]);
        *i += N;
        dst
    }

    let header = ContainerHeader {
        version: get_bytes::<VERSION_TAG_LEN>(buf, &mut i), // 0..4
        salt: get_bytes::<SALT_LEN>(buf, &mut i),           // 4..36
        iv: get_bytes::<IV_LEN>(buf, &mut i),               // 36..52
    };
    debug_assert_eq!(i, CONTAINER_HEADER_LEN);

    header.validate()?;
    Ok(header)
}

/// Read and decode the header from the current reader position.
pub fn read_header<R: Read>(r: &mut R) -> StreamResult<ContainerHeader> {
    let mut buf = [0u8; CONTAINER_HEADER_LEN];
    read_fixed(r, &mut buf)?;
    Ok(decode_header(&buf)?)
}

/// Locate header, ciphertext region and (when possible) MAC for `source`.
pub fn locate(source: &dyn ByteSource) -> StreamResult<ContainerLayout> {
    if source.is_seekable() {
        let mut handle = source.open()?;
        locate_seekable(&mut handle, source.size())
    } else {
        locate_forward(source)
    }
}

/// Random-access discovery on an open handle.
pub fn locate_seekable(handle: &mut SourceHandle, total_len: u64) -> StreamResult<ContainerLayout> {
    handle.seek_to(0)?;
    let header = read_header(handle)?;
    let cipher_len = cipher_region_len(total_len)?;

    let mut layout = ContainerLayout {
        header,
        total_len,
        cipher_start: CONTAINER_HEADER_LEN as u64,
        cipher_len,
        mac: None,
    };

    handle.seek_to(layout.mac_offset())?;
    let mut mac = [0u8; MAC_LEN];
    read_fixed(handle, &mut mac)?;
    layout.mac = Some(mac);

    debug!(total_len, cipher_len, cipher_end = ?layout.cipher_end(), "container located (seekable)");
    Ok(layout)
}

/// Forward-only discovery through a header spool.
pub fn locate_forward(source: &dyn ByteSource) -> StreamResult<ContainerLayout> {
    let total_len = source.size();

    let header = {
        let mut probe = source.open()?;
        let mut spool = tempfile::tempfile()?;
        let copied = io::copy(&mut (&mut probe).take(CONTAINER_HEADER_LEN as u64), &mut spool)?;
        trace!(copied, "header prefix spooled");
        if copied < CONTAINER_HEADER_LEN as u64 {
            return Err(FormatError::BufferTooShort {
                have: copied as usize,
                need: CONTAINER_HEADER_LEN,
            }
            .into());
        }
        spool.seek(SeekFrom::Start(0))?;
        read_header(&mut spool)?
        // probe and spool dropped here; passes reopen the source
    };

    let cipher_len = cipher_region_len(total_len)?;
    let layout = ContainerLayout {
        header,
        total_len,
        cipher_start: CONTAINER_HEADER_LEN as u64,
        cipher_len,
        mac: None,
    };

    debug!(total_len, cipher_len, cipher_end = ?layout.cipher_end(), "container located (forward-only)");
    Ok(layout)
}

/// `read_exact` that reports a short source as a format error.
pub(crate) fn read_fixed<R: Read>(r: &mut R, buf: &mut [u8]) -> StreamResult<()> {
    let mut off = 0;
    while off < buf.len() {
        match r.read(&mut buf[off..]) {
            Ok(0) => {
                return Err(StreamError::Format(FormatError::BufferTooShort { have: off, need: buf.len() }))
            }
            Ok(n) => off += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

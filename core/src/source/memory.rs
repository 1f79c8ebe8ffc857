//! In-memory source.
//!
//! Can pose as seekable or forward-only, and can cap every read to simulate
//! slow transports that deliver short reads.

use std::io::{self, Cursor, Read, Seek, SeekFrom};

use bytes::Bytes;

use super::{ByteSource, SourceHandle};
use crate::types::StreamResult;

#[derive(Debug, Clone)]
pub struct MemorySource {
    id: String,
    data: Bytes,
    seekable: bool,
    max_read: Option<usize>,
    content_type: Option<String>,
    filename: Option<String>,
}

impl MemorySource {
    pub fn new(id: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            id: id.into(),
            data: data.into(),
            seekable: true,
            max_read: None,
            content_type: None,
            filename: None,
        }
    }

    /// Handles only support sequential reads after a fresh open.
    pub fn forward_only(mut self) -> Self {
        self.seekable = false;
        self
    }

    /// Every `read` returns at most `n` bytes.
    pub fn with_max_read(mut self, n: usize) -> Self {
        self.max_read = Some(n.max(1));
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

impl ByteSource for MemorySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn is_seekable(&self) -> bool {
        self.seekable
    }

    fn open(&self) -> StreamResult<SourceHandle> {
        let reader = CappedCursor { inner: Cursor::new(self.data.clone()), max_read: self.max_read };
        Ok(if self.seekable {
            SourceHandle::seekable(Box::new(reader))
        } else {
            SourceHandle::forward(Box::new(reader))
        })
    }

    fn content_type_hint(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    fn filename_hint(&self) -> Option<&str> {
        self.filename.as_deref()
    }
}

struct CappedCursor {
    inner: Cursor<Bytes>,
    max_read: Option<usize>,
}

impl Read for CappedCursor {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = match self.max_read {
            Some(cap) => buf.len().min(cap),
            None => buf.len(),
        };
        self.inner.read(&mut buf[..len])
    }
}

impl Seek for CappedCursor {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

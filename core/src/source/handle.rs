//! Byte handles over seekable and forward-only sources.

use std::io::{self, Read, Seek, SeekFrom};

/// Object-safe `Read + Seek`.
pub trait ReadSeek: Read + Seek + Send {}
impl<T: Read + Seek + Send> ReadSeek for T {}

enum HandleInner {
    Seekable(Box<dyn ReadSeek>),
    Forward(Box<dyn Read + Send>),
}

/// One open handle on a byte source.
///
/// Tracks the absolute position so forward-only handles can honor forward
/// `seek_to` calls by discarding bytes. Backward seeks on a forward-only
/// handle fail with `ErrorKind::Unsupported`; callers reopen instead.
pub struct SourceHandle {
    inner: HandleInner,
    position: u64,
}

impl SourceHandle {
    pub fn seekable(reader: Box<dyn ReadSeek>) -> Self {
        Self { inner: HandleInner::Seekable(reader), position: 0 }
    }

    pub fn forward(reader: Box<dyn Read + Send>) -> Self {
        Self { inner: HandleInner::Forward(reader), position: 0 }
    }

    pub fn is_seekable(&self) -> bool {
        matches!(self.inner, HandleInner::Seekable(_))
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        match &mut self.inner {
            HandleInner::Seekable(r) => {
                self.position = r.seek(SeekFrom::Start(offset))?;
                Ok(())
            }
            HandleInner::Forward(r) => {
                if offset < self.position {
                    return Err(io::Error::new(
                        io::ErrorKind::Unsupported,
                        format!(
                            "cannot seek backwards on forward-only source: at {}, wanted {}",
                            self.position, offset
                        ),
                    ));
                }
                let skip = offset - self.position;
                let skipped = io::copy(&mut r.by_ref().take(skip), &mut io::sink())?;
                self.position += skipped;
                if skipped < skip {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("source ended at {} while skipping to {}", self.position, offset),
                    ));
                }
                Ok(())
            }
        }
    }
}

impl Read for SourceHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = match &mut self.inner {
            HandleInner::Seekable(r) => r.read(buf)?,
            HandleInner::Forward(r) => r.read(buf)?,
        };
        self.position += n as u64;
        Ok(n)
    }
}

impl std::fmt::Debug for SourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceHandle")
            .field("seekable", &self.is_seekable())
            .field("position", &self.position)
            .finish()
    }
}

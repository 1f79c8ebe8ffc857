//! Local file source (seekable).

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use super::{ByteSource, SourceHandle};
use crate::types::{StreamError, StreamResult};

#[derive(Debug, Clone)]
pub struct LocalSource {
    path: PathBuf,
    id: String,
    size: u64,
}

impl LocalSource {
    /// Stat the file; fails with `OpenFailure` if it is missing or not a regular file.
    pub fn open_path(path: impl AsRef<Path>) -> StreamResult<Self> {
        let path = path.as_ref().to_path_buf();
        let id = path.to_string_lossy().into_owned();

        let meta = std::fs::metadata(&path).map_err(|e| StreamError::open_failure(&id, e))?;
        if !meta.is_file() {
            return Err(StreamError::open_failure(&id, "not a regular file"));
        }

        Ok(Self { path, id, size: meta.len() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for LocalSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn is_seekable(&self) -> bool {
        true
    }

    fn open(&self) -> StreamResult<SourceHandle> {
        let file = File::open(&self.path).map_err(|e| StreamError::open_failure(&self.id, e))?;
        Ok(SourceHandle::seekable(Box::new(BufReader::new(file))))
    }
}

//! Byte sources: where resource bytes come from.
//!
//! A source reports its identity, total size and whether its handles can seek.
//! `open()` always yields a fresh handle positioned at offset 0; two-pass
//! decryption relies on that to re-read forward-only sources.

mod handle;
mod http;
mod local;
mod memory;
mod metadata;
mod resolve;

pub use handle::{ReadSeek, SourceHandle};
pub use http::{HttpConfig, HttpSource};
pub use local::LocalSource;
pub use memory::MemorySource;
pub use metadata::{
    sniff_content_type, DefaultMetadataProvider, MetadataCache, MetadataProvider, ResourceMetadata,
};
pub use resolve::{resolve_location, Location};

use crate::types::StreamResult;

/// Source provider interface.
pub trait ByteSource: Send {
    /// Stable identity (path or URL); also the metadata cache key.
    fn id(&self) -> &str;

    /// Total size in bytes of the stored object (container length when sealed).
    fn size(&self) -> u64;

    /// Whether handles support random access.
    fn is_seekable(&self) -> bool;

    /// Open a fresh handle at offset 0.
    fn open(&self) -> StreamResult<SourceHandle>;

    /// Content type declared by the transport (e.g. a `Content-Type` response header).
    fn content_type_hint(&self) -> Option<&str> {
        None
    }

    /// Filename declared by the transport (e.g. `Content-Disposition`).
    fn filename_hint(&self) -> Option<&str> {
        None
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn id(&self) -> &str {
        (**self).id()
    }
    fn size(&self) -> u64 {
        (**self).size()
    }
    fn is_seekable(&self) -> bool {
        (**self).is_seekable()
    }
    fn open(&self) -> StreamResult<SourceHandle> {
        (**self).open()
    }
    fn content_type_hint(&self) -> Option<&str> {
        (**self).content_type_hint()
    }
    fn filename_hint(&self) -> Option<&str> {
        (**self).filename_hint()
    }
}

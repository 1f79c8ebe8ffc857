//! Resource metadata: content type, suggested filename, size.
//!
//! Local sources are sniffed (magic bytes, then extension, then a text check).
//! Remote sources are described from their response headers only; their
//! bodies are never fetched just to sniff.

use std::io::Read;

use tracing::trace;
use uuid::Uuid;

use super::ByteSource;
use crate::constants::{DEFAULT_CONTENT_TYPE, SNIFF_LEN};
use crate::types::StreamResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMetadata {
    pub size: u64,
    pub content_type: String,
    pub filename: String,
}

/// Metadata provider interface.
pub trait MetadataProvider {
    fn describe(&self, source: &dyn ByteSource) -> StreamResult<ResourceMetadata>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultMetadataProvider;

impl MetadataProvider for DefaultMetadataProvider {
    fn describe(&self, source: &dyn ByteSource) -> StreamResult<ResourceMetadata> {
        let filename = source
            .filename_hint()
            .map(str::to_string)
            .or_else(|| filename_from_id(source.id()))
            .unwrap_or_else(random_filename);

        let content_type = match source.content_type_hint() {
            Some(ct) => ct.to_string(),
            None if source.is_seekable() => {
                let mut prefix = Vec::with_capacity(SNIFF_LEN);
                source.open()?.take(SNIFF_LEN as u64).read_to_end(&mut prefix)?;
                sniff_content_type(&prefix, &filename).to_string()
            }
            None => content_type_from_extension(&filename).unwrap_or(DEFAULT_CONTENT_TYPE).to_string(),
        };

        trace!(id = source.id(), %content_type, %filename, "described resource");
        Ok(ResourceMetadata { size: source.size(), content_type, filename })
    }
}

/// Read-through metadata cache holding the most recently queried identity only.
///
/// Querying a different identity drops the previous entry.
#[derive(Debug, Default, Clone)]
pub struct MetadataCache {
    entry: Option<(String, ResourceMetadata)>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, id: &str) -> Option<&ResourceMetadata> {
        if self.entry.as_ref().is_some_and(|(key, _)| key != id) {
            self.entry = None;
        }
        self.entry.as_ref().map(|(_, meta)| meta)
    }

    pub fn insert(&mut self, id: impl Into<String>, metadata: ResourceMetadata) {
        self.entry = Some((id.into(), metadata));
    }

    /// Cached metadata for `source`, or describe it with `provider` and remember it.
    pub fn describe_with(
        &mut self,
        provider: &dyn MetadataProvider,
        source: &dyn ByteSource,
    ) -> StreamResult<ResourceMetadata> {
        if let Some(hit) = self.get(source.id()) {
            return Ok(hit.clone());
        }
        let fresh = provider.describe(source)?;
        self.insert(source.id(), fresh.clone());
        Ok(fresh)
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }
}

/// Magic bytes first, then extension of `name`, then a UTF-8 text check.
pub fn sniff_content_type(prefix: &[u8], name: &str) -> &'static str {
    if let Some(ct) = content_type_from_magic(prefix) {
        return ct;
    }
    if let Some(ct) = content_type_from_extension(name) {
        return ct;
    }
    if !prefix.is_empty() && !prefix.contains(&0) && std::str::from_utf8(prefix).is_ok() {
        return "text/plain";
    }
    DEFAULT_CONTENT_TYPE
}

fn content_type_from_magic(p: &[u8]) -> Option<&'static str> {
    const TABLE: &[(&[u8], &str)] = &[
        (b"%PDF-", "application/pdf"),
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xFF\xD8\xFF", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"PK\x03\x04", "application/zip"),
        (b"\x1F\x8B", "application/gzip"),
        (b"\x1A\x45\xDF\xA3", "video/webm"),
        (b"ID3", "audio/mpeg"),
        (b"OggS", "audio/ogg"),
        (b"fLaC", "audio/flac"),
    ];
    for (magic, ct) in TABLE {
        if p.starts_with(magic) {
            return Some(ct);
        }
    }
    if p.len() >= 12 && &p[0..4] == b"RIFF" {
        match &p[8..12] {
            b"WAVE" => return Some("audio/wav"),
            b"WEBP" => return Some("image/webp"),
            b"AVI " => return Some("video/x-msvideo"),
            _ => {}
        }
    }
    if p.len() >= 8 && &p[4..8] == b"ftyp" {
        return Some("video/mp4");
    }
    None
}

fn content_type_from_extension(name: &str) -> Option<&'static str> {
    let ext = name.rsplit_once('.')?.1.to_ascii_lowercase();
    let ct = match ext.as_str() {
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "js" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "wav" => "audio/wav",
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        _ => return None,
    };
    Some(ct)
}

/// Last path segment of a path or URL, without query or fragment.
fn filename_from_id(id: &str) -> Option<String> {
    let without_query = id.split(['?', '#']).next().unwrap_or(id);
    let last = without_query.rsplit(['/', '\\']).next()?;
    if last.is_empty() || last.contains(':') {
        return None;
    }
    Some(last.to_string())
}

/// `filename` parameter of a `Content-Disposition` value, quotes stripped.
pub(crate) fn filename_from_disposition(value: &str) -> Option<String> {
    value.split(';').map(str::trim).find_map(|param| {
        let (key, raw) = param.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("filename") {
            return None;
        }
        let name = raw.trim().trim_matches('"');
        (!name.is_empty()).then(|| name.to_string())
    })
}

fn random_filename() -> String {
    format!("download-{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_filename_is_extracted() {
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="report.pdf""#).as_deref(),
            Some("report.pdf")
        );
        assert_eq!(filename_from_disposition("inline"), None);
    }

    #[test]
    fn id_filename_strips_query() {
        assert_eq!(filename_from_id("https://cdn.example.com/a/b/movie.mp4?sig=1").as_deref(), Some("movie.mp4"));
        assert_eq!(filename_from_id("https://cdn.example.com/"), None);
    }

    #[test]
    fn random_filename_has_prefix() {
        assert!(random_filename().starts_with("download-"));
    }
}

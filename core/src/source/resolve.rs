//! Location string -> concrete source.

use std::path::PathBuf;

use reqwest::Url;
use tracing::debug;

use super::{
    ByteSource, DefaultMetadataProvider, HttpConfig, HttpSource, LocalSource, MetadataCache,
};
use crate::types::{StreamError, StreamResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Local(PathBuf),
    Remote(String),
}

impl Location {
    /// Classify a location string.
    ///
    /// - `http://` / `https://` → `Remote`
    /// - `file://…` or a bare path → `Local`
    /// - any other scheme → `UnsupportedSource`
    pub fn parse(location: &str) -> StreamResult<Self> {
        let trimmed = location.trim();
        let lower = trimmed.to_ascii_lowercase();

        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(trimmed).map_err(|_| StreamError::UnsupportedSource {
                location: location.to_string(),
            })?;
            return Ok(Location::Remote(url.to_string()));
        }
        if lower.starts_with("file://") {
            return Ok(Location::Local(PathBuf::from(&trimmed["file://".len()..])));
        }
        if has_scheme(trimmed) {
            return Err(StreamError::UnsupportedSource { location: location.to_string() });
        }
        if trimmed.is_empty() {
            return Err(StreamError::open_failure(location, "empty location"));
        }
        Ok(Location::Local(PathBuf::from(trimmed)))
    }
}

// RFC 3986 scheme: ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) followed by "://".
fn has_scheme(s: &str) -> bool {
    match s.split_once("://") {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Open a source for `location`, consulting `cache` to skip repeat remote probes.
pub fn resolve_location(
    location: &str,
    cache: &mut MetadataCache,
    http: &HttpConfig,
) -> StreamResult<Box<dyn ByteSource>> {
    match Location::parse(location)? {
        Location::Local(path) => {
            debug!(path = %path.display(), "resolved local source");
            Ok(Box::new(LocalSource::open_path(path)?))
        }
        Location::Remote(url) => {
            if let Some(meta) = cache.get(&url) {
                debug!(%url, "remote metadata cache hit");
                return Ok(Box::new(HttpSource::from_metadata(url, http.clone(), meta)?));
            }
            let source = HttpSource::connect(url, http.clone())?;
            cache.describe_with(&DefaultMetadataProvider, &source)?;
            Ok(Box::new(source))
        }
    }
}

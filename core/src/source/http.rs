//! Remote HTTP(S) source using a blocking reqwest client.
//!
//! Each `open()` issues a fresh GET and yields a forward-only handle over the
//! response body. Size, content type and filename come from one HEAD request
//! (or from a cached `ResourceMetadata`, skipping the round trip).

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::StatusCode;
use tracing::debug;

use super::metadata::{filename_from_disposition, ResourceMetadata};
use super::{ByteSource, SourceHandle};
use crate::types::{StreamError, StreamResult};

/// Configuration for remote sources.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds (default: 30).
    pub timeout_secs: u64,
    /// Custom User-Agent header.
    pub user_agent: Option<String>,
    /// Bearer token sent as `Authorization`.
    pub bearer_token: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30, user_agent: None, bearer_token: None }
    }
}

pub struct HttpSource {
    url: String,
    client: Client,
    config: HttpConfig,
    size: u64,
    content_type: Option<String>,
    filename: Option<String>,
}

impl HttpSource {
    /// Probe `url` with HEAD and capture size and descriptive headers.
    ///
    /// Errors with `OpenFailure` on 404, non-success status, network failure,
    /// or a missing `Content-Length`.
    pub fn connect(url: impl Into<String>, config: HttpConfig) -> StreamResult<Self> {
        let url = url.into();
        let client = build_client(&url, &config)?;

        let request = apply_auth(client.head(&url), &config);
        let response = request.send().map_err(|e| StreamError::open_failure(&url, e))?;
        check_status(&url, response.status())?;

        let headers = response.headers();
        let size = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .ok_or_else(|| StreamError::open_failure(&url, "response has no Content-Length"))?;
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let filename = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition);

        debug!(%url, size, ?content_type, ?filename, "remote source probed");

        Ok(Self { url, client, config, size, content_type, filename })
    }

    /// Build from previously fetched metadata without a HEAD round trip.
    pub fn from_metadata(
        url: impl Into<String>,
        config: HttpConfig,
        metadata: &ResourceMetadata,
    ) -> StreamResult<Self> {
        let url = url.into();
        let client = build_client(&url, &config)?;
        Ok(Self {
            url,
            client,
            config,
            size: metadata.size,
            content_type: Some(metadata.content_type.clone()),
            filename: Some(metadata.filename.clone()),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ByteSource for HttpSource {
    fn id(&self) -> &str {
        &self.url
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn is_seekable(&self) -> bool {
        false
    }

    fn open(&self) -> StreamResult<SourceHandle> {
        let request = apply_auth(self.client.get(&self.url), &self.config);
        let response = request.send().map_err(|e| StreamError::open_failure(&self.url, e))?;
        check_status(&self.url, response.status())?;
        debug!(url = %self.url, "opened remote stream");
        Ok(SourceHandle::forward(Box::new(response)))
    }

    fn content_type_hint(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    fn filename_hint(&self) -> Option<&str> {
        self.filename.as_deref()
    }
}

fn build_client(url: &str, config: &HttpConfig) -> StreamResult<Client> {
    let user_agent = config
        .user_agent
        .clone()
        .unwrap_or_else(|| concat!("rangeseal/", env!("CARGO_PKG_VERSION")).to_string());

    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(user_agent)
        .build()
        .map_err(|e| StreamError::open_failure(url, e))
}

fn apply_auth(request: RequestBuilder, config: &HttpConfig) -> RequestBuilder {
    match &config.bearer_token {
        Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
        None => request,
    }
}

fn check_status(url: &str, status: StatusCode) -> StreamResult<()> {
    if status == StatusCode::NOT_FOUND {
        return Err(StreamError::open_failure(url, "not found (404)"));
    }
    if !status.is_success() {
        return Err(StreamError::open_failure(
            url,
            format!("HTTP {} {}", status.as_u16(), status.canonical_reason().unwrap_or("")),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(check_status("http://h/a", StatusCode::OK).is_ok());
        assert!(check_status("http://h/a", StatusCode::PARTIAL_CONTENT).is_ok());

        let err = check_status("http://h/a", StatusCode::NOT_FOUND).unwrap_err();
        assert!(matches!(&err, StreamError::OpenFailure { reason, .. } if reason.contains("404")));

        for status in [StatusCode::FORBIDDEN, StatusCode::INTERNAL_SERVER_ERROR, StatusCode::MOVED_PERMANENTLY] {
            let err = check_status("http://h/a", status).unwrap_err();
            assert!(matches!(&err, StreamError::OpenFailure { location, .. } if location == "http://h/a"));
            assert!(err.is_fatal());
        }
    }

    #[test]
    fn bearer_token_sets_authorization() {
        let config = HttpConfig { bearer_token: Some("t0k".into()), ..HttpConfig::default() };
        let client = build_client("http://h/a", &config).unwrap();
        let request = apply_auth(client.get("http://h/a"), &config).build().unwrap();
        assert_eq!(request.headers().get(AUTHORIZATION).unwrap(), "Bearer t0k");

        let request = apply_auth(client.get("http://h/a"), &HttpConfig::default()).build().unwrap();
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }
}

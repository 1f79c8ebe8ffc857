// ## 📂 File: `src/stream/response.rs`
// ## Response head assembly + emission seam

//! Computes status and headers from a negotiation outcome and resource metadata.
//! Emission is the caller's business: `HeaderEmitter` is the only way heads
//! leave this crate.

use std::io;

use crate::config::Disposition;
use crate::constants::status;
use crate::range::Negotiation;
use crate::source::ResourceMetadata;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const CONTENT_RANGE: &str = "Content-Range";
pub const CONTENT_DISPOSITION: &str = "Content-Disposition";
pub const ACCEPT_RANGES: &str = "Accept-Ranges";

/// Status line and headers for one response, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
}

impl ResponseHead {
    /// First value of header `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn content_length(&self) -> Option<u64> {
        self.header(CONTENT_LENGTH)?.parse().ok()
    }

    /// 416 heads carry no body.
    pub fn has_body(&self) -> bool {
        self.status != status::RANGE_NOT_SATISFIABLE
    }
}

/// Build the response head. Pure: no I/O, no emission.
pub fn assemble(negotiation: &Negotiation, metadata: &ResourceMetadata, disposition: Disposition) -> ResponseHead {
    let size = metadata.size;
    let mut headers = Vec::with_capacity(5);

    match negotiation {
        Negotiation::NotSatisfiable => {
            headers.push((CONTENT_RANGE, format!("bytes */{size}")));
            headers.push((CONTENT_LENGTH, "0".to_string()));
        }
        Negotiation::Full(_) | Negotiation::Partial(_) => {
            headers.push((CONTENT_TYPE, metadata.content_type.clone()));
            headers.push((ACCEPT_RANGES, "bytes".to_string()));

            let length = negotiation.span().map_or(0, |span| span.len());
            headers.push((CONTENT_LENGTH, length.to_string()));

            if let Negotiation::Partial(span) = negotiation {
                headers.push((CONTENT_RANGE, format!("bytes {}-{}/{size}", span.start, span.end)));
            }

            headers.push((
                CONTENT_DISPOSITION,
                format!("{}; filename=\"{}\"", disposition.as_str(), quote_filename(&metadata.filename)),
            ));
        }
    }

    ResponseHead { status: negotiation.status(), headers }
}

/// Strip characters that would break a quoted header parameter.
fn quote_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Header emission capability supplied by the host (HTTP server, CLI, test).
pub trait HeaderEmitter {
    fn emit(&mut self, head: &ResponseHead) -> io::Result<()>;
}

/// Records every emitted head.
#[derive(Debug, Default, Clone)]
pub struct CollectingEmitter {
    pub heads: Vec<ResponseHead>,
}

impl CollectingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&ResponseHead> {
        self.heads.last()
    }
}

impl HeaderEmitter for CollectingEmitter {
    fn emit(&mut self, head: &ResponseHead) -> io::Result<()> {
        self.heads.push(head.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::ByteSpan;

    fn meta(size: u64) -> ResourceMetadata {
        ResourceMetadata {
            size,
            content_type: "text/plain".into(),
            filename: "report \"final\".txt".into(),
        }
    }

    #[test]
    fn full_head_has_length_and_no_range() {
        let head = assemble(&Negotiation::Full(42), &meta(42), Disposition::Attachment);
        assert_eq!(head.status, 200);
        assert_eq!(head.content_length(), Some(42));
        assert_eq!(head.header("content-range"), None);
        assert_eq!(head.header(ACCEPT_RANGES), Some("bytes"));
    }

    #[test]
    fn partial_head_has_content_range() {
        let head = assemble(&Negotiation::Partial(ByteSpan::new(10, 19)), &meta(100), Disposition::Inline);
        assert_eq!(head.status, 206);
        assert_eq!(head.header(CONTENT_RANGE), Some("bytes 10-19/100"));
        assert_eq!(head.content_length(), Some(10));
        assert_eq!(head.header(CONTENT_DISPOSITION), Some("inline; filename=\"report _final_.txt\""));
    }

    #[test]
    fn unsatisfiable_head_is_bodyless() {
        let head = assemble(&Negotiation::NotSatisfiable, &meta(100), Disposition::Attachment);
        assert_eq!(head.status, 416);
        assert!(!head.has_body());
        assert_eq!(head.header(CONTENT_RANGE), Some("bytes */100"));
        assert_eq!(head.header(CONTENT_TYPE), None);
    }
}

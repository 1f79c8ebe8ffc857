//! Range negotiation against a known plaintext size.
//!
//! Supported `Range` grammar (single range only):
//!
//! ```text
//! bytes=<start>-<end>
//! bytes=<start>-
//! bytes=-<suffix-length>
//! ```
//!
//! `negotiate` is pure: the same header and size always yield the same outcome,
//! so it can be run once for headers and again before seeking.

use crate::constants::status;

/// Inclusive byte span `[start, end]` in the plaintext address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteSpan {
    pub start: u64,
    pub end: u64,
}

impl ByteSpan {
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Span covering a whole resource; `None` when it is empty.
    pub fn whole(size: u64) -> Option<Self> {
        (size > 0).then(|| Self { start: 0, end: size - 1 })
    }

    /// Number of bytes that will be emitted.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn contains(&self, offset: u64) -> bool {
        offset >= self.start && offset <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Negotiation {
    /// No usable header: whole resource, status 200.
    Full(u64),
    /// Single satisfiable range, status 206.
    Partial(ByteSpan),
    /// Status 416; no bytes may be read.
    NotSatisfiable,
}

impl Negotiation {
    pub fn status(&self) -> u16 {
        match self {
            Negotiation::Full(_) => status::OK,
            Negotiation::Partial(_) => status::PARTIAL_CONTENT,
            Negotiation::NotSatisfiable => status::RANGE_NOT_SATISFIABLE,
        }
    }

    /// Bytes to emit, if any.
    pub fn span(&self) -> Option<ByteSpan> {
        match self {
            Negotiation::Full(size) => ByteSpan::whole(*size),
            Negotiation::Partial(span) => Some(*span),
            Negotiation::NotSatisfiable => None,
        }
    }

    pub fn is_satisfiable(&self) -> bool {
        !matches!(self, Negotiation::NotSatisfiable)
    }
}

/// Negotiate an optional raw `Range` header value against `size`.
pub fn negotiate(range: Option<&str>, size: u64) -> Negotiation {
    let raw = match range.map(str::trim) {
        None | Some("") => return Negotiation::Full(size),
        Some(raw) => raw,
    };

    // Multi-range requests are not supported.
    if raw.contains(',') {
        return Negotiation::NotSatisfiable;
    }

    let ranges = match raw.split_once('=') {
        Some((unit, ranges)) if unit.trim().eq_ignore_ascii_case("bytes") => ranges.trim(),
        // Unknown range units are ignored.
        Some(_) => return Negotiation::Full(size),
        None => return Negotiation::NotSatisfiable,
    };

    if size == 0 {
        return Negotiation::NotSatisfiable;
    }
    let last = size - 1;

    let Some((first, second)) = ranges.split_once('-') else {
        return Negotiation::NotSatisfiable;
    };
    let (first, second) = (first.trim(), second.trim());

    let (start, end) = if first.is_empty() {
        // Suffix form: last N bytes.
        let Ok(suffix) = second.parse::<u64>() else {
            return Negotiation::NotSatisfiable;
        };
        let Some(start) = size.checked_sub(suffix) else {
            return Negotiation::NotSatisfiable;
        };
        (start, last)
    } else {
        let Ok(start) = first.parse::<u64>() else {
            return Negotiation::NotSatisfiable;
        };
        let end = second.parse::<u64>().unwrap_or(last);
        (start, end)
    };

    let end = end.min(last);

    if start > end || start > last || end >= size {
        return Negotiation::NotSatisfiable;
    }

    Negotiation::Partial(ByteSpan { start, end })
}

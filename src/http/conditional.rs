//! Conditional request evaluation (RFC 7232)
//!
//! Only GET and HEAD reach the media handler, so a matching `If-None-Match`
//! or an unmodified `If-Modified-Since` always yields 304.

use super::{cache, date};
use hyper::header::{
    HeaderMap, IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_RANGE, IF_UNMODIFIED_SINCE,
};

/// Outcome of evaluating the request's preconditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// Serve the representation
    Proceed,
    /// Client copy is current - 304
    NotModified,
    /// A precondition failed - 412
    Failed,
}

/// Read a header as `&str`, ignoring empty or non-ASCII values
fn header<'a>(headers: &'a HeaderMap, name: &hyper::header::HeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Evaluate `If-Match`, `If-Unmodified-Since`, `If-None-Match` and
/// `If-Modified-Since` in RFC 7232 §6 order
///
/// `modified` is the resource mtime in unix seconds, `None` when unknown.
pub fn evaluate(headers: &HeaderMap, etag: &str, modified: Option<u64>) -> Precondition {
    // Step 1/2: If-Match, falling back to If-Unmodified-Since
    if let Some(if_match) = header(headers, &IF_MATCH) {
        if !cache::check_strong_match(if_match, etag) {
            return Precondition::Failed;
        }
    } else if let Some(since) = header(headers, &IF_UNMODIFIED_SINCE).and_then(date::parse_http_date) {
        if modified.is_some_and(|m| m > since) {
            return Precondition::Failed;
        }
    }

    // Step 3/4: If-None-Match, falling back to If-Modified-Since
    if let Some(if_none_match) = header(headers, &IF_NONE_MATCH) {
        if cache::check_etag_match(Some(if_none_match), etag) {
            return Precondition::NotModified;
        }
    } else if let Some(since) = header(headers, &IF_MODIFIED_SINCE).and_then(date::parse_http_date) {
        if modified.is_some_and(|m| m > 0 && m <= since) {
            return Precondition::NotModified;
        }
    }

    Precondition::Proceed
}

/// Whether the `Range` header should be honored given `If-Range`
///
/// An entity tag must match strongly; a date must equal the mtime exactly.
pub fn if_range_allows(headers: &HeaderMap, etag: &str, modified: Option<u64>) -> bool {
    let Some(if_range) = header(headers, &IF_RANGE) else {
        return true;
    };

    if if_range.starts_with('"') || if_range.starts_with("W/") {
        return cache::check_strong_match(if_range, etag);
    }

    match (modified, date::parse_http_date(if_range)) {
        (Some(m), Some(d)) => m > 0 && m == d,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::date::format_http_date;

    const ETAG: &str = "\"b-1234\"";
    const MTIME: u64 = 1_700_000_000;

    fn headers(pairs: &[(hyper::header::HeaderName, String)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), value.parse().unwrap());
        }
        map
    }

    #[test]
    fn test_no_validators() {
        assert_eq!(evaluate(&HeaderMap::new(), ETAG, Some(MTIME)), Precondition::Proceed);
    }

    #[test]
    fn test_if_none_match() {
        let h = headers(&[(IF_NONE_MATCH, ETAG.to_string())]);
        assert_eq!(evaluate(&h, ETAG, Some(MTIME)), Precondition::NotModified);

        let h = headers(&[(IF_NONE_MATCH, "\"other\"".to_string())]);
        assert_eq!(evaluate(&h, ETAG, Some(MTIME)), Precondition::Proceed);
    }

    #[test]
    fn test_if_modified_since() {
        let same = headers(&[(IF_MODIFIED_SINCE, format_http_date(MTIME))]);
        assert_eq!(evaluate(&same, ETAG, Some(MTIME)), Precondition::NotModified);

        let later = headers(&[(IF_MODIFIED_SINCE, format_http_date(MTIME + 60))]);
        assert_eq!(evaluate(&later, ETAG, Some(MTIME)), Precondition::NotModified);

        let earlier = headers(&[(IF_MODIFIED_SINCE, format_http_date(MTIME - 60))]);
        assert_eq!(evaluate(&earlier, ETAG, Some(MTIME)), Precondition::Proceed);

        // Unknown mtime is never "not modified"
        assert_eq!(evaluate(&same, ETAG, None), Precondition::Proceed);
    }

    #[test]
    fn test_if_none_match_overrides_if_modified_since() {
        let h = headers(&[
            (IF_NONE_MATCH, "\"other\"".to_string()),
            (IF_MODIFIED_SINCE, format_http_date(MTIME)),
        ]);
        assert_eq!(evaluate(&h, ETAG, Some(MTIME)), Precondition::Proceed);
    }

    #[test]
    fn test_if_match() {
        let ok = headers(&[(IF_MATCH, ETAG.to_string())]);
        assert_eq!(evaluate(&ok, ETAG, Some(MTIME)), Precondition::Proceed);

        let bad = headers(&[(IF_MATCH, "\"other\"".to_string())]);
        assert_eq!(evaluate(&bad, ETAG, Some(MTIME)), Precondition::Failed);
    }

    #[test]
    fn test_if_unmodified_since() {
        let ok = headers(&[(IF_UNMODIFIED_SINCE, format_http_date(MTIME))]);
        assert_eq!(evaluate(&ok, ETAG, Some(MTIME)), Precondition::Proceed);

        let stale = headers(&[(IF_UNMODIFIED_SINCE, format_http_date(MTIME - 1))]);
        assert_eq!(evaluate(&stale, ETAG, Some(MTIME)), Precondition::Failed);
    }

    #[test]
    fn test_unparseable_dates_ignored() {
        let h = headers(&[(IF_MODIFIED_SINCE, "not a date".to_string())]);
        assert_eq!(evaluate(&h, ETAG, Some(MTIME)), Precondition::Proceed);
    }

    #[test]
    fn test_if_range() {
        assert!(if_range_allows(&HeaderMap::new(), ETAG, Some(MTIME)));

        let tag = headers(&[(IF_RANGE, ETAG.to_string())]);
        assert!(if_range_allows(&tag, ETAG, Some(MTIME)));

        let weak = headers(&[(IF_RANGE, format!("W/{ETAG}"))]);
        assert!(!if_range_allows(&weak, ETAG, Some(MTIME)));

        let date = headers(&[(IF_RANGE, format_http_date(MTIME))]);
        assert!(if_range_allows(&date, ETAG, Some(MTIME)));

        let old = headers(&[(IF_RANGE, format_http_date(MTIME - 5))]);
        assert!(!if_range_allows(&old, ETAG, Some(MTIME)));
    }
}

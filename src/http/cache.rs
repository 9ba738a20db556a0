//! HTTP cache validator module
//!
//! Provides `ETag` generation and validator comparison for conditional requests.

/// Generate a strong `ETag` from file size and modification time (unix seconds)
///
/// The content is never read, so any rewrite that changes either the length or
/// the mtime produces a different tag. The tag depends on nothing but these
/// two inputs, so it is stable across restarts and rebuilds.
///
/// # Returns
/// Quoted `ETag` string, e.g., `"b-6553f100"`; an unknown mtime counts as 0
pub fn generate_etag(size: u64, modified_secs: Option<u64>) -> String {
    let modified = modified_secs.unwrap_or(0);
    format!("\"{size:x}-{modified:x}\"")
}

/// Strip the weak prefix from an entity tag
fn opaque_tag(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Uses weak comparison (RFC 7232 §2.3.2), so `W/"x"` matches `"x"`.
///
/// Supports:
/// - Single `ETag`: `"abc123"`
/// - Multiple `ETags`: `"abc123", "def456"`
/// - Wildcard: `*`
///
/// # Returns
/// Returns true if matched (should return 304), false otherwise
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag.split(',').map(str::trim).any(|e| {
            e == "*" || opaque_tag(e) == opaque_tag(etag)
        })
    })
}

/// Check if an `If-Match` / `If-Range` value matches the server's `ETag`
///
/// Uses strong comparison: weak tags on either side never match.
pub fn check_strong_match(header: &str, etag: &str) -> bool {
    if etag.starts_with("W/") {
        return false;
    }
    header
        .split(',')
        .map(str::trim)
        .any(|e| e == "*" || (!e.starts_with("W/") && e == etag))
}

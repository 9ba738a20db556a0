//! MIME type detection module
//!
//! Returns the corresponding Content-Type based on file extension, using the
//! `mime_guess` extension table.

use std::path::Path;

/// Content type used when the extension is unknown or absent
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Get MIME Content-Type based on file extension
///
/// # Examples
/// ```
/// use manofwar::http::mime::get_content_type;
/// assert_eq!(get_content_type(Some("txt")), "text/plain");
/// assert_eq!(get_content_type(Some("mp4")), "video/mp4");
/// assert_eq!(get_content_type(None), "application/octet-stream");
/// ```
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    extension
        .filter(|ext| !ext.is_empty())
        .and_then(|ext| mime_guess::from_ext(ext).first_raw())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

/// Get MIME Content-Type for a path
pub fn content_type_for(path: &Path) -> &'static str {
    get_content_type(path.extension().and_then(|e| e.to_str()))
}

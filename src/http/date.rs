//! HTTP date handling
//!
//! Formats `Last-Modified` values and parses the date validators clients send
//! back (`If-Modified-Since`, `If-Unmodified-Since`, `If-Range`).

use chrono::{DateTime, NaiveDateTime, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

/// IMF-fixdate, the preferred format (RFC 7231 §7.1.1.1)
const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
/// Obsolete RFC 850 format
const RFC_850: &str = "%A, %d-%b-%y %H:%M:%S GMT";
/// ANSI C `asctime()` format
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";

/// Seconds since the unix epoch, or `None` for times before it
pub fn unix_seconds(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs())
}

/// Format a unix timestamp as an IMF-fixdate
///
/// # Examples
/// ```
/// use manofwar::http::date::format_http_date;
/// assert_eq!(format_http_date(784_111_777), "Sun, 06 Nov 1994 08:49:37 GMT");
/// ```
pub fn format_http_date(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|s| DateTime::<Utc>::from_timestamp(s, 0))
        .unwrap_or_default()
        .format(IMF_FIXDATE)
        .to_string()
}

/// Parse any of the three HTTP date formats into unix seconds
pub fn parse_http_date(value: &str) -> Option<u64> {
    let value = value.trim();
    [IMF_FIXDATE, RFC_850, ASCTIME]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .and_then(|dt| u64::try_from(dt.and_utc().timestamp()).ok())
}

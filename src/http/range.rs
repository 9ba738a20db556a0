//! HTTP Range request parsing module
//!
//! Range header parsing for partial content delivery, compliant with RFC 7233.

/// A resolved byte range within a file of known size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// Start byte position
    pub start: u64,
    /// Number of bytes in the range (never zero)
    pub length: u64,
}

impl ByteRange {
    /// Inclusive end position
    #[inline]
    pub const fn end(&self) -> u64 {
        self.start + self.length - 1
    }

    /// `Content-Range` header value for this range
    pub fn content_range(&self, file_size: u64) -> String {
        format!("bytes {}-{}/{file_size}", self.start, self.end())
    }
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// One or more satisfiable ranges, in request order
    Valid(Vec<ByteRange>),
    /// Every requested range lies beyond the end of the file - 416 with
    /// `Content-Range: bytes */size`
    NotSatisfiable,
    /// Unknown unit or a range that does not parse - 416 without `Content-Range`
    Invalid,
    /// No Range header or no ranges listed (return full content)
    None,
}

/// Parse HTTP Range header (bytes unit, one or more ranges)
///
/// Supported formats, optionally comma separated:
/// - `bytes=start-end` - Specific range
/// - `bytes=start-` - From start to end
/// - `bytes=-suffix` - Last suffix bytes
///
/// # Examples
/// ```
/// use manofwar::http::range::{parse_range_header, RangeParseResult};
///
/// let result = parse_range_header(Some("bytes=0-99"), 1000);
/// assert!(matches!(result, RangeParseResult::Valid(_)));
///
/// let result = parse_range_header(None, 1000);
/// assert!(matches!(result, RangeParseResult::None));
///
/// let result = parse_range_header(Some("bytes=9-0"), 1000);
/// assert!(matches!(result, RangeParseResult::Invalid));
/// ```
pub fn parse_range_header(range_header: Option<&str>, file_size: u64) -> RangeParseResult {
    let Some(header) = range_header.map(str::trim).filter(|h| !h.is_empty()) else {
        return RangeParseResult::None;
    };

    let Some(header) = header.strip_prefix("bytes=") else {
        return RangeParseResult::Invalid;
    };

    let mut ranges = Vec::new();
    let mut no_overlap = false;

    for part in header.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((start_str, end_str)) = part.split_once('-') else {
            return RangeParseResult::Invalid;
        };
        let (start_str, end_str) = (start_str.trim(), end_str.trim());

        let parsed = if start_str.is_empty() {
            parse_suffix_range(end_str, file_size)
        } else {
            parse_standard_range(start_str, end_str, file_size)
        };

        match parsed {
            RangePart::Range(range) => ranges.push(range),
            RangePart::NoOverlap => no_overlap = true,
            RangePart::Malformed => return RangeParseResult::Invalid,
        }
    }

    if ranges.is_empty() {
        return if no_overlap {
            RangeParseResult::NotSatisfiable
        } else {
            RangeParseResult::None
        };
    }

    RangeParseResult::Valid(ranges)
}

/// Outcome of parsing one comma-separated range
enum RangePart {
    Range(ByteRange),
    NoOverlap,
    Malformed,
}

/// Parse suffix range (e.g., "-500")
fn parse_suffix_range(suffix_str: &str, file_size: u64) -> RangePart {
    let Ok(suffix) = suffix_str.parse::<u64>() else {
        return RangePart::Malformed;
    };

    // Suffix larger than file is valid, the whole file is returned as range
    let length = suffix.min(file_size);
    if length == 0 {
        return RangePart::NoOverlap;
    }

    RangePart::Range(ByteRange {
        start: file_size - length,
        length,
    })
}

/// Parse standard range (e.g., "0-99" or "100-")
fn parse_standard_range(start_str: &str, end_str: &str, file_size: u64) -> RangePart {
    let Ok(start) = start_str.parse::<u64>() else {
        return RangePart::Malformed;
    };

    // Start beyond file size is not satisfiable, whatever the end says
    if start >= file_size {
        return RangePart::NoOverlap;
    }

    // Open-ended, or clamped to file size - 1
    let end = if end_str.is_empty() {
        file_size - 1
    } else {
        match end_str.parse::<u64>() {
            Ok(e) if e >= start => e.min(file_size - 1),
            _ => return RangePart::Malformed,
        }
    };

    RangePart::Range(ByteRange {
        start,
        length: end - start + 1,
    })
}

/// Total number of bytes covered by the ranges
pub fn total_length(ranges: &[ByteRange]) -> u64 {
    ranges.iter().map(|r| r.length).sum()
}

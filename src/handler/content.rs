//! Content delivery
//!
//! Given an open file and its metadata, answers the request the way a
//! standard content-serving routine does: validators, preconditions, byte
//! ranges (single or multipart), and HEAD handling.

use crate::error::ServeError;
use crate::http::body::{self, ResponseBody, Segment};
use crate::http::conditional::{self, Precondition};
use crate::http::range::{self, ByteRange, RangeParseResult};
use crate::http::{self as proto, cache, date};
use hyper::body::Bytes;
use hyper::header::{
    HeaderMap, ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG, LAST_MODIFIED,
    RANGE,
};
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use tokio::fs::File;

/// An opened file ready to be served
#[derive(Debug)]
pub struct Content {
    /// Name relative to the mount point, used in diagnostics
    pub name: String,
    pub file: File,
    pub size: u64,
    /// Modification time in unix seconds
    pub modified: Option<u64>,
    pub content_type: &'static str,
}

/// Serve `content` honoring conditional and range headers
///
/// The file handle moves into the response body, or is dropped here when the
/// response carries no body.
pub async fn serve_content(
    headers: &HeaderMap,
    is_head: bool,
    content: Content,
) -> Result<Response<ResponseBody>, ServeError> {
    let etag = cache::generate_etag(content.size, content.modified);
    let last_modified = content
        .modified
        .filter(|&m| m > 0)
        .map(date::format_http_date);

    match conditional::evaluate(headers, &etag, content.modified) {
        Precondition::Failed => return Ok(proto::build_412_response()),
        Precondition::NotModified => {
            return Ok(proto::build_304_response(&etag, last_modified.as_deref()));
        }
        Precondition::Proceed => {}
    }

    let range_header = if conditional::if_range_allows(headers, &etag, content.modified) {
        headers.get(RANGE).and_then(|v| v.to_str().ok())
    } else {
        None
    };

    let validators = Validators {
        etag: &etag,
        last_modified: last_modified.as_deref(),
    };

    match range::parse_range_header(range_header, content.size) {
        RangeParseResult::NotSatisfiable => {
            tracing::debug!("Unsatisfiable range {range_header:?} for {}", content.name);
            Ok(proto::build_416_response(Some(content.size)))
        }
        RangeParseResult::Invalid => {
            tracing::debug!("Invalid range {range_header:?} for {}", content.name);
            Ok(proto::build_416_response(None))
        }
        // A request covering more than the file is answered in full
        RangeParseResult::Valid(ranges) if range::total_length(&ranges) <= content.size => {
            if let [single] = ranges.as_slice() {
                serve_single_range(*single, &validators, is_head, content).await
            } else {
                Ok(serve_multipart(&ranges, &validators, is_head, content))
            }
        }
        _ => serve_full(&validators, is_head, content).await,
    }
}

/// Validator headers shared by 200 and 206 responses
struct Validators<'a> {
    etag: &'a str,
    last_modified: Option<&'a str>,
}

impl Validators<'_> {
    fn builder(&self, status: StatusCode) -> Builder {
        let builder = Response::builder()
            .status(status)
            .header(ACCEPT_RANGES, "bytes")
            .header(ETAG, self.etag);
        match self.last_modified {
            Some(date) => builder.header(LAST_MODIFIED, date),
            None => builder,
        }
    }
}

/// Full 200 response
async fn serve_full(
    validators: &Validators<'_>,
    is_head: bool,
    content: Content,
) -> Result<Response<ResponseBody>, ServeError> {
    let body = if is_head {
        body::empty()
    } else {
        body::file_range(content.file, 0, content.size).await?
    };

    let builder = validators
        .builder(StatusCode::OK)
        .header(CONTENT_TYPE, content.content_type)
        .header(CONTENT_LENGTH, content.size);
    Ok(finish(builder, body, StatusCode::OK))
}

/// 206 response for exactly one range
async fn serve_single_range(
    range: ByteRange,
    validators: &Validators<'_>,
    is_head: bool,
    content: Content,
) -> Result<Response<ResponseBody>, ServeError> {
    let content_range = range.content_range(content.size);
    let body = if is_head {
        body::empty()
    } else {
        body::file_range(content.file, range.start, range.length).await?
    };

    let builder = validators
        .builder(StatusCode::PARTIAL_CONTENT)
        .header(CONTENT_TYPE, content.content_type)
        .header(CONTENT_LENGTH, range.length)
        .header(CONTENT_RANGE, content_range);
    Ok(finish(builder, body, StatusCode::PARTIAL_CONTENT))
}

/// 206 `multipart/byteranges` response for several ranges
fn serve_multipart(
    ranges: &[ByteRange],
    validators: &Validators<'_>,
    is_head: bool,
    content: Content,
) -> Response<ResponseBody> {
    let boundary = generate_boundary();
    let segments = multipart_segments(ranges, &boundary, content.content_type, content.size);
    let length: u64 = segments
        .iter()
        .map(|s| match s {
            Segment::Bytes(b) => b.len() as u64,
            Segment::File { length, .. } => *length,
        })
        .sum();

    let body = if is_head {
        body::empty()
    } else {
        body::multipart(content.file, segments)
    };

    let builder = validators
        .builder(StatusCode::PARTIAL_CONTENT)
        .header(
            CONTENT_TYPE,
            format!("multipart/byteranges; boundary={boundary}"),
        )
        .header(CONTENT_LENGTH, length);
    finish(builder, body, StatusCode::PARTIAL_CONTENT)
}

/// Random multipart boundary
fn generate_boundary() -> String {
    format!("{:016x}{:016x}", rand::random::<u64>(), rand::random::<u64>())
}

/// Lay out the parts of a `multipart/byteranges` body
fn multipart_segments(
    ranges: &[ByteRange],
    boundary: &str,
    content_type: &str,
    size: u64,
) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(ranges.len() * 2 + 1);
    for (i, range) in ranges.iter().enumerate() {
        let separator = if i == 0 { "" } else { "\r\n" };
        let header = format!(
            "{separator}--{boundary}\r\nContent-Range: {}\r\nContent-Type: {content_type}\r\n\r\n",
            range.content_range(size)
        );
        segments.push(Segment::Bytes(Bytes::from(header)));
        segments.push(Segment::File {
            start: range.start,
            length: range.length,
        });
    }
    segments.push(Segment::Bytes(Bytes::from(format!("\r\n--{boundary}--\r\n"))));
    segments
}

fn finish(builder: Builder, body: ResponseBody, status: StatusCode) -> Response<ResponseBody> {
    builder.body(body).unwrap_or_else(|e| {
        crate::http::response::log_build_error(status, &e);
        proto::build_500_response()
    })
}

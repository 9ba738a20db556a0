//! HTTP response building module
//!
//! Provides builders for the status responses the media server emits, decoupled
//! from specific business logic.

use super::body::{self, ResponseBody};
use hyper::header::{
    ALLOW, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG, LAST_MODIFIED, LOCATION,
};
use hyper::{Response, StatusCode};

/// Methods the media server answers
pub const ALLOWED_METHODS: &str = "GET, HEAD";

/// Build a plain-text response with the given status
fn build_text_response(status: StatusCode, message: &'static str) -> Response<ResponseBody> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONTENT_LENGTH, message.len())
        .body(body::full(message))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            fallback(status)
        })
}

/// Build 301 redirect response
pub fn build_301_response(target: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(LOCATION, target)
        .header(CONTENT_LENGTH, 0)
        .body(body::empty())
        .unwrap_or_else(|e| {
            log_build_error(StatusCode::MOVED_PERMANENTLY, &e);
            fallback(StatusCode::NOT_FOUND)
        })
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str, last_modified: Option<&str>) -> Response<ResponseBody> {
    let mut builder = Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(ETAG, etag);
    if let Some(date) = last_modified {
        builder = builder.header(LAST_MODIFIED, date);
    }
    builder.body(body::empty()).unwrap_or_else(|e| {
        log_build_error(StatusCode::NOT_MODIFIED, &e);
        fallback(StatusCode::NOT_MODIFIED)
    })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<ResponseBody> {
    build_text_response(StatusCode::NOT_FOUND, "404 Not Found")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    let mut response =
        build_text_response(StatusCode::METHOD_NOT_ALLOWED, "405 Method Not Allowed");
    response
        .headers_mut()
        .insert(ALLOW, hyper::header::HeaderValue::from_static(ALLOWED_METHODS));
    response
}

/// Build 412 Precondition Failed response
pub fn build_412_response() -> Response<ResponseBody> {
    build_text_response(StatusCode::PRECONDITION_FAILED, "412 Precondition Failed")
}

/// Build 416 Range Not Satisfiable response
///
/// `file_size` is set when the ranges were well formed but missed the file;
/// it becomes `Content-Range: bytes */<size>`.
pub fn build_416_response(file_size: Option<u64>) -> Response<ResponseBody> {
    let mut response =
        build_text_response(StatusCode::RANGE_NOT_SATISFIABLE, "416 Range Not Satisfiable");
    if let Some(Ok(value)) = file_size.map(|size| format!("bytes */{size}").parse()) {
        response.headers_mut().insert(CONTENT_RANGE, value);
    }
    response
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<ResponseBody> {
    build_text_response(StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error")
}

/// Build 503 Service Unavailable response
pub fn build_503_response() -> Response<ResponseBody> {
    build_text_response(StatusCode::SERVICE_UNAVAILABLE, "503 Service Unavailable")
}

/// Bare response carrying only a status, used when a builder fails
fn fallback(status: StatusCode) -> Response<ResponseBody> {
    let mut response = Response::new(body::empty());
    *response.status_mut() = status;
    response
}

/// Log response build error
pub(crate) fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    tracing::error!("Failed to build {status} response: {error}");
}

//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation,
//! prefix matching, the per-request timeout and access logging.

use crate::config::AppState;
use crate::error::ServeError;
use crate::handler::media;
use crate::http::{self, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use hyper::header::{HeaderName, CONTENT_LENGTH, REFERER, USER_AGENT};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
///
/// Generic over the request body: the media server never reads it, so it is
/// dropped before any I/O starts.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let req = req.into_parts().0;
    let response = route_request(&req, &state).await;

    if let Some(format) = state.access_log_format() {
        let entry = access_entry(&req, &response, peer_addr, started);
        logger::log_access(&entry, format);
    }

    Ok(response)
}

/// Validate the method and dispatch to the media handler
async fn route_request(req: &Parts, state: &AppState) -> Response<ResponseBody> {
    // 1. Check HTTP method
    if let Some(resp) = check_http_method(&req.method) {
        return resp;
    }

    // 2. Match the mount prefix
    let path = req.uri.path();
    let media = &state.media;
    if !path.starts_with(media.prefix()) {
        // Subtree mount: "/media" redirects to "/media/"
        if media.prefix().strip_suffix('/') == Some(path) {
            return http::build_301_response(media.prefix());
        }
        return http::build_404_response();
    }

    // 3. Serve under the request timeout
    let is_head = req.method == Method::HEAD;
    let serve = media.serve(path, &req.headers, is_head);
    match state.request_timeout() {
        Some(limit) => match tokio::time::timeout(limit, serve).await {
            Ok(response) => response,
            Err(_) => media::error_response(&ServeError::Timeout(limit)),
        },
        None => serve.await,
    }
}

/// Return 405 for anything other than GET and HEAD
fn check_http_method(method: &Method) -> Option<Response<ResponseBody>> {
    match *method {
        Method::GET | Method::HEAD => None,
        _ => {
            tracing::warn!("Method not allowed: {method}");
            Some(http::build_405_response())
        }
    }
}

/// Build the access log entry for a finished request
fn access_entry(
    req: &Parts,
    response: &Response<ResponseBody>,
    peer_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method.to_string(),
        req.uri.path().to_string(),
    );
    entry.query = req.uri.query().map(ToString::to_string);
    entry.http_version = version_label(req.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = if req.method == Method::HEAD {
        0
    } else {
        response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    };
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::{BodyExt, Empty};
    use hyper::body::Bytes;
    use hyper::header::{ALLOW, LOCATION};
    use hyper::StatusCode;
    use std::time::Duration;

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    fn state(root: &std::path::Path, timeout: Option<Duration>) -> Arc<AppState> {
        let mut config = crate::config::tests::defaults();
        config.logging.access_log = false;
        config.performance.request_timeout = timeout.map_or(0, |t| t.as_secs());
        Arc::new(AppState::new(&config, root.to_path_buf()))
    }

    fn request(method: Method, uri: &str) -> Request<Empty<Bytes>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Empty::new())
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_and_head_allowed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("test.txt"), b"Hello World").unwrap();
        let state = state(dir.path(), None);

        let get = handle_request(request(Method::GET, "/media/test.txt"), Arc::clone(&state), peer())
            .await
            .unwrap();
        assert_eq!(get.status(), StatusCode::OK);
        let body = get.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.as_ref(), b"Hello World");

        let head = handle_request(request(Method::HEAD, "/media/test.txt"), state, peer())
            .await
            .unwrap();
        assert_eq!(head.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_other_methods_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("test.txt"), b"Hello World").unwrap();
        let state = state(dir.path(), None);

        for method in [Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS] {
            let response =
                handle_request(request(method.clone(), "/media/test.txt"), Arc::clone(&state), peer())
                    .await
                    .unwrap();
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
            assert_eq!(response.headers()[ALLOW], "GET, HEAD");
        }
    }

    #[tokio::test]
    async fn test_outside_prefix_is_404() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("test.txt"), b"Hello World").unwrap();
        let state = state(dir.path(), None);

        for uri in ["/test.txt", "/mediafile.txt", "/"] {
            let response = handle_request(request(Method::GET, uri), Arc::clone(&state), peer())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_bare_prefix_redirects() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path(), None);

        let response = handle_request(request(Method::GET, "/media"), state, peer())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[LOCATION], "/media/");
    }

    #[tokio::test]
    async fn test_query_string_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("test.txt"), b"Hello World").unwrap();
        let state = state(dir.path(), Some(Duration::from_secs(5)));

        let response = handle_request(request(Method::GET, "/media/test.txt?t=10"), state, peer())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stalled_open_times_out_with_503() {
        let dir = tempfile::tempdir().unwrap();
        let fifo = dir.path().join("stalled.mp4");
        // Opening a FIFO for reading blocks until a writer shows up
        let status = std::process::Command::new("mkfifo").arg(&fifo).status().unwrap();
        assert!(status.success());
        let state = state(dir.path(), Some(Duration::from_secs(1)));

        let response = handle_request(request(Method::GET, "/media/stalled.mp4"), state, peer())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.as_ref(), b"503 Service Unavailable");

        // Release the blocked open so the runtime can shut down
        drop(std::fs::OpenOptions::new().write(true).open(&fifo).unwrap());
    }

    #[test]
    fn test_version_label() {
        assert_eq!(version_label(Version::HTTP_11), "1.1");
        assert_eq!(version_label(Version::HTTP_10), "1.0");
        assert_eq!(version_label(Version::HTTP_2), "2");
    }
}

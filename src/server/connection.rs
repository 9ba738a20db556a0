// Connection handling module
// Accepts a single TCP connection and serves it on its own task

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::server::graceful::GracefulShutdown;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Accept a connection, enforcing the connection limit.
///
/// The connection is registered with `graceful` so shutdown can wait for
/// in-flight requests.
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    graceful: &GracefulShutdown,
) {
    if !state.try_acquire_connection() {
        tracing::warn!(
            "Max connections reached: {}. Connection from {peer_addr} rejected.",
            state.active_connections()
        );
        drop(stream);
        return;
    }
    tracing::debug!("Accepted connection from {peer_addr}");

    let io = TokioIo::new(stream);

    let mut builder = http1::Builder::new();
    builder
        .timer(TokioTimer::new())
        .keep_alive(state.performance.keep_alive);
    if let Some(timeout) = state.performance.header_read_timeout() {
        builder.header_read_timeout(timeout);
    }

    let service_state = Arc::clone(state);
    let conn = builder.serve_connection(
        io,
        service_fn(move |req| handler::handle_request(req, Arc::clone(&service_state), peer_addr)),
    );
    let conn = graceful.watch(conn);

    let state = Arc::clone(state);
    tokio::spawn(async move {
        if let Err(err) = conn.await {
            logger::log_connection_error(&err);
        }
        state.release_connection();
    });
}

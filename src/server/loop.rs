// Server loop module
// Accepts connections until shutdown, then drains in-flight requests

use hyper_util::server::graceful::GracefulShutdown;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;

// Pause after a failed accept (e.g. EMFILE) before trying again
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// Serve `listener` until `shutdown` resolves
///
/// After shutdown the listener is closed and open connections get up to the
/// configured shutdown timeout to finish.
pub async fn run<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = ()>,
{
    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &graceful);
                    }
                    Err(e) => {
                        tracing::error!("Failed to accept connection: {e}");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                }
            }

            () = &mut shutdown => break,
        }
    }

    drop(listener);

    let grace = state.performance.shutdown_timeout();
    tracing::info!(
        "Stopped accepting, draining {} connection(s) for up to {}s",
        state.active_connections(),
        grace.as_secs()
    );
    tokio::select! {
        () = graceful.shutdown() => tracing::info!("All connections closed"),
        () = tokio::time::sleep(grace) => {
            tracing::warn!(
                "Shutdown timeout reached with {} connection(s) still open",
                state.active_connections()
            );
        }
    }
}

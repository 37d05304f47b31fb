// Server loop module
// Accepts connections until shutdown, then drains active connections

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Main accept loop
///
/// Must run inside a `LocalSet`: connections are served with `spawn_local`.
/// Returns after `shutdown` is notified and active connections have finished
/// or `performance.shutdown_grace` seconds have passed.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: Arc<Notify>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            _ = shutdown.notified() => break,
        }
    }

    // Stop accepting before waiting on in-flight requests
    drop(listener);

    let active = state.active_connections.load(Ordering::SeqCst);
    logger::log_shutdown(active);

    let grace = Duration::from_secs(state.config.performance.shutdown_grace);
    let remaining = wait_for_connections(&state.active_connections, grace).await;
    logger::log_shutdown_complete(remaining);

    Ok(())
}

/// Wait until `counter` reaches zero or `grace` elapses; returns what is left
pub async fn wait_for_connections(counter: &AtomicUsize, grace: Duration) -> usize {
    let deadline = tokio::time::Instant::now() + grace;
    loop {
        let active = counter.load(Ordering::SeqCst);
        if active == 0 || tokio::time::Instant::now() >= deadline {
            return active;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}

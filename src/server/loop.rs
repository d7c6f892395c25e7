// Server loop module
// Accepts connections until shutdown, then drains in-flight connections

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Accept loop; must run inside a `LocalSet`
///
/// Returns the number of connections still open when the grace period ended.
pub async fn run_server(listener: TcpListener, state: Arc<AppState>, shutdown: Arc<Notify>) -> usize {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown.notified() => break,
        }
    }

    // Stop accepting before draining
    drop(listener);

    let grace = Duration::from_secs(state.config.performance.shutdown_grace);
    drain_connections(&active_connections, grace).await
}

/// Wait until no connection is active or `grace` has elapsed
async fn drain_connections(active: &AtomicUsize, grace: Duration) -> usize {
    let deadline = tokio::time::Instant::now() + grace;

    loop {
        let remaining = active.load(Ordering::SeqCst);
        if remaining == 0 || tokio::time::Instant::now() >= deadline {
            return remaining;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::logger::ServerLog;
    use crate::server::create_reusable_listener;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn raw_request(addr: std::net::SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        String::from_utf8_lossy(&response).into_owned()
    }

    #[tokio::test]
    async fn test_serves_dispatcher_over_tcp_and_shuts_down() {
        let mut config = Config::defaults().unwrap();
        config.logging.access_log = false;
        config.performance.shutdown_grace = 1;
        let state = Arc::new(AppState::new(config, Arc::new(ServerLog::new(false))));

        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap(), 16).unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let server = tokio::task::spawn_local(run_server(
                    listener,
                    Arc::clone(&state),
                    Arc::clone(&shutdown),
                ));

                let response = raw_request(
                    addr,
                    "GET /?action=system-stats HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
                )
                .await;
                assert!(response.starts_with("HTTP/1.1 200 OK"));
                assert!(response.to_ascii_lowercase().contains("cache-control: public, max-age=300"));
                assert!(response.contains("\"estimatedCosts\""));

                let body = r#"{"action":"foo"}"#;
                let response = raw_request(
                    addr,
                    &format!(
                        "POST /invoke HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    ),
                )
                .await;
                assert!(response.starts_with("HTTP/1.1 200 OK"));
                assert!(response.contains("\"statusCode\":200"));

                shutdown.notify_one();
                let remaining = server.await.unwrap();
                assert_eq!(remaining, 0);
            })
            .await;
    }

    fn test_state(configure: impl FnOnce(&mut Config)) -> Arc<AppState> {
        let mut config = Config::defaults().unwrap();
        config.logging.access_log = false;
        config.performance.shutdown_grace = 1;
        configure(&mut config);
        Arc::new(AppState::new(config, Arc::new(ServerLog::new(false))))
    }

    fn content_length(response: &str) -> Option<String> {
        response
            .to_ascii_lowercase()
            .lines()
            .find_map(|line| line.strip_prefix("content-length: ").map(ToString::to_string))
    }

    #[tokio::test]
    async fn test_head_advertises_get_length() {
        let state = test_state(|_| {});
        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap(), 16).unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let server = tokio::task::spawn_local(run_server(
                    listener,
                    Arc::clone(&state),
                    Arc::clone(&shutdown),
                ));

                let get = raw_request(
                    addr,
                    "GET /?action=system-stats HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
                )
                .await;
                let head = raw_request(
                    addr,
                    "HEAD /?action=system-stats HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
                )
                .await;

                assert!(head.starts_with("HTTP/1.1 200 OK"));
                assert!(content_length(&get).is_some());
                assert_eq!(content_length(&head), content_length(&get));
                assert!(head.ends_with("\r\n\r\n"));

                shutdown.notify_one();
                server.await.unwrap();
            })
            .await;
    }

    #[tokio::test]
    async fn test_idle_connection_closed_after_keep_alive_timeout() {
        let state = test_state(|c| c.performance.keep_alive_timeout = 1);
        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap(), 16).unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let server = tokio::task::spawn_local(run_server(
                    listener,
                    Arc::clone(&state),
                    Arc::clone(&shutdown),
                ));

                // Connect and never send a request head
                let mut stream = TcpStream::connect(addr).await.unwrap();
                let mut buf = Vec::new();
                let closed =
                    tokio::time::timeout(Duration::from_secs(10), stream.read_to_end(&mut buf)).await;
                assert!(closed.is_ok(), "idle connection was not closed");

                shutdown.notify_one();
                assert_eq!(server.await.unwrap(), 0);
            })
            .await;
    }

    #[tokio::test]
    async fn test_drain_times_out_with_open_connections() {
        let active = AtomicUsize::new(2);
        let remaining = drain_connections(&active, Duration::from_millis(60)).await;
        assert_eq!(remaining, 2);

        active.store(0, Ordering::SeqCst);
        assert_eq!(drain_connections(&active, Duration::from_secs(5)).await, 0);
    }
}

// Connection handling module
// Accepts and serves individual TCP connections

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};

use crate::config;
use crate::handler;
use crate::logger;

/// Accept and process a connection, checking limits.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `conn_counter` - Active connection counter
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: &Arc<config::AppState>,
    conn_counter: &Arc<AtomicUsize>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection from {peer_addr} rejected."
            ));
            drop(stream);
            return;
        }
    }

    tracing::debug!("Accepted connection from {peer_addr}");

    handle_connection(stream, peer_addr, Arc::clone(state), Arc::clone(conn_counter));
}

/// Serve a single connection in a local task.
///
/// Keep-alive follows `performance.keep_alive_timeout`. Slow clients are
/// bounded by `performance.read_timeout` while hyper waits for request
/// headers; a request that is already being handled runs until the handler
/// answers, so a publish always gets its response. The counter is
/// decremented when the task ends.
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: Arc<config::AppState>,
    conn_counter: Arc<AtomicUsize>,
) {
    tokio::task::spawn_local(async move {
        let io = TokioIo::new(stream);

        let performance = &state.config.performance;
        let mut builder = http1::Builder::new();
        builder
            .timer(TokioTimer::new())
            .keep_alive(performance.keep_alive_timeout > 0)
            .header_read_timeout(Duration::from_secs(performance.read_timeout));

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| handler::handle_request(req, Arc::clone(&service_state), peer_addr)),
        );

        if let Err(err) = conn.await {
            logger::log_connection_error(&err);
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppState, Config};
    use crate::publish::{codec, SECRET_HEADER};
    use std::io::Write;

    const CONTENTS: &str = "/repos/octo/gdd/contents/index.html";

    fn slow_config(api_base: &str) -> Config {
        let mut cfg = Config::load_with("this-config-file-does-not-exist", |_| None).unwrap();
        cfg.logging.access_log = false;
        cfg.performance.read_timeout = 2;
        cfg.github.timeout = 2;
        cfg.github.api_base = api_base.to_string();
        cfg.github.owner = Some("octo".into());
        cfg.github.repo = Some("gdd".into());
        cfg.github.token = Some("ghp_test".into());
        cfg.publish.password = Some("pw".into());
        cfg
    }

    fn delayed(body: String) -> impl Fn(&mut dyn Write) -> std::io::Result<()> + Send + Sync + 'static {
        move |w: &mut dyn Write| {
            std::thread::sleep(Duration::from_millis(1200));
            w.write_all(body.as_bytes())
        }
    }

    #[tokio::test]
    async fn test_slow_upstream_calls_still_answer_client() {
        let mut upstream = mockito::Server::new_async().await;
        let get_body = serde_json::json!({
            "sha": "abc123",
            "content": codec::encode_content("<main>old</main>"),
        })
        .to_string();
        let _get = upstream
            .mock("GET", CONTENTS)
            .with_status(200)
            .with_chunked_body(delayed(get_body))
            .create_async()
            .await;
        let put = upstream
            .mock("PUT", CONTENTS)
            .with_status(200)
            .with_chunked_body(delayed(r#"{"commit":{"sha":"c0ffee"}}"#.to_string()))
            .create_async()
            .await;

        let state = Arc::new(AppState::new(&slow_config(&upstream.url())).unwrap());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async move {
                tokio::task::spawn_local(async move {
                    let (stream, peer) = listener.accept().await.unwrap();
                    accept_connection(stream, peer, &state, &counter);
                });

                let response = reqwest::Client::new()
                    .post(format!("http://{addr}/api/save-html"))
                    .header(SECRET_HEADER, "pw")
                    .body(r#"{"main_html":"<p>new</p>"}"#)
                    .send()
                    .await
                    .unwrap();
                assert_eq!(response.status(), 200);
                let body: serde_json::Value = response.json().await.unwrap();
                assert_eq!(body["commit"], "c0ffee");
            })
            .await;

        put.assert_async().await;
    }
}

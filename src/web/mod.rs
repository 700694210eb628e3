//! HTTP front end.
//!
//! A thin projection of the registry: an HTML page, the same data as JSON,
//! the manual refresh trigger, and the recent log lines.  Every handler that
//! touches the registry hops onto a blocking worker, since the registry lock
//! is held for whole refresh cycles.

mod routes;
mod templates;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::logging::LogBuffer;
use crate::registry::Registry;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub logs: LogBuffer,
}

/// Handler error: logged, then answered with a plain 500.
pub(crate) struct WebError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for WebError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        error!("request failed: {:#}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error\n").into_response()
    }
}

/// Build the axum application router.
///
/// Separated from [`run`] so tests can drive it without binding a socket.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/api/pods", get(routes::api_pods))
        .route(
            "/forceupdate",
            get(routes::force_update).post(routes::force_update),
        )
        .route("/logs", get(routes::logs))
        .with_state(state)
}

/// Serve on `addr` until Ctrl+C, on a runtime owned by this call.
pub fn run(addr: SocketAddr, state: AppState) -> Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(serve(addr, state))
}

async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind failed: {addr}"))?;
    info!(%addr, "listening on http://{addr}/");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Source;
    use crate::source::{Episode, FeedParser, FetchError};
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use std::sync::mpsc;
    use std::sync::Mutex;
    use std::time::Duration;
    use tower::ServiceExt;

    struct FixedParser(Vec<Episode>);

    impl FeedParser for FixedParser {
        fn locator(&self) -> &str {
            "fixed://"
        }

        fn fetch(&self) -> Result<Vec<Episode>, FetchError> {
            Ok(self.0.clone())
        }
    }

    /// Parses only after a message arrives, signalling when it starts.
    struct SlowParser {
        started: mpsc::SyncSender<()>,
        go: Mutex<mpsc::Receiver<()>>,
    }

    impl FeedParser for SlowParser {
        fn locator(&self) -> &str {
            "slow://"
        }

        fn fetch(&self) -> Result<Vec<Episode>, FetchError> {
            let _ = self.started.send(());
            let _ = self.go.lock().unwrap().recv();
            Ok(vec![Episode::new("Late", "https://cdn.example.com/late.mp3", None)])
        }
    }

    fn state_with(sources: Vec<Source>) -> AppState {
        AppState {
            registry: Arc::new(Registry::new(sources).unwrap()),
            logs: LogBuffer::default(),
        }
    }

    fn test_state() -> AppState {
        state_with(vec![
            Source::new(
                "Kodsnack",
                Box::new(FixedParser(vec![Episode::new(
                    "Kodsnack 500",
                    "https://cdn.example.com/500.mp3",
                    None,
                )])),
            ),
            Source::new("Go Time", Box::new(FixedParser(vec![]))),
        ])
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn index_renders_sources_before_first_refresh() {
        let (status, body) = get(build_router(test_state()), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<strong>Kodsnack</strong>"));
        assert!(body.contains("<strong>Go Time</strong>"));
        assert!(!body.contains("Kodsnack 500"));
    }

    #[tokio::test]
    async fn force_update_refreshes_registry() {
        let state = test_state();

        let (status, body) = get(build_router(state.clone()), "/forceupdate").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("Starting update... Done"));
        assert!(body.contains("2 sources, 1 episodes"));

        let (_, body) = get(build_router(state), "/").await;
        assert!(body.contains(r#"<a href="https://cdn.example.com/500.mp3" target="_blank">Kodsnack 500</a>"#));
    }

    #[tokio::test]
    async fn force_update_accepts_post() {
        let response = build_router(test_state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/forceupdate")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn api_pods_returns_json_snapshot() {
        let state = test_state();
        let _ = get(build_router(state.clone()), "/forceupdate").await;

        let response = build_router(state)
            .oneshot(Request::builder().uri("/api/pods").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value[0]["name"], "Go Time");
        assert_eq!(value[0]["episodes"], serde_json::json!([]));
        assert_eq!(value[1]["name"], "Kodsnack");
        assert_eq!(value[1]["episodes"][0]["title"], "Kodsnack 500");
        assert!(value[1]["lastUpdate"].is_string());
    }

    #[tokio::test]
    async fn logs_lists_newest_first() {
        let state = test_state();
        state.logs.push("first");
        state.logs.push("second");

        let (status, body) = get(build_router(state), "/logs").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "second\nfirst\n");
    }

    #[tokio::test]
    async fn logs_empty_buffer_returns_empty_body() {
        let (status, body) = get(build_router(test_state()), "/logs").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn manual_trigger_waits_for_running_refresh() {
        let (started_tx, started_rx) = mpsc::sync_channel(4);
        let (go_tx, go_rx) = mpsc::channel();
        let state = state_with(vec![Source::new(
            "Slow",
            Box::new(SlowParser {
                started: started_tx,
                go: Mutex::new(go_rx),
            }),
        )]);

        // A scheduled refresh is in flight on another thread.
        let registry = state.registry.clone();
        let scheduled = std::thread::spawn(move || registry.update());
        let started_rx = tokio::task::spawn_blocking(move || {
            started_rx.recv().unwrap();
            started_rx
        })
        .await
        .unwrap();

        let mut trigger = tokio::spawn(get(build_router(state), "/forceupdate"));
        let pending = tokio::time::timeout(Duration::from_millis(100), &mut trigger).await;
        assert!(pending.is_err(), "manual update finished during a refresh");
        assert!(started_rx.try_recv().is_err(), "manual update overlapped the refresh");

        go_tx.send(()).unwrap();
        tokio::task::spawn_blocking(move || scheduled.join().unwrap())
            .await
            .unwrap();

        // Only now does the manual update run its own refresh.
        let _started_rx = tokio::task::spawn_blocking(move || {
            started_rx.recv().unwrap();
            started_rx
        })
        .await
        .unwrap();
        go_tx.send(()).unwrap();

        let (status, body) = trigger.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("1 sources, 1 episodes"));
    }
}

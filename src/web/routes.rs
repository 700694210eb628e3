use axum::extract::State;
use axum::http::{header, HeaderValue};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;

use super::templates;
use super::{AppState, WebError};
use crate::snapshot::SourceSnapshot;

/// Take a snapshot off the async workers; the registry lock blocks for as
/// long as a refresh is running.
async fn snapshot(state: &AppState) -> Result<Vec<SourceSnapshot>, WebError> {
    let registry = state.registry.clone();
    Ok(tokio::task::spawn_blocking(move || registry.snapshot()).await?)
}

fn no_store(mut resp: Response) -> Response {
    resp.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate"),
    );
    resp
}

pub(crate) async fn index(State(state): State<AppState>) -> Result<Response, WebError> {
    let pods = snapshot(&state).await?;
    Ok(no_store(Html(templates::render_index(&pods)).into_response()))
}

pub(crate) async fn api_pods(State(state): State<AppState>) -> Result<Response, WebError> {
    let pods = snapshot(&state).await?;
    Ok(no_store(Json(pods).into_response()))
}

/// Run a full refresh and answer once it has finished.
pub(crate) async fn force_update(State(state): State<AppState>) -> Result<String, WebError> {
    tracing::info!("manual update requested");
    let registry = state.registry.clone();
    let report = tokio::task::spawn_blocking(move || registry.update()).await?;
    Ok(format!(
        "Starting update... Done ({} sources, {} episodes in {:.1?})\n",
        report.sources, report.episodes, report.elapsed
    ))
}

/// Recent log lines, newest first.
pub(crate) async fn logs(State(state): State<AppState>) -> String {
    let lines = state.logs.recent();
    if lines.is_empty() {
        return String::new();
    }
    let mut body = lines.join("\n");
    body.push('\n');
    body
}

//! HTTP server.
//!
//! Every request runs its own read-modify-write cycle against the store
//! files; nothing is cached between requests.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/repo-commits` | Sync the commit store, then list it (30 rows per table) |
//! | `GET`  | `/filter-commit` | Rebuild the security-fix store, then list it (80 rows per table) |
//! | `GET`  | `/major_contributors` | Bar chart of security-fix authors |
//! | `GET`  | `/top_contributors` | Top contributors as a numbered list |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! Store problems on the listing routes are reported inside the HTML body
//! with status 200. Only sync failures (remote unreachable, unreadable
//! store) become an error status:
//!
//! ```json
//! { "error": { "code": "sync_failed", "message": "GitHub request failed: …" } }
//! ```

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::chart::render_chart;
use crate::config::Config;
use crate::contributors::store_frequencies;
use crate::filter::filter_commits;
use crate::models::RepoId;
use crate::progress::NoProgress;
use crate::remote::{CommitSource, GitHubSource};
use crate::render::{render_chart_page, render_table_page, render_top_list};
use crate::store::{CommitStore, CsvStore};
use crate::sync::sync_commits;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    source: Arc<dyn CommitSource>,
    repo: RepoId,
}

impl AppState {
    pub fn new(config: Config, source: Arc<dyn CommitSource>) -> anyhow::Result<Self> {
        let repo = config.github.repo_id()?;
        Ok(Self {
            config: Arc::new(config),
            source,
            repo,
        })
    }

    fn commits_store(&self) -> CsvStore {
        CsvStore::new(&self.config.storage.commits_path)
    }

    fn results_store(&self) -> CsvStore {
        CsvStore::new(&self.config.storage.results_path)
    }
}

/// Starts the server on `[server].bind` with a live GitHub source.
///
/// Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let source = Arc::new(GitHubSource::from_config(&config.github));
    let state = AppState::new(config.clone(), source)?;

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);
    serve(listener, state).await
}

/// Serves the router on an already-bound listener.
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> anyhow::Result<()> {
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/repo-commits", get(handle_repo_commits))
        .route("/filter-commit", get(handle_filter_commit))
        .route("/major_contributors", get(handle_major_contributors))
        .route("/top_contributors", get(handle_top_contributors))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn sync_failed(err: anyhow::Error) -> AppError {
    log::error!("Sync failed: {:#}", err);
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "sync_failed".to_string(),
        message: format!("{:#}", err),
    }
}

fn internal(err: anyhow::Error) -> AppError {
    log::error!("Request failed: {:#}", err);
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: format!("{:#}", err),
    }
}

// ============ Handlers ============

async fn handle_repo_commits(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let store = state.commits_store();
    sync_commits(&store, state.source.as_ref(), &state.repo, &NoProgress)
        .await
        .map_err(sync_failed)?;

    Ok(Html(render_table_page(
        &store.read_table(),
        state.config.render.commits_chunk_size,
    )))
}

async fn handle_filter_commit(State(state): State<AppState>) -> Html<String> {
    let results = state.results_store();
    filter_commits(&state.commits_store(), &results);

    Html(render_table_page(
        &results.read_table(),
        state.config.render.results_chunk_size,
    ))
}

async fn handle_major_contributors(State(state): State<AppState>) -> Result<Response, AppError> {
    let frequencies = store_frequencies(&state.results_store());
    let chart = render_chart(&frequencies).map_err(internal)?;

    Ok((
        [(header::CONTENT_DISPOSITION, "inline")],
        Html(render_chart_page(&chart)),
    )
        .into_response())
}

async fn handle_top_contributors(State(state): State<AppState>) -> Html<String> {
    let frequencies = store_frequencies(&state.results_store());
    Html(render_top_list(&frequencies, state.config.render.top_n))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
